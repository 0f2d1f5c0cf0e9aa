use crate::canvas::color::{Color, ColorSpace};
use crate::error::Result;
use crate::geometry::{checked_add, dot, LineSegment, Matrix, Point};
use rust_decimal::Decimal;

/// Number of straight pieces a Bézier curve is flattened into.
const CURVE_STEPS: i64 = 8;

/// The path under construction, as an ordered list of line segments.
///
/// A moveto is recorded as a zero-length segment at the new current point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<LineSegment>,
    current: Option<Point>,
    subpath_start: Option<Point>,
    last_was_move: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Starts a new subpath. A moveto directly after another one replaces it.
    pub fn move_to(&mut self, point: Point) {
        if self.last_was_move {
            self.segments.pop();
        }
        self.segments.push(LineSegment::new(point, point));
        self.current = Some(point);
        self.subpath_start = Some(point);
        self.last_was_move = true;
    }

    /// Returns `false` when there is no current point.
    pub fn line_to(&mut self, point: Point) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        self.segments.push(LineSegment::new(current, point));
        self.current = Some(point);
        self.last_was_move = false;
        true
    }

    /// Adds a cubic Bézier curve from the current point, flattened into line
    /// segments. Returns `false` when there is no current point.
    pub fn curve_to(&mut self, control1: Point, control2: Point, end: Point) -> Result<bool> {
        let Some(start) = self.current else {
            return Ok(false);
        };
        let steps = Decimal::from(CURVE_STEPS);
        let mut points = Vec::with_capacity(CURVE_STEPS as usize);
        for i in 1..CURVE_STEPS {
            points.push(bezier_point(start, control1, control2, end, Decimal::from(i) / steps)?);
        }
        points.push(end);

        for point in points {
            self.line_to(point);
        }
        Ok(true)
    }

    /// Closes the current subpath with a straight line back to its start.
    pub fn close(&mut self) {
        if let (Some(current), Some(start)) = (self.current, self.subpath_start) {
            if current != start {
                self.segments.push(LineSegment::new(current, start));
            }
            self.current = Some(start);
        }
        self.last_was_move = false;
    }

    pub fn rectangle(&mut self, x: Decimal, y: Decimal, width: Decimal, height: Decimal) -> Result<()> {
        let right = checked_add(x, width)?;
        let top = checked_add(y, height)?;
        self.move_to(Point::new(x, y));
        self.line_to(Point::new(right, y));
        self.line_to(Point::new(right, top));
        self.line_to(Point::new(x, top));
        self.close();
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn bezier_point(p0: Point, p1: Point, p2: Point, p3: Point, t: Decimal) -> Result<Point> {
    // 0 < t < 1, so the basis weights themselves cannot overflow
    let three = Decimal::from(3);
    let u = Decimal::ONE - t;
    let b0 = u * u * u;
    let b1 = three * u * u * t;
    let b2 = three * u * t * t;
    let b3 = t * t * t;
    let x = dot(&[(b0, p0.x), (b1, p1.x), (b2, p2.x), (b3, p3.x)], Decimal::ZERO)?;
    let y = dot(&[(b0, p0.y), (b1, p1.y), (b2, p2.y), (b3, p3.y)], Decimal::ZERO)?;
    Ok(Point::new(x.normalize(), y.normalize()))
}

/// Graphics state tracked while interpreting a content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasGraphicsState {
    /// Current transformation matrix
    pub ctm: Matrix,

    pub stroke_color: Color,
    pub stroke_color_space: ColorSpace,
    /// Colour used for filling and for text
    pub non_stroke_color: Color,
    pub non_stroke_color_space: ColorSpace,

    pub line_width: Decimal,
    pub line_cap: i64,
    pub line_join: i64,
    pub miter_limit: Decimal,
    pub dash_array: Vec<Decimal>,
    pub dash_phase: Decimal,
    pub rendering_intent: Option<String>,
    pub flatness: Decimal,

    pub character_spacing: Decimal,
    pub word_spacing: Decimal,
    /// Horizontal scaling in percent
    pub horizontal_scaling: Decimal,
    pub leading: Decimal,
    /// Resource name of the current font
    pub font: Option<String>,
    pub font_size: Decimal,
    pub text_rise: Decimal,
    pub text_rendering_mode: i64,
    pub text_matrix: Matrix,
    pub text_line_matrix: Matrix,

    pub path: Path,
}

impl Default for CanvasGraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            stroke_color: Color::black(),
            stroke_color_space: ColorSpace::device_gray(),
            non_stroke_color: Color::black(),
            non_stroke_color_space: ColorSpace::device_gray(),
            line_width: Decimal::ONE,
            line_cap: 0,
            line_join: 0,
            miter_limit: Decimal::from(10),
            dash_array: Vec::new(),
            dash_phase: Decimal::ZERO,
            rendering_intent: None,
            flatness: Decimal::ONE,
            character_spacing: Decimal::ZERO,
            word_spacing: Decimal::ZERO,
            horizontal_scaling: Decimal::ONE_HUNDRED,
            leading: Decimal::ZERO,
            font: None,
            font_size: Decimal::ZERO,
            text_rise: Decimal::ZERO,
            text_rendering_mode: 0,
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
            path: Path::new(),
        }
    }
}
