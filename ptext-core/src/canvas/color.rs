//! Colours and colour spaces as tracked by the graphics state.

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::{Array, Dictionary, Object};
use rust_decimal::Decimal;
use tracing::warn;

/// A colour value, in the terms of the colour space it was set in.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Grayscale, 0 (black) to 1 (white)
    Gray(Decimal),
    /// RGB (red, green, blue)
    Rgb(Decimal, Decimal, Decimal),
    /// CMYK (cyan, magenta, yellow, key/black)
    Cmyk(Decimal, Decimal, Decimal, Decimal),
    /// Tint of a Separation colourant
    Separation(Decimal),
    /// Named pattern resource
    Pattern(String),
    /// Components of any other colour space
    Components(Vec<Decimal>),
}

impl Color {
    /// Black color (gray 0).
    pub fn black() -> Self {
        Color::Gray(Decimal::ZERO)
    }

    pub fn rgb_black() -> Self {
        Color::Rgb(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    }

    pub fn cmyk_black() -> Self {
        Color::Cmyk(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ONE)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpaceFamily {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    CalGray,
    CalRGB,
    Lab,
    ICCBased,
    Indexed,
    Pattern,
    Separation,
    DeviceN,
    Unknown,
}

impl ColorSpaceFamily {
    /// Families that can be named directly by `CS`/`cs` without a resource
    /// lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "DeviceGray" => Self::DeviceGray,
            "DeviceRGB" => Self::DeviceRGB,
            "DeviceCMYK" => Self::DeviceCMYK,
            "CalGray" => Self::CalGray,
            "CalRGB" => Self::CalRGB,
            "Lab" => Self::Lab,
            "ICCBased" => Self::ICCBased,
            "Indexed" => Self::Indexed,
            "Pattern" => Self::Pattern,
            "Separation" => Self::Separation,
            _ => return None,
        })
    }

    /// Family named by the first element of a colour space array.
    fn from_definition_name(name: &str) -> Self {
        match name {
            "DeviceN" => Self::DeviceN,
            other => Self::from_name(other).unwrap_or(Self::Unknown),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DeviceGray => "DeviceGray",
            Self::DeviceRGB => "DeviceRGB",
            Self::DeviceCMYK => "DeviceCMYK",
            Self::CalGray => "CalGray",
            Self::CalRGB => "CalRGB",
            Self::Lab => "Lab",
            Self::ICCBased => "ICCBased",
            Self::Indexed => "Indexed",
            Self::Pattern => "Pattern",
            Self::Separation => "Separation",
            Self::DeviceN => "DeviceN",
            Self::Unknown => "Unknown",
        }
    }

    fn default_components(&self) -> usize {
        match self {
            Self::DeviceGray | Self::CalGray | Self::Indexed | Self::Pattern | Self::Separation => 1,
            Self::DeviceRGB | Self::CalRGB | Self::Lab | Self::ICCBased => 3,
            Self::DeviceCMYK => 4,
            Self::DeviceN | Self::Unknown => 0,
        }
    }
}

/// The active colour space: its family, how many operands a colour in it
/// takes, and the resource array it was defined by, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpace {
    family: ColorSpaceFamily,
    components: usize,
    definition: Option<Array>,
}

impl ColorSpace {
    pub fn new(family: ColorSpaceFamily) -> Self {
        Self {
            family,
            components: family.default_components(),
            definition: None,
        }
    }

    pub fn device_gray() -> Self {
        Self::new(ColorSpaceFamily::DeviceGray)
    }

    pub fn device_rgb() -> Self {
        Self::new(ColorSpaceFamily::DeviceRGB)
    }

    pub fn device_cmyk() -> Self {
        Self::new(ColorSpaceFamily::DeviceCMYK)
    }

    /// Builds a colour space from an array such as
    /// `[/Separation /Spot /DeviceCMYK 12 0 R]` or `[/ICCBased 7 0 R]`.
    pub fn from_definition(definition: &Array, document: &Document) -> Self {
        let family_name = definition
            .first()
            .and_then(|first| document.resolve(first))
            .and_then(Object::as_name)
            .unwrap_or_default();
        let family = ColorSpaceFamily::from_definition_name(family_name);
        let second = definition.get(1).and_then(|value| document.resolve(value));

        let components = match family {
            ColorSpaceFamily::ICCBased => second
                .and_then(Object::as_dict)
                .and_then(|dict| dict.get("N"))
                .and_then(Object::as_integer)
                .map(|n| n.max(0) as usize)
                .unwrap_or(3),
            ColorSpaceFamily::DeviceN => second.and_then(Object::as_array).map_or(0, Array::len),
            // Uncoloured patterns take the base space's components plus the name
            ColorSpaceFamily::Pattern => match second {
                Some(Object::Name(base)) => {
                    1 + ColorSpaceFamily::from_name(base).map_or(0, |f| f.default_components())
                }
                Some(Object::Array(base)) => 1 + ColorSpace::from_definition(base, document).components,
                _ => 1,
            },
            ColorSpaceFamily::Unknown => {
                warn!(family = family_name, "unknown colour space family");
                0
            }
            other => other.default_components(),
        };

        Self {
            family,
            components,
            definition: Some(definition.clone()),
        }
    }

    /// Resolves the operand of `CS`/`cs`: a well-known family name, or the
    /// name of an entry in the resources' `/ColorSpace` dictionary.
    pub fn resolve(name: &str, resources: Option<&Dictionary>, document: &Document) -> Self {
        if let Some(family) = ColorSpaceFamily::from_name(name) {
            return Self::new(family);
        }

        let entry = resources
            .and_then(|resources| document.resolve_key(resources, "ColorSpace"))
            .and_then(Object::as_dict)
            .and_then(|spaces| document.resolve_key(spaces, name));

        match entry {
            Some(Object::Name(alias)) => match ColorSpaceFamily::from_name(alias) {
                Some(family) => Self::new(family),
                None => {
                    warn!(name, alias = alias.as_str(), "unknown colour space family");
                    Self::new(ColorSpaceFamily::Unknown)
                }
            },
            Some(Object::Array(definition)) => Self::from_definition(definition, document),
            _ => {
                warn!(name, "colour space not found in resources");
                Self::new(ColorSpaceFamily::Unknown)
            }
        }
    }

    pub fn family(&self) -> ColorSpaceFamily {
        self.family
    }

    /// Number of operands `SC`/`SCN`/`sc`/`scn` take in this space.
    pub fn components(&self) -> usize {
        self.components
    }

    pub fn definition(&self) -> Option<&Array> {
        self.definition.as_ref()
    }

    /// Colour installed when this space is selected, or `None` when the
    /// current colour is left as it is.
    pub fn initial_color(&self) -> Option<Color> {
        match self.family {
            ColorSpaceFamily::DeviceGray | ColorSpaceFamily::CalGray => Some(Color::black()),
            ColorSpaceFamily::DeviceRGB | ColorSpaceFamily::CalRGB | ColorSpaceFamily::ICCBased => {
                Some(Color::rgb_black())
            }
            ColorSpaceFamily::DeviceCMYK => Some(Color::cmyk_black()),
            ColorSpaceFamily::Separation => Some(Color::Separation(Decimal::ZERO)),
            _ => None,
        }
    }

    /// Interprets the operands of a set-colour operator. Returns `None` in a
    /// space the interpreter cannot represent.
    pub fn color_from_operands(&self, operator: &str, operands: &[Object]) -> Result<Option<Color>> {
        if self.family == ColorSpaceFamily::Unknown {
            return Ok(None);
        }
        if self.family == ColorSpaceFamily::Pattern {
            let name = operands
                .last()
                .and_then(Object::as_name)
                .ok_or_else(|| {
                    PdfError::invalid_operand(operator, operands.len().saturating_sub(1), "a name")
                })?;
            return Ok(Some(Color::Pattern(name.to_string())));
        }

        let values = operands
            .iter()
            .enumerate()
            .map(|(i, operand)| {
                operand
                    .as_number()
                    .ok_or_else(|| PdfError::invalid_operand(operator, i, "a number"))
            })
            .collect::<Result<Vec<Decimal>>>()?;

        let color = match (self.family, values.as_slice()) {
            (ColorSpaceFamily::DeviceGray | ColorSpaceFamily::CalGray, [g]) => Color::Gray(*g),
            (ColorSpaceFamily::DeviceRGB | ColorSpaceFamily::CalRGB, [r, g, b]) => {
                Color::Rgb(*r, *g, *b)
            }
            (ColorSpaceFamily::DeviceCMYK, [c, m, y, k]) => Color::Cmyk(*c, *m, *y, *k),
            (ColorSpaceFamily::Separation, [tint]) => Color::Separation(*tint),
            (ColorSpaceFamily::ICCBased, [g]) => Color::Gray(*g),
            (ColorSpaceFamily::ICCBased, [r, g, b]) => Color::Rgb(*r, *g, *b),
            (ColorSpaceFamily::ICCBased, [c, m, y, k]) => Color::Cmyk(*c, *m, *y, *k),
            _ => Color::Components(values),
        };
        Ok(Some(color))
    }
}

impl Default for ColorSpace {
    fn default() -> Self {
        Self::device_gray()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Stream;

    fn d(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn resources_with(name: &str, space: impl Into<Object>) -> Dictionary {
        let mut spaces = Dictionary::new();
        spaces.set(name, space);
        let mut resources = Dictionary::new();
        resources.set("ColorSpace", spaces);
        resources
    }

    #[test]
    fn test_well_known_names() {
        let doc = Document::new();
        for (name, components) in [
            ("DeviceGray", 1),
            ("DeviceRGB", 3),
            ("DeviceCMYK", 4),
            ("CalGray", 1),
            ("CalRGB", 3),
            ("Lab", 3),
            ("ICCBased", 3),
            ("Indexed", 1),
            ("Pattern", 1),
            ("Separation", 1),
        ] {
            let space = ColorSpace::resolve(name, None, &doc);
            assert_eq!(space.family().name(), name);
            assert_eq!(space.components(), components, "{name}");
            assert!(space.definition().is_none());
        }
    }

    #[test]
    fn test_separation_from_resources() {
        let doc = Document::new();
        let definition: Array = vec![
            Object::name("Separation"),
            Object::name("PANTONE 300"),
            Object::name("DeviceCMYK"),
            Object::Null,
        ]
        .into();
        let resources = resources_with("CS0", definition.clone());

        let space = ColorSpace::resolve("CS0", Some(&resources), &doc);
        assert_eq!(space.family(), ColorSpaceFamily::Separation);
        assert_eq!(space.components(), 1);
        assert_eq!(space.definition(), Some(&definition));
        assert_eq!(space.initial_color(), Some(Color::Separation(d(0))));
    }

    #[test]
    fn test_icc_based_reads_component_count() {
        let mut doc = Document::new();
        let mut dict = Dictionary::new();
        dict.set("N", 4);
        let profile = doc.add(Stream::with_dictionary(dict, Vec::new()));
        let resources = resources_with(
            "ICC",
            vec![Object::name("ICCBased"), Object::Reference(profile)],
        );

        let space = ColorSpace::resolve("ICC", Some(&resources), &doc);
        assert_eq!(space.family(), ColorSpaceFamily::ICCBased);
        assert_eq!(space.components(), 4);
    }

    #[test]
    fn test_device_n_counts_colorants() {
        let doc = Document::new();
        let colorants: Object = vec![Object::name("Cyan"), Object::name("Spot")].into();
        let resources = resources_with(
            "DN",
            vec![
                Object::name("DeviceN"),
                colorants,
                Object::name("DeviceCMYK"),
                Object::Null,
            ],
        );

        let space = ColorSpace::resolve("DN", Some(&resources), &doc);
        assert_eq!(space.family(), ColorSpaceFamily::DeviceN);
        assert_eq!(space.components(), 2);
        assert_eq!(space.initial_color(), None);
    }

    #[test]
    fn test_uncoloured_pattern() {
        let doc = Document::new();
        let resources = resources_with(
            "P0",
            vec![Object::name("Pattern"), Object::name("DeviceRGB")],
        );
        let space = ColorSpace::resolve("P0", Some(&resources), &doc);
        assert_eq!(space.components(), 4);

        let operands = [d(1).into(), d(0).into(), d(0).into(), Object::name("Hatch")];
        assert_eq!(
            space.color_from_operands("scn", &operands).unwrap(),
            Some(Color::Pattern("Hatch".to_string()))
        );
    }

    #[test]
    fn test_alias_and_missing_entries() {
        let doc = Document::new();
        let resources = resources_with("Alias", Object::name("DeviceRGB"));
        assert_eq!(
            ColorSpace::resolve("Alias", Some(&resources), &doc).family(),
            ColorSpaceFamily::DeviceRGB
        );

        let missing = ColorSpace::resolve("Nope", Some(&resources), &doc);
        assert_eq!(missing.family(), ColorSpaceFamily::Unknown);
        assert_eq!(missing.components(), 0);
        assert_eq!(ColorSpace::resolve("Nope", None, &doc).components(), 0);
    }

    #[test]
    fn test_initial_colors() {
        assert_eq!(ColorSpace::device_gray().initial_color(), Some(Color::black()));
        assert_eq!(ColorSpace::device_rgb().initial_color(), Some(Color::rgb_black()));
        assert_eq!(
            ColorSpace::device_cmyk().initial_color(),
            Some(Color::Cmyk(d(0), d(0), d(0), d(1)))
        );
        assert_eq!(ColorSpace::new(ColorSpaceFamily::Lab).initial_color(), None);
    }

    #[test]
    fn test_color_from_operands() {
        let cmyk = ColorSpace::device_cmyk();
        let operands: Vec<Object> = [0, 1, 0, 0].into_iter().map(Object::from).collect();
        assert_eq!(
            cmyk.color_from_operands("scn", &operands).unwrap(),
            Some(Color::Cmyk(d(0), d(1), d(0), d(0)))
        );

        let bad = [Object::from(1), Object::name("X"), Object::from(0), Object::from(0)];
        assert!(matches!(
            cmyk.color_from_operands("scn", &bad),
            Err(PdfError::InvalidOperand { index: 1, .. })
        ));

        let lab = ColorSpace::new(ColorSpaceFamily::Lab);
        let operands: Vec<Object> = [50, 0, 0].into_iter().map(Object::from).collect();
        assert_eq!(
            lab.color_from_operands("sc", &operands).unwrap(),
            Some(Color::Components(vec![d(50), d(0), d(0)]))
        );
    }
}
