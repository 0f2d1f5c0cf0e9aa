use crate::document::Document;
use crate::objects::{Dictionary, Object};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cell::OnceCell;
use std::collections::HashMap;
use tracing::warn;

/// Width used when a CID font declares no `/DW`.
pub const DEFAULT_CID_WIDTH: i64 = 1000;

/// Largest number of CIDs a single `start end width` range may cover.
const MAX_RANGE_LEN: u32 = 65_536;

/// Glyph widths of a CID-keyed font, from its `/W` and `/DW` entries.
///
/// The `/W` table mixes two forms, `start [w1 w2 ...]` and
/// `start end w`. It is expanded into a CID → width map on the first lookup
/// and kept for the lifetime of the value; clones carry their own copy.
#[derive(Debug, Clone)]
pub struct CidWidths {
    table: Vec<Object>,
    default_width: Decimal,
    cache: OnceCell<HashMap<u32, Decimal>>,
}

impl CidWidths {
    pub fn new(table: Vec<Object>, default_width: Option<Decimal>) -> Self {
        Self {
            table,
            default_width: default_width.unwrap_or_else(|| Decimal::from(DEFAULT_CID_WIDTH)),
            cache: OnceCell::new(),
        }
    }

    /// Reads `/W` and `/DW` from a descendant (CIDFont) dictionary, resolving
    /// references to the table and its inner arrays.
    pub fn from_font_dictionary(font: &Dictionary, document: &Document) -> Self {
        let table = document
            .resolve_key(font, "W")
            .and_then(Object::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| document.resolve(entry).cloned().unwrap_or(Object::Null))
                    .collect()
            })
            .unwrap_or_default();
        let default_width = document.resolve_key(font, "DW").and_then(Object::as_number);
        Self::new(table, default_width)
    }

    pub fn default_width(&self) -> Decimal {
        self.default_width
    }

    pub fn is_expanded(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn width(&self, cid: u32) -> Decimal {
        self.cache
            .get_or_init(|| expand(&self.table))
            .get(&cid)
            .copied()
            .unwrap_or(self.default_width)
    }
}

fn as_cid(object: &Object) -> Option<u32> {
    let value = object.as_number()?;
    if !value.fract().is_zero() || value.is_sign_negative() {
        return None;
    }
    value.to_u32()
}

fn expand(table: &[Object]) -> HashMap<u32, Decimal> {
    let mut widths = HashMap::new();
    let mut i = 0;

    while i < table.len() {
        let Some(start) = as_cid(&table[i]) else {
            warn!(index = i, "skipping malformed /W entry: expected a CID");
            i += 1;
            continue;
        };

        match (table.get(i + 1), table.get(i + 2)) {
            (Some(Object::Array(run)), _) => {
                for (offset, width) in run.iter().enumerate() {
                    match width.as_number() {
                        Some(width) => {
                            widths.insert(start.saturating_add(offset as u32), width);
                        }
                        None => warn!(cid = start, offset, "skipping non-numeric width"),
                    }
                }
                i += 2;
            }
            (Some(end), Some(Object::Number(width))) if as_cid(end).is_some() => {
                let end = as_cid(end).unwrap_or_default();
                if end < start || end - start >= MAX_RANGE_LEN {
                    warn!(start, end, "skipping malformed /W range");
                } else {
                    for cid in start..=end {
                        widths.insert(cid, *width);
                    }
                }
                i += 3;
            }
            _ => {
                warn!(index = i, "skipping malformed /W entry");
                i += 1;
            }
        }
    }

    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_runs_and_ranges() {
        let run: Object = vec![Object::from(500), Object::from(600), Object::from(700)].into();
        let widths = CidWidths::new(
            vec![
                Object::from(0),
                run,
                Object::from(10),
                Object::from(12),
                Object::from(1000),
            ],
            Some(d(250)),
        );

        assert!(!widths.is_expanded());
        assert_eq!(widths.width(0), d(500));
        assert!(widths.is_expanded());
        assert_eq!(widths.width(1), d(600));
        assert_eq!(widths.width(2), d(700));
        assert_eq!(widths.width(11), d(1000));
        assert_eq!(widths.width(99), d(250));
    }

    #[test]
    fn test_default_width_without_dw() {
        let widths = CidWidths::new(Vec::new(), None);
        assert_eq!(widths.width(42), d(1000));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let widths = CidWidths::new(
            vec![
                Object::name("Bad"),
                Object::from(5),
                vec![Object::from(300)].into(),
                Object::from(7),
                Object::from(3),
                Object::from(100),
                Object::from(0),
                Object::from(70_000),
                Object::from(9),
                Object::from(20),
            ],
            None,
        );

        assert_eq!(widths.width(5), d(300));
        assert_eq!(widths.width(7), d(1000));
        assert_eq!(widths.width(3), d(1000));
        assert_eq!(widths.width(20), d(1000));
        assert_eq!(widths.width(60_000), d(1000));
    }

    #[test]
    fn test_clone_has_independent_cache() {
        let widths = CidWidths::new(
            vec![Object::from(1), vec![Object::from(400)].into()],
            None,
        );
        let copy = widths.clone();
        assert_eq!(widths.width(1), d(400));
        assert!(widths.is_expanded());
        assert!(!copy.is_expanded());
        assert_eq!(copy.width(1), d(400));
    }

    #[test]
    fn test_from_font_dictionary_resolves_references() {
        let mut doc = Document::new();
        let run = doc.add(vec![Object::from(250), Object::from(251)]);
        let w = doc.add(vec![Object::from(3), Object::Reference(run)]);

        let mut font = Dictionary::new();
        font.set("W", w);
        font.set("DW", 600);

        let widths = CidWidths::from_font_dictionary(&font, &doc);
        assert_eq!(widths.width(3), d(250));
        assert_eq!(widths.width(4), d(251));
        assert_eq!(widths.width(5), d(600));
        assert_eq!(widths.default_width(), d(600));
    }
}
