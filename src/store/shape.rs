//! Legacy document shape detection.
//!
//! Old exports stored the block sequence in several places depending on
//! which version wrote them. Detection is a single closed decision over
//! named shapes with a fixed priority order, first match wins, not
//! scattered duck-typed conditionals.

use serde_json::Value;

/// The closed set of recognized legacy document shapes, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyShape {
    /// A bare array at the document root.
    BareSequence,
    /// An object with a `blocks` array.
    BlocksField,
    /// An object with a `layout` array (grid-layout-shaped export).
    LayoutField,
    /// An object with an `items` array.
    ItemsField,
    /// An object with a `tiles` array.
    TilesField,
}

impl LegacyShape {
    fn field(self) -> Option<&'static str> {
        match self {
            Self::BareSequence => None,
            Self::BlocksField => Some("blocks"),
            Self::LayoutField => Some("layout"),
            Self::ItemsField => Some("items"),
            Self::TilesField => Some("tiles"),
        }
    }
}

const PRIORITY: [LegacyShape; 5] = [
    LegacyShape::BareSequence,
    LegacyShape::BlocksField,
    LegacyShape::LayoutField,
    LegacyShape::ItemsField,
    LegacyShape::TilesField,
];

/// Detect which legacy shape `doc` carries and extract its sequence.
/// Returns `None` when no recognized shape matches.
pub fn detect_legacy_shape(doc: &Value) -> Option<(LegacyShape, &[Value])> {
    for shape in PRIORITY {
        match shape.field() {
            None => {
                if let Some(items) = doc.as_array() {
                    return Some((shape, items));
                }
            }
            Some(field) => {
                if let Some(items) = doc.get(field).and_then(Value::as_array) {
                    return Some((shape, items));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_sequence_wins() {
        let doc = json!([{"id": "1"}]);
        let (shape, items) = detect_legacy_shape(&doc).unwrap();
        assert_eq!(shape, LegacyShape::BareSequence);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_field_priority_order() {
        // blocks beats layout beats items beats tiles
        let doc = json!({"layout": [1], "blocks": [1, 2], "tiles": []});
        let (shape, items) = detect_legacy_shape(&doc).unwrap();
        assert_eq!(shape, LegacyShape::BlocksField);
        assert_eq!(items.len(), 2);

        let doc = json!({"items": [1], "layout": [1, 2, 3]});
        let (shape, _) = detect_legacy_shape(&doc).unwrap();
        assert_eq!(shape, LegacyShape::LayoutField);

        let doc = json!({"tiles": [1]});
        let (shape, _) = detect_legacy_shape(&doc).unwrap();
        assert_eq!(shape, LegacyShape::TilesField);
    }

    #[test]
    fn test_non_array_fields_are_skipped() {
        let doc = json!({"blocks": "not an array", "items": [1]});
        let (shape, _) = detect_legacy_shape(&doc).unwrap();
        assert_eq!(shape, LegacyShape::ItemsField);
    }

    #[test]
    fn test_unrecognized_document_yields_none() {
        assert!(detect_legacy_shape(&json!({"version": "2.0"})).is_none());
        assert!(detect_legacy_shape(&json!(42)).is_none());
    }
}
