//! Template resolution: find the best registry template for legacy
//! geometry and a block kind.
//!
//! Two-tier policy: exact-dimension matches first, preferring a compatible
//! one but falling back to the first exact match even when incompatible
//! (validation flags that downstream). Only when no exact match exists is
//! compatibility enforced strictly, picking the compatible template with
//! the nearest area. Legacy geometry is trusted for shape, not for
//! type-correctness.

use crate::model::BlockKind;
use crate::template::{Template, TemplateRegistry};

/// Resolve the best-matching template for `width x height` and `kind`.
/// Returns `None` only when no exact-dimension match exists and no
/// template in the registry is compatible with `kind`.
pub fn resolve<'a>(
    registry: &'a dyn TemplateRegistry,
    width: u32,
    height: u32,
    kind: &BlockKind,
) -> Option<&'a Template> {
    let exact: Vec<&Template> = registry
        .all()
        .iter()
        .filter(|t| t.width == width && t.height == height)
        .collect();

    if let Some(compatible) = exact
        .iter()
        .find(|t| registry.is_compatible(t, kind))
    {
        return Some(compatible);
    }
    if let Some(first_exact) = exact.first() {
        // Intentionally permissive: shape matched, type did not. The
        // migration validator rejects this pairing if it is truly invalid.
        return Some(first_exact);
    }

    let target_area = i64::from(width) * i64::from(height);
    registry
        .all()
        .iter()
        .filter(|t| registry.is_compatible(t, kind))
        .min_by_key(|t| (i64::from(t.area()) - target_area).abs())
}
