//! Templates and the registry port.
//!
//! Templates are immutable, registry-owned descriptions of a block shape:
//! fixed grid dimensions plus default styling. This crate never creates or
//! mutates templates; it consumes a catalog through the [`TemplateRegistry`]
//! trait. [`StaticRegistry`] is the in-crate implementation backed by a
//! plain compatibility table, used by fixtures and tests; production
//! callers wrap whatever catalog they own.

use crate::model::BlockKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named, registry-defined shape a block can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub default_color: Option<String>,
    #[serde(default)]
    pub default_status: Option<String>,
}

impl Template {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            default_color: None,
            default_status: None,
        }
    }

    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = Some(color.into());
        self
    }

    pub fn with_default_status(mut self, status: impl Into<String>) -> Self {
        self.default_status = Some(status.into());
        self
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// The consumed catalog interface: enumeration plus a compatibility
/// predicate between templates and block kinds.
pub trait TemplateRegistry {
    fn all(&self) -> &[Template];

    fn is_compatible(&self, template: &Template, kind: &BlockKind) -> bool;
}

impl<T: TemplateRegistry + ?Sized> TemplateRegistry for &T {
    fn all(&self) -> &[Template] {
        (**self).all()
    }

    fn is_compatible(&self, template: &Template, kind: &BlockKind) -> bool {
        (**self).is_compatible(template, kind)
    }
}

/// Table-backed registry: each template carries an explicit list of
/// accepted block kinds. Iteration order is insertion order, which the
/// resolver relies on for tie-breaking.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    templates: Vec<Template>,
    accepted: HashMap<String, Vec<BlockKind>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, template: Template, kinds: Vec<BlockKind>) {
        self.accepted.insert(template.id.clone(), kinds);
        self.templates.push(template);
    }

    pub fn with(mut self, template: Template, kinds: Vec<BlockKind>) -> Self {
        self.register(template, kinds);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }
}

impl TemplateRegistry for StaticRegistry {
    fn all(&self) -> &[Template] {
        &self.templates
    }

    fn is_compatible(&self, template: &Template, kind: &BlockKind) -> bool {
        self.accepted
            .get(&template.id)
            .map(|kinds| kinds.contains(kind))
            .unwrap_or(false)
    }
}
