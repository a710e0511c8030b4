use serde::{Deserialize, Serialize};

use crate::dom::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Width,
    Height,
}

impl Dimension {
    pub fn from_attribute(name: &str) -> Option<Self> {
        match name {
            "width" => Some(Dimension::Width),
            "height" => Some(Dimension::Height),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Dimension::Width => Dimension::Height,
            Dimension::Height => Dimension::Width,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Width => "width",
            Dimension::Height => "height",
        }
    }
}

/// Authoritative size used for ratio math. `None` means not known yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeState {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl SizeState {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: Option<f64>) {
        match dimension {
            Dimension::Width => self.width = value,
            Dimension::Height => self.height = value,
        }
    }
}

/// Per-editor model: the node under edit, its size, and the constrain toggle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    node: Option<ElementId>,
    size: SizeState,
    constrained: bool,
}

impl AttributeStore {
    pub fn node(&self) -> Option<ElementId> {
        self.node
    }

    pub fn adopt_node(&mut self, node: ElementId) {
        self.node = Some(node);
    }

    pub fn size(&self) -> SizeState {
        self.size
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<f64> {
        self.size.get(dimension)
    }

    pub fn set_dimension(&mut self, dimension: Dimension, value: Option<f64>) {
        self.size.set(dimension, value);
    }

    pub fn seed_size(&mut self, size: SizeState) {
        self.size = size;
    }

    pub fn constrained(&self) -> bool {
        self.constrained
    }

    pub fn set_constrained(&mut self, constrained: bool) {
        self.constrained = constrained;
    }
}
