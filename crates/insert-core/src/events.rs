use serde::{Deserialize, Serialize};

use crate::dom::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    KeyPress,
    Paste,
    Change,
    Submit,
    Click,
    /// The asset behind `target` finished loading with this natural size.
    Load { width: f64, height: f64 },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::KeyPress => "keypress",
            EventKind::Paste => "paste",
            EventKind::Change => "change",
            EventKind::Submit => "submit",
            EventKind::Click => "click",
            EventKind::Load { .. } => "load",
        }
    }

    /// Events whose effect on an input's value lands only after dispatch.
    pub fn is_raw_input(&self) -> bool {
        matches!(self, EventKind::KeyPress | EventKind::Paste)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    pub target: ElementId,
    #[serde(default)]
    default_prevented: bool,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: ElementId) -> Self {
        Self {
            kind,
            target,
            default_prevented: false,
        }
    }

    pub fn key_press(target: ElementId) -> Self {
        Self::new(EventKind::KeyPress, target)
    }

    pub fn paste(target: ElementId) -> Self {
        Self::new(EventKind::Paste, target)
    }

    pub fn change(target: ElementId) -> Self {
        Self::new(EventKind::Change, target)
    }

    pub fn submit(target: ElementId) -> Self {
        Self::new(EventKind::Submit, target)
    }

    pub fn click(target: ElementId) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn load(target: ElementId, width: f64, height: f64) -> Self {
        Self::new(EventKind::Load { width, height }, target)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
