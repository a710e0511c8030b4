use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::binder::BindError;
use crate::dom::{Dom, ElementId};

const DEFAULT_SCHEMA: &str = "insert-popup";
const DEFAULT_VERSION: u32 = 1;

const CLOSE_CLASS: &str = "close-popup";
const DATA_CLASS: &str = "widget-popup-data";

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// Delivers the final state of an editor to whatever opened it.
pub trait ResponsePort {
    fn respond(&mut self, payload: Value) -> Result<(), BindError>;
}

/// The transport to the opener window.
pub trait Opener {
    fn post_message(&mut self, message: String);
}

impl Opener for Sender<String> {
    fn post_message(&mut self, message: String) {
        if self.send(message).is_err() {
            log::warn!("opener went away before the popup responded");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupMessage {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub payload: Value,
}

impl PopupMessage {
    pub fn from_payload(payload: Value) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            payload,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// A popup window. Responding posts to the opener and closes the popup; without an opener
/// the popup runs embedded and every affordance is inert.
pub struct WindowPopup {
    opener: Option<Box<dyn Opener>>,
    closed: bool,
}

impl WindowPopup {
    pub fn with_opener(opener: impl Opener + 'static) -> Self {
        Self {
            opener: Some(Box::new(opener)),
            closed: false,
        }
    }

    pub fn embedded() -> Self {
        Self {
            opener: None,
            closed: false,
        }
    }

    pub fn has_opener(&self) -> bool {
        self.opener.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        if self.opener.is_none() {
            return;
        }
        self.closed = true;
    }

    /// Wires the popup affordances found under `root`: every `.widget-popup-data` element
    /// responds right away with its data attributes, and the `.close-popup` elements are
    /// returned for the caller to route clicks. Nothing happens without an opener.
    pub fn handle_popup(
        &mut self,
        dom: &Dom,
        root: ElementId,
    ) -> Result<Vec<ElementId>, BindError> {
        if !self.has_opener() {
            return Ok(Vec::new());
        }
        for data in dom.find_all_by_class(root, DATA_CLASS) {
            self.respond(Value::Object(dom.data_attributes(data)))?;
        }
        Ok(dom.find_all_by_class(root, CLOSE_CLASS))
    }
}

impl ResponsePort for WindowPopup {
    fn respond(&mut self, payload: Value) -> Result<(), BindError> {
        if self.closed {
            log::warn!("popup already closed, dropping response");
            return Ok(());
        }
        let Some(opener) = self.opener.as_mut() else {
            log::debug!("no opener, response not delivered");
            return Ok(());
        };
        let message = PopupMessage::from_payload(payload)
            .to_json()
            .map_err(|err| BindError::Serialize(err.to_string()))?;
        opener.post_message(message);
        self.close();
        Ok(())
    }
}
