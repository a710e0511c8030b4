use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dom::{Dom, ElementId, NodeSnapshot};
use crate::events::{DomEvent, EventKind};
use crate::popup::ResponsePort;
use crate::proportion::{compute_opposite, format_dimension, parse_dimension};
use crate::scheduler::{Liveness, Scheduler};
use crate::store::{AttributeStore, Dimension, SizeState};

#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    /// The widget kind never supplied an input handler.
    MissingInputHandler { kind: &'static str },
    MissingRoot(ElementId),
    AlreadyBound,
    Destroyed,
    Serialize(String),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::MissingInputHandler { kind } => {
                write!(f, "`{kind}` must override the input handler")
            }
            BindError::MissingRoot(id) => write!(f, "root element {} does not exist", id.0),
            BindError::AlreadyBound => write!(f, "widget is already bound"),
            BindError::Destroyed => write!(f, "widget has been destroyed"),
            BindError::Serialize(message) => write!(f, "failed to encode payload: {message}"),
        }
    }
}

impl std::error::Error for BindError {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub attribute_tag: String,
    pub form_tag: String,
    pub constrain_class: String,
}

impl Selectors {
    pub fn with_defaults(mut self) -> Self {
        if self.attribute_tag.is_empty() {
            self.attribute_tag = "data-attribute".to_string();
        }
        if self.form_tag.is_empty() {
            self.form_tag = "form".to_string();
        }
        if self.constrain_class.is_empty() {
            self.constrain_class = "constrain".to_string();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinderConfig {
    pub root: ElementId,
    #[serde(default)]
    pub selectors: Selectors,
}

impl BinderConfig {
    pub fn new(root: ElementId) -> Self {
        Self {
            root,
            selectors: Selectors::default().with_defaults(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(s).map(Self::with_defaults)
    }

    pub fn with_defaults(mut self) -> Self {
        self.selectors = self.selectors.with_defaults();
        self
    }
}

/// Element references captured once at bind time.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    pub root: ElementId,
    pub inputs: Vec<ElementId>,
    pub form: Option<ElementId>,
    pub constrain: Option<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    Uninitialized,
    Bound { constrained: bool },
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Bound,
    Destroyed,
}

/// A deferred call to the input handler for one keypress or paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredInput {
    pub input: ElementId,
}

pub struct InsertContext<'a> {
    dom: &'a mut Dom,
    store: &'a mut AttributeStore,
    bindings: &'a Bindings,
    selectors: &'a Selectors,
}

impl InsertContext<'_> {
    pub fn dom(&self) -> &Dom {
        &*self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut *self.dom
    }

    pub fn store(&self) -> &AttributeStore {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut AttributeStore {
        &mut *self.store
    }

    pub fn root(&self) -> ElementId {
        self.bindings.root
    }

    /// Attribute name an input is tagged with.
    pub fn attribute_of(&self, input: ElementId) -> Option<String> {
        self.dom
            .attr(input, &self.selectors.attribute_tag)
            .map(str::to_string)
    }

    /// Writes `value` into every input tagged `name` and onto the node under edit.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let tag = self.selectors.attribute_tag.as_str();
        for &input in &self.bindings.inputs {
            if self.dom.attr(input, tag) == Some(name) {
                self.dom.set_value(input, value);
            }
        }
        match self.store.node() {
            Some(node) => self.dom.set_attr(node, name, value),
            None => log::trace!("no node yet, `{name}` echoed to inputs only"),
        }
    }

    /// Scales the dimension opposite to `dimension` by the ratio between `value` and the
    /// current size of `dimension`. Must run before `dimension` itself is updated.
    pub fn constrain_proportion(&mut self, dimension: Dimension, value: &str) {
        if self.store.node().is_none() {
            return;
        }
        let opposite = dimension.opposite();
        let (Some(old_self), Some(old_opposite), Some(new_self)) = (
            self.store.dimension(dimension),
            self.store.dimension(opposite),
            parse_dimension(value),
        ) else {
            log::debug!(
                "skipping {} constraint: size {:?}, value {value:?}",
                dimension.as_str(),
                self.store.size()
            );
            return;
        };
        if old_self == 0.0 {
            log::debug!("skipping {} constraint: zero base", dimension.as_str());
            return;
        }

        let next = compute_opposite(old_self, old_opposite, new_self);
        self.store.set_dimension(opposite, Some(next));
        self.set_attribute(opposite.as_str(), &format_dimension(next));
    }

    /// The shared tail of every input handler: constrain and record size edits, then write
    /// the raw value onto the node.
    pub fn apply_edit(&mut self, attribute: &str, value: &str) {
        if let Some(dimension) = Dimension::from_attribute(attribute) {
            if self.store.constrained() {
                self.constrain_proportion(dimension, value);
            }
            self.store.set_dimension(dimension, parse_dimension(value));
        }
        if let Some(node) = self.store.node() {
            self.dom.set_attr(node, attribute, value);
        }
    }
}

/// What a widget kind does with input. Every kind must supply `handle_input`.
pub trait InsertHandler {
    fn id(&self) -> &'static str;

    fn handle_input(
        &mut self,
        cx: &mut InsertContext<'_>,
        input: ElementId,
    ) -> Result<(), BindError>;

    fn handle_load(
        &mut self,
        _cx: &mut InsertContext<'_>,
        _target: ElementId,
        _natural: SizeState,
    ) -> Result<(), BindError> {
        Ok(())
    }
}

/// The bare binding behavior with no input handling of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseInsert;

impl InsertHandler for BaseInsert {
    fn id(&self) -> &'static str {
        "insert"
    }

    fn handle_input(
        &mut self,
        _cx: &mut InsertContext<'_>,
        _input: ElementId,
    ) -> Result<(), BindError> {
        log::error!("input reached `{}` without a handler override", self.id());
        Err(BindError::MissingInputHandler { kind: self.id() })
    }
}

pub struct InsertWidget<H> {
    config: BinderConfig,
    handler: H,
    store: AttributeStore,
    bindings: Option<Bindings>,
    lifecycle: Lifecycle,
    liveness: Option<Liveness>,
}

impl<H: InsertHandler> InsertWidget<H> {
    pub fn new(config: BinderConfig, handler: H) -> Self {
        Self {
            config: config.with_defaults(),
            handler,
            store: AttributeStore::default(),
            bindings: None,
            lifecycle: Lifecycle::Uninitialized,
            liveness: None,
        }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn store(&self) -> &AttributeStore {
        &self.store
    }

    pub fn bindings(&self) -> Option<&Bindings> {
        self.bindings.as_ref()
    }

    pub fn state(&self) -> BindState {
        match self.lifecycle {
            Lifecycle::Uninitialized => BindState::Uninitialized,
            Lifecycle::Bound => BindState::Bound {
                constrained: self.store.constrained(),
            },
            Lifecycle::Destroyed => BindState::Destroyed,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.lifecycle == Lifecycle::Bound
    }

    pub fn init(&mut self, dom: &Dom) -> Result<(), BindError> {
        match self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Bound => return Err(BindError::AlreadyBound),
            Lifecycle::Destroyed => return Err(BindError::Destroyed),
        }

        let root = self.config.root;
        if !dom.contains(root) {
            return Err(BindError::MissingRoot(root));
        }

        let selectors = &self.config.selectors;
        let bindings = Bindings {
            root,
            inputs: dom.find_all_with_attr(root, &selectors.attribute_tag),
            form: dom.find_first_by_tag(root, &selectors.form_tag),
            constrain: dom.find_first_by_class(root, &selectors.constrain_class),
        };
        if let Some(toggle) = bindings.constrain {
            self.store.set_constrained(dom.is_checked(toggle));
        }
        log::debug!(
            "bound `{}` widget: {} input(s), form {:?}, constrain toggle {:?}",
            self.handler.id(),
            bindings.inputs.len(),
            bindings.form,
            bindings.constrain
        );

        self.bindings = Some(bindings);
        self.liveness = Some(Liveness::new());
        self.lifecycle = Lifecycle::Bound;
        Ok(())
    }

    /// Routes one event on this widget's subtree. Keypress and paste on bound inputs are
    /// deferred onto `scheduler`; everything else runs now.
    pub fn dispatch(
        &mut self,
        dom: &mut Dom,
        scheduler: &mut Scheduler<DeferredInput>,
        port: &mut dyn ResponsePort,
        event: &mut DomEvent,
    ) -> Result<(), BindError> {
        let Some(bindings) = self.bindings.as_ref() else {
            log::warn!(
                "ignoring {} on {:?}: widget not bound",
                event.kind.name(),
                event.target
            );
            return Ok(());
        };
        let target = event.target;
        let is_input = bindings.inputs.contains(&target);
        let is_form = bindings.form == Some(target);
        let is_toggle = bindings.constrain == Some(target);

        match event.kind {
            kind if kind.is_raw_input() => {
                if let (true, Some(liveness)) = (is_input, self.liveness.as_ref()) {
                    scheduler.defer(liveness, DeferredInput { input: target });
                }
                Ok(())
            }
            EventKind::Change if is_toggle => {
                self.on_constrain_change(dom, target);
                Ok(())
            }
            EventKind::Submit if is_form => self.on_submit(dom, port, event),
            EventKind::Load { width, height } => {
                let mut cx = InsertContext {
                    dom,
                    store: &mut self.store,
                    bindings,
                    selectors: &self.config.selectors,
                };
                self.handler
                    .handle_load(&mut cx, target, SizeState::new(width, height))
            }
            _ => Ok(()),
        }
    }

    /// Runs one continuation queued by `dispatch`. Work for a widget that is no longer bound
    /// is dropped.
    pub fn run_deferred(&mut self, dom: &mut Dom, task: DeferredInput) -> Result<(), BindError> {
        if !self.is_bound() {
            log::trace!("dropping deferred input for {:?}", task.input);
            return Ok(());
        }
        self.on_input(dom, task.input)
    }

    pub fn on_input(&mut self, dom: &mut Dom, input: ElementId) -> Result<(), BindError> {
        let Some(bindings) = self.bindings.as_ref() else {
            return Err(BindError::Destroyed);
        };
        let mut cx = InsertContext {
            dom,
            store: &mut self.store,
            bindings,
            selectors: &self.config.selectors,
        };
        self.handler.handle_input(&mut cx, input)
    }

    pub fn set_attribute(&mut self, dom: &mut Dom, name: &str, value: &str) {
        if let Some(bindings) = self.bindings.as_ref() {
            InsertContext {
                dom,
                store: &mut self.store,
                bindings,
                selectors: &self.config.selectors,
            }
            .set_attribute(name, value);
        }
    }

    pub fn constrain_proportion(&mut self, dom: &mut Dom, dimension: Dimension, value: &str) {
        if let Some(bindings) = self.bindings.as_ref() {
            InsertContext {
                dom,
                store: &mut self.store,
                bindings,
                selectors: &self.config.selectors,
            }
            .constrain_proportion(dimension, value);
        }
    }

    pub fn on_constrain_change(&mut self, dom: &Dom, toggle: ElementId) {
        let constrained = dom.is_checked(toggle);
        self.store.set_constrained(constrained);
        log::debug!("constrain proportions: {constrained}");
    }

    pub fn on_submit(
        &self,
        dom: &Dom,
        port: &mut dyn ResponsePort,
        event: &mut DomEvent,
    ) -> Result<(), BindError> {
        event.prevent_default();
        let payload = self.payload(dom)?;
        port.respond(payload)
    }

    pub fn node_snapshot(&self, dom: &Dom) -> Option<NodeSnapshot> {
        self.store.node().and_then(|node| dom.snapshot(node))
    }

    /// What a submit sends back: the node snapshot, or `null` before any node exists.
    pub fn payload(&self, dom: &Dom) -> Result<Value, BindError> {
        serde_json::to_value(self.node_snapshot(dom))
            .map_err(|err| BindError::Serialize(err.to_string()))
    }

    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.bindings = None;
        self.liveness = None;
        self.store = AttributeStore::default();
        self.lifecycle = Lifecycle::Destroyed;
        log::debug!("destroyed `{}` widget", self.handler.id());
    }
}
