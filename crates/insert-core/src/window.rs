use crate::binder::{BindError, BinderConfig, DeferredInput, InsertHandler, InsertWidget};
use crate::dom::{Dom, ElementId};
use crate::events::{DomEvent, EventKind};
use crate::popup::WindowPopup;
use crate::scheduler::Scheduler;

/// One editor window: its document, the widget bound to it, the event loop driving deferred
/// input, and the popup it reports back through.
pub struct EditorWindow<H> {
    dom: Dom,
    widget: InsertWidget<H>,
    scheduler: Scheduler<DeferredInput>,
    popup: WindowPopup,
    close_targets: Vec<ElementId>,
}

impl<H: InsertHandler> EditorWindow<H> {
    pub fn open(
        dom: Dom,
        config: BinderConfig,
        handler: H,
        mut popup: WindowPopup,
    ) -> Result<Self, BindError> {
        let mut widget = InsertWidget::new(config, handler);
        widget.init(&dom)?;
        let close_targets = popup.handle_popup(&dom, widget.config().root)?;
        if popup.is_closed() {
            widget.destroy();
        }
        Ok(Self {
            dom,
            widget,
            scheduler: Scheduler::new(),
            popup,
            close_targets,
        })
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn widget(&self) -> &InsertWidget<H> {
        &self.widget
    }

    pub fn popup(&self) -> &WindowPopup {
        &self.popup
    }

    pub fn scheduler(&self) -> &Scheduler<DeferredInput> {
        &self.scheduler
    }

    /// Dispatches `event` and hands it back so callers can see whether the default action
    /// was prevented.
    pub fn dispatch(&mut self, mut event: DomEvent) -> Result<DomEvent, BindError> {
        if event.kind == EventKind::Click && self.close_targets.contains(&event.target) {
            self.close();
            return Ok(event);
        }
        self.widget.dispatch(
            &mut self.dom,
            &mut self.scheduler,
            &mut self.popup,
            &mut event,
        )?;
        if self.popup.is_closed() {
            self.widget.destroy();
        }
        Ok(event)
    }

    /// Runs one turn of the event loop. The first handler error aborts the rest of the turn,
    /// and the continuations still left in it are dropped.
    pub fn run_turn(&mut self) -> Result<usize, BindError> {
        let tasks = self.scheduler.take_turn();
        let total = tasks.len();
        let mut ran = 0;
        for task in tasks {
            if let Err(err) = self.widget.run_deferred(&mut self.dom, task) {
                log::warn!(
                    "turn {} aborted: {err}; dropped {} continuation(s)",
                    self.scheduler.turns(),
                    total - ran - 1
                );
                return Err(err);
            }
            ran += 1;
        }
        log::trace!("turn {} ran {ran} continuation(s)", self.scheduler.turns());
        Ok(ran)
    }

    pub fn run_until_idle(&mut self) -> Result<usize, BindError> {
        let mut ran = 0;
        while !self.scheduler.is_idle() {
            ran += self.run_turn()?;
        }
        Ok(ran)
    }

    /// A keypress: the event fires before the character reaches the field.
    pub fn key_press(&mut self, input: ElementId, ch: char) -> Result<DomEvent, BindError> {
        let event = self.dispatch(DomEvent::key_press(input))?;
        let mut value = self.dom.value(input).unwrap_or_default().to_string();
        value.push(ch);
        self.dom.set_value(input, value);
        Ok(event)
    }

    /// A paste: the clipboard text lands in the field only after the event is dispatched.
    pub fn paste(&mut self, input: ElementId, text: &str) -> Result<DomEvent, BindError> {
        let event = self.dispatch(DomEvent::paste(input))?;
        let mut value = self.dom.value(input).unwrap_or_default().to_string();
        value.push_str(text);
        self.dom.set_value(input, value);
        Ok(event)
    }

    pub fn toggle_constrain(&mut self, checked: bool) -> Result<DomEvent, BindError> {
        let Some(toggle) = self.widget.bindings().and_then(|b| b.constrain) else {
            return Ok(DomEvent::change(self.widget.config().root));
        };
        self.dom.set_checked(toggle, checked);
        self.dispatch(DomEvent::change(toggle))
    }

    pub fn submit(&mut self) -> Result<DomEvent, BindError> {
        let target = self
            .widget
            .bindings()
            .and_then(|b| b.form)
            .unwrap_or(self.widget.config().root);
        self.dispatch(DomEvent::submit(target))
    }

    pub fn close(&mut self) {
        self.popup.close();
        self.widget.destroy();
    }
}
