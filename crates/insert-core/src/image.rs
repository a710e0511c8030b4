use crate::binder::{BindError, InsertContext, InsertHandler};
use crate::dom::{Element, ElementId};
use crate::proportion::format_dimension;
use crate::store::SizeState;

const DEFAULT_PREVIEW_CLASS: &str = "image-preview";

/// Edits an `<img>` living in the preview container. The image is created on first input and
/// its natural size seeds the size model once it loads.
#[derive(Debug, Clone)]
pub struct ImageInsert {
    preview_class: String,
    pending_load: Option<ElementId>,
}

impl Default for ImageInsert {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageInsert {
    pub fn new() -> Self {
        Self {
            preview_class: DEFAULT_PREVIEW_CLASS.to_string(),
            pending_load: None,
        }
    }

    pub fn preview_class(mut self, preview_class: impl Into<String>) -> Self {
        self.preview_class = preview_class.into();
        self
    }

    /// The image still waiting for its first load, if any.
    pub fn pending_load(&self) -> Option<ElementId> {
        self.pending_load
    }
}

impl InsertHandler for ImageInsert {
    fn id(&self) -> &'static str {
        "image"
    }

    fn handle_input(
        &mut self,
        cx: &mut InsertContext<'_>,
        input: ElementId,
    ) -> Result<(), BindError> {
        let Some(attribute) = cx.attribute_of(input) else {
            return Ok(());
        };
        let value = cx.dom().value(input).unwrap_or_default().to_string();

        let Some(preview) = cx.dom().find_first_by_class(cx.root(), &self.preview_class) else {
            log::debug!("no `.{}` container, ignoring `{attribute}`", self.preview_class);
            return Ok(());
        };

        match cx.dom().find_first_by_tag(preview, "img") {
            Some(img) => cx.store_mut().adopt_node(img),
            None => {
                let img = cx.dom_mut().append(preview, Element::new("img"));
                cx.store_mut().adopt_node(img);
                self.pending_load = Some(img);
            }
        }

        cx.apply_edit(&attribute, &value);
        Ok(())
    }

    fn handle_load(
        &mut self,
        cx: &mut InsertContext<'_>,
        target: ElementId,
        natural: SizeState,
    ) -> Result<(), BindError> {
        if self.pending_load != Some(target) {
            return Ok(());
        }
        self.pending_load = None;

        cx.store_mut().seed_size(natural);
        for (name, value) in [("width", natural.width), ("height", natural.height)] {
            if let Some(value) = value {
                cx.set_attribute(name, &format_dimension(value));
            }
        }
        Ok(())
    }
}
