use crate::binder::{BindError, InsertContext, InsertHandler};
use crate::dom::{Element, ElementId};

const DEFAULT_PREVIEW_CLASS: &str = "video-preview";
const DEFAULT_EMBED_TAG: &str = "iframe";

/// Edits an embed in the preview container. Embeds report no natural size, so the size model
/// fills in from whatever dimensions the user types; proportions lock once both are known.
#[derive(Debug, Clone)]
pub struct VideoInsert {
    preview_class: String,
    embed_tag: String,
}

impl Default for VideoInsert {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoInsert {
    pub fn new() -> Self {
        Self {
            preview_class: DEFAULT_PREVIEW_CLASS.to_string(),
            embed_tag: DEFAULT_EMBED_TAG.to_string(),
        }
    }

    pub fn preview_class(mut self, preview_class: impl Into<String>) -> Self {
        self.preview_class = preview_class.into();
        self
    }

    pub fn embed_tag(mut self, embed_tag: impl Into<String>) -> Self {
        self.embed_tag = embed_tag.into();
        self
    }
}

impl InsertHandler for VideoInsert {
    fn id(&self) -> &'static str {
        "video"
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

        let embed = match cx.dom().find_first_by_tag(preview, &self.embed_tag) {
            Some(embed) => embed,
            None => cx
                .dom_mut()
                .append(preview, Element::new(self.embed_tag.clone())),
        };
        cx.store_mut().adopt_node(embed);

        cx.apply_edit(&attribute, &value);
        Ok(())
    }
}
