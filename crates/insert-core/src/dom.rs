use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Attrs = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub children: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: Attrs::new(),
            value: None,
            checked: false,
            children: Vec::new(),
            parent: None,
        }
    }

    /// An `<input>` tagged as the source of attribute `name`.
    pub fn attribute_input(tag_attr: &str, name: impl Into<String>) -> Self {
        Self::new("input").attr(tag_attr, name).value("")
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(default)]
    pub attributes: Attrs,
}

/// Headless element arena. Elements are never freed; detaching is not supported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dom {
    #[serde(default)]
    elements: Vec<Element>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Creates a detached element.
    pub fn create(&mut self, mut element: Element) -> ElementId {
        element.parent = None;
        element.children.clear();
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        id
    }

    /// Creates `element` as the last child of `parent`. An unknown parent leaves it detached.
    pub fn append(&mut self, parent: ElementId, element: Element) -> ElementId {
        let id = self.create(element);
        if let Some(parent_el) = self.elements.get_mut(parent.0) {
            parent_el.children.push(id);
            self.elements[id.0].parent = Some(parent);
        }
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        id.0 < self.elements.len()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|el| el.parent)
    }

    /// Pre-order descendants of `root`, excluding `root` itself.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let Some(root_el) = self.get(root) else {
            return out;
        };
        let mut stack: Vec<ElementId> = root_el.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(el) = self.get(id) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn find_all(&self, root: ElementId, pred: impl Fn(&Element) -> bool) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(&pred))
            .collect()
    }

    pub fn find_first(
        &self,
        root: ElementId,
        pred: impl Fn(&Element) -> bool,
    ) -> Option<ElementId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.get(*id).is_some_and(&pred))
    }

    pub fn find_all_with_attr(&self, root: ElementId, name: &str) -> Vec<ElementId> {
        self.find_all(root, |el| el.attrs.contains_key(name))
    }

    pub fn find_all_by_class(&self, root: ElementId, class: &str) -> Vec<ElementId> {
        self.find_all(root, |el| el.has_class(class))
    }

    pub fn find_first_by_class(&self, root: ElementId, class: &str) -> Option<ElementId> {
        self.find_first(root, |el| el.has_class(class))
    }

    pub fn find_first_by_tag(&self, root: ElementId, tag: &str) -> Option<ElementId> {
        self.find_first(root, |el| el.is_tag(tag))
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id)
            .and_then(|el| el.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.attrs.insert(name.to_string(), value.into());
        }
    }

    pub fn value(&self, id: ElementId) -> Option<&str> {
        self.get(id).and_then(|el| el.value.as_deref())
    }

    pub fn set_value(&mut self, id: ElementId, value: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.value = Some(value.into());
        }
    }

    pub fn is_checked(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|el| el.checked)
    }

    pub fn set_checked(&mut self, id: ElementId, checked: bool) {
        if let Some(el) = self.get_mut(id) {
            el.checked = checked;
        }
    }

    pub fn snapshot(&self, id: ElementId) -> Option<NodeSnapshot> {
        self.get(id).map(|el| NodeSnapshot {
            tag: el.tag.clone(),
            attributes: el.attrs.clone(),
        })
    }

    /// `data-*` attributes keyed by their camel-cased suffix
    /// (`data-asset-id` becomes `assetId`), with values decoded as JSON where possible.
    pub fn data_attributes(&self, id: ElementId) -> Map<String, Value> {
        let mut out = Map::new();
        let Some(el) = self.get(id) else {
            return out;
        };
        for (name, raw) in &el.attrs {
            let Some(key) = name.strip_prefix("data-").filter(|k| !k.is_empty()) else {
                continue;
            };
            out.insert(camel_case(key), decode_data_value(raw));
        }
        out
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '-' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn decode_data_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        // Numbers only survive when they print back unchanged, so "007" stays a string.
        Ok(Value::Number(n)) if n.to_string() == raw => Value::Number(n),
        Ok(Value::Number(_)) | Ok(Value::String(_)) | Err(_) => Value::String(raw.to_string()),
        Ok(other) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descendants_are_pre_order() {
        let mut dom = Dom::new();
        let root = dom.create(Element::new("div"));
        let a = dom.append(root, Element::new("p"));
        let a1 = dom.append(a, Element::new("span"));
        let b = dom.append(root, Element::new("p"));
        assert_eq!(dom.descendants(root), vec![a, a1, b]);
        assert_eq!(dom.parent(a1), Some(a));
    }

    #[test]
    fn data_attributes_are_camel_cased_and_decoded() {
        let mut dom = Dom::new();
        let el = dom.create(
            Element::new("div")
                .attr("data-asset-id", "42")
                .attr("data-flag", "true")
                .attr("data-code", "007")
                .attr("data-url", "/media/a.png")
                .attr("data-obj", "{\"a\":1}")
                .attr("title", "ignored"),
        );
        let data = dom.data_attributes(el);
        assert_eq!(data.get("assetId"), Some(&serde_json::json!(42)));
        assert_eq!(data.get("flag"), Some(&Value::Bool(true)));
        assert_eq!(data.get("code"), Some(&serde_json::json!("007")));
        assert_eq!(data.get("url"), Some(&serde_json::json!("/media/a.png")));
        assert_eq!(data.get("obj"), Some(&serde_json::json!({ "a": 1 })));
        assert!(!data.contains_key("title"));
    }
}
