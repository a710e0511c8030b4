use std::sync::mpsc::{Receiver, channel};

use insert_core::{
    BindState, BinderConfig, Dom, DomEvent, EditorWindow, Element, ElementId, ImageInsert, PopupMessage,
    ResponsePort, WindowPopup,
};
use serde_json::json;

struct Form {
    dom: Dom,
    root: ElementId,
    form: ElementId,
    src: ElementId,
    width: ElementId,
}

fn form() -> Form {
    let mut dom = Dom::new();
    let root = dom.create(Element::new("div"));
    let form = dom.append(root, Element::new("form"));
    let src = dom.append(form, Element::attribute_input("data-attribute", "src"));
    let width = dom.append(form, Element::attribute_input("data-attribute", "width"));
    dom.append(root, Element::new("div").class("image-preview"));
    Form {
        dom,
        root,
        form,
        src,
        width,
    }
}

fn open_with_opener(dom: Dom, root: ElementId) -> (EditorWindow<ImageInsert>, Receiver<String>) {
    let (tx, rx) = channel();
    let window = EditorWindow::open(
        dom,
        BinderConfig::new(root),
        ImageInsert::new(),
        WindowPopup::with_opener(tx),
    )
    .unwrap();
    (window, rx)
}

fn messages(rx: &Receiver<String>) -> Vec<PopupMessage> {
    rx.try_iter()
        .map(|raw| PopupMessage::from_json_str(&raw).unwrap())
        .collect()
}

#[test]
fn submit_prevents_navigation_and_responds_once_with_node_state() -> anyhow::Result<()> {
    let f = form();
    let (mut window, rx) = open_with_opener(f.dom.clone(), f.root);
    window.paste(f.src, "/media/a.png")?;
    window.paste(f.width, "120")?;
    window.run_until_idle()?;

    let event = window.submit()?;
    assert!(event.default_prevented());

    let sent = messages(&rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].schema, "insert-popup");
    assert_eq!(sent[0].version, 1);
    assert_eq!(
        sent[0].payload,
        json!({
            "tag": "img",
            "attributes": { "src": "/media/a.png", "width": "120" }
        })
    );
    assert!(window.popup().is_closed());
    assert!(!window.widget().is_bound());
    Ok(())
}

#[test]
fn submit_targets_only_the_bound_form() -> anyhow::Result<()> {
    let f = form();
    let (mut window, rx) = open_with_opener(f.dom.clone(), f.root);

    let event = window.dispatch(DomEvent::submit(f.src))?;

    assert!(!event.default_prevented());
    assert!(messages(&rx).is_empty());
    Ok(())
}

#[test]
fn submit_before_any_edit_sends_null() -> anyhow::Result<()> {
    let f = form();
    let (mut window, rx) = open_with_opener(f.dom.clone(), f.form);

    // Rooted at the form itself, so the form is not one of its own descendants.
    assert!(window.widget().bindings().unwrap().form.is_none());
    window.dispatch(DomEvent::submit(f.form))?;
    assert!(messages(&rx).is_empty());

    let (mut window, rx) = open_with_opener(f.dom.clone(), f.root);
    window.submit()?;
    let sent = messages(&rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].payload, serde_json::Value::Null);
    Ok(())
}

#[test]
fn embedded_editor_submits_without_side_effects() -> anyhow::Result<()> {
    let f = form();
    let mut window = EditorWindow::open(
        f.dom.clone(),
        BinderConfig::new(f.root),
        ImageInsert::new(),
        WindowPopup::embedded(),
    )?;

    let event = window.submit()?;

    assert!(event.default_prevented());
    assert!(!window.popup().is_closed());
    assert!(window.widget().is_bound());
    Ok(())
}

#[test]
fn popup_data_responds_on_open() -> anyhow::Result<()> {
    let mut f = form();
    f.dom.append(
        f.root,
        Element::new("div")
            .class("widget-popup-data")
            .attr("data-id", "7")
            .attr("data-title", "Sunset"),
    );

    let (mut window, rx) = open_with_opener(f.dom.clone(), f.root);

    let sent = messages(&rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].payload, json!({ "id": 7, "title": "Sunset" }));
    assert!(window.popup().is_closed());
    assert!(!window.widget().is_bound());
    assert_eq!(window.widget().state(), BindState::Destroyed);

    window.paste(f.src, "/media/a.png")?;
    assert!(window.scheduler().is_idle());
    Ok(())
}

#[test]
fn close_affordance_closes_popup_with_opener() -> anyhow::Result<()> {
    let mut f = form();
    let close = f
        .dom
        .append(f.root, Element::new("button").class("close-popup"));
    let (mut window, rx) = open_with_opener(f.dom.clone(), f.root);

    window.dispatch(DomEvent::click(close))?;

    assert!(window.popup().is_closed());
    assert!(!window.widget().is_bound());
    assert!(messages(&rx).is_empty());
    Ok(())
}

#[test]
fn popup_affordances_are_inert_without_opener() -> anyhow::Result<()> {
    let mut f = form();
    let close = f
        .dom
        .append(f.root, Element::new("button").class("close-popup"));
    f.dom.append(
        f.root,
        Element::new("div")
            .class("widget-popup-data")
            .attr("data-id", "7"),
    );
    let mut window = EditorWindow::open(
        f.dom.clone(),
        BinderConfig::new(f.root),
        ImageInsert::new(),
        WindowPopup::embedded(),
    )?;

    window.dispatch(DomEvent::click(close))?;

    assert!(!window.popup().is_closed());
    assert!(window.widget().is_bound());
    Ok(())
}

#[test]
fn closed_popup_drops_further_responses() -> anyhow::Result<()> {
    let (tx, rx) = channel();
    let mut popup = WindowPopup::with_opener(tx);

    popup.respond(json!({ "n": 1 }))?;
    popup.respond(json!({ "n": 2 }))?;

    let sent = messages(&rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].payload, json!({ "n": 1 }));
    Ok(())
}

#[test]
fn message_envelope_fills_defaults() {
    let message = PopupMessage::from_json_str(r#"{ "payload": { "a": 1 } }"#).unwrap();
    assert_eq!(message.schema, "insert-popup");
    assert_eq!(message.version, 1);
    assert_eq!(message.payload, json!({ "a": 1 }));
}
