use std::path::PathBuf;
use std::sync::mpsc::{Receiver, channel};

use anyhow::Context as _;
use anyhow::{Result, anyhow};
use insert_core::{
    BinderConfig, Dom, DomEvent, EditorWindow, Element, ElementId, ImageInsert, InsertHandler,
    PopupMessage, Selectors, VideoInsert, WindowPopup,
};
use serde::Deserialize;

const BUILTIN_SCRIPT: &str = r#"{
  "kind": "image",
  "steps": [
    { "step": "paste", "attribute": "src", "text": "/media/sunset.jpg" },
    { "step": "turn" },
    { "step": "load", "width": 100, "height": 50 },
    { "step": "constrain", "checked": true },
    { "step": "clear", "attribute": "width" },
    { "step": "paste", "attribute": "width", "text": "200" },
    { "step": "turn" },
    { "step": "submit" }
  ]
}"#;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Kind {
    #[default]
    Image,
    Video,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum Step {
    Paste { attribute: String, text: String },
    Type { attribute: String, text: String },
    Clear { attribute: String },
    Constrain { checked: bool },
    Load { width: f64, height: f64 },
    Turn,
    Submit,
    Close,
}

#[derive(Debug, Clone, Deserialize)]
struct Script {
    #[serde(default)]
    kind: Kind,
    #[serde(default)]
    selectors: Selectors,
    #[serde(default)]
    steps: Vec<Step>,
}

fn build_form(kind: Kind, selectors: &Selectors) -> (Dom, ElementId) {
    let mut dom = Dom::new();
    let root = dom.create(Element::new("div"));
    let form = dom.append(root, Element::new(selectors.form_tag.clone()));
    for name in ["src", "alt", "width", "height"] {
        dom.append(form, Element::attribute_input(&selectors.attribute_tag, name));
    }
    dom.append(
        form,
        Element::new("input")
            .attr("type", "checkbox")
            .class(selectors.constrain_class.clone()),
    );
    let preview_class = match kind {
        Kind::Image => "image-preview",
        Kind::Video => "video-preview",
    };
    dom.append(root, Element::new("div").class(preview_class));
    (dom, root)
}

fn input_for<H: InsertHandler>(window: &EditorWindow<H>, attribute: &str) -> Result<ElementId> {
    let tag = &window.widget().config().selectors.attribute_tag;
    window
        .widget()
        .bindings()
        .and_then(|b| {
            b.inputs
                .iter()
                .copied()
                .find(|&input| window.dom().attr(input, tag) == Some(attribute))
        })
        .ok_or_else(|| anyhow!("no input tagged `{attribute}`"))
}

fn run<H: InsertHandler>(
    mut window: EditorWindow<H>,
    steps: &[Step],
    responses: &Receiver<String>,
) -> Result<()> {
    for (ix, step) in steps.iter().enumerate() {
        log::debug!("step {ix}: {step:?}");
        match step {
            Step::Paste { attribute, text } => {
                let input = input_for(&window, attribute)?;
                window.paste(input, text)?;
            }
            Step::Type { attribute, text } => {
                let input = input_for(&window, attribute)?;
                for ch in text.chars() {
                    window.key_press(input, ch)?;
                }
            }
            Step::Clear { attribute } => {
                let input = input_for(&window, attribute)?;
                window.dom_mut().set_value(input, "");
            }
            Step::Constrain { checked } => {
                window.toggle_constrain(*checked)?;
            }
            Step::Load { width, height } => {
                let node = window
                    .widget()
                    .store()
                    .node()
                    .ok_or_else(|| anyhow!("step {ix}: nothing to load yet"))?;
                window.dispatch(DomEvent::load(node, *width, *height))?;
            }
            Step::Turn => {
                let ran = window.run_until_idle()?;
                log::info!("ran {ran} deferred input(s)");
            }
            Step::Submit => {
                window.submit()?;
            }
            Step::Close => window.close(),
        }
        for raw in responses.try_iter() {
            let message = PopupMessage::from_json_str(&raw).context("decoding popup message")?;
            println!("{}", serde_json::to_string_pretty(&message.payload)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let script_path = std::env::args().nth(1).map(PathBuf::from);
    let raw = match &script_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?,
        None => BUILTIN_SCRIPT.to_string(),
    };
    let script: Script = serde_json::from_str(&raw).context("parsing script")?;
    let selectors = script.selectors.clone().with_defaults();

    let (dom, root) = build_form(script.kind, &selectors);
    let config = BinderConfig { root, selectors };
    let (tx, rx) = channel();
    let popup = WindowPopup::with_opener(tx);

    match script.kind {
        Kind::Image => run(
            EditorWindow::open(dom, config, ImageInsert::new(), popup)?,
            &script.steps,
            &rx,
        ),
        Kind::Video => run(
            EditorWindow::open(dom, config, VideoInsert::new(), popup)?,
            &script.steps,
            &rx,
        ),
    }
}
