//! Small widgets shared by the demo views

use crate::benchmark::prompts::ENTERPRISE_EXAMPLES;
use dioxus::prelude::*;

#[component]
pub fn TabButton(active: bool, onclick: EventHandler<MouseEvent>, label: String) -> Element {
    let classes = if active { "tab active" } else { "tab" };

    rsx! {
        button {
            class: "{classes}",
            onclick: onclick,
            "{label}"
        }
    }
}

/// Labelled read-only output box
#[component]
pub fn OutputField(label: String, value: String, #[props(default = 1)] lines: usize) -> Element {
    let min_height = format!("min-height: {}px;", lines * 20);

    rsx! {
        div {
            label { "{label}" }
            div {
                class: "field",
                style: "{min_height}",
                "{value}"
            }
        }
    }
}

/// Clickable example prompts; a click hands the prompt to `on_pick`
#[component]
pub fn ExamplePrompts(title: String, on_pick: EventHandler<String>) -> Element {
    rsx! {
        div {
            class: "examples",
            label { "{title}" }
            for example in ENTERPRISE_EXAMPLES.iter() {
                button {
                    key: "{example}",
                    class: "example",
                    onclick: move |_| on_pick.call(example.to_string()),
                    "{example}"
                }
            }
        }
    }
}
