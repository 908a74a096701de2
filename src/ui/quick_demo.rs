//! Quick demo tab: one prompt through one decoding mode

use crate::app::AppState;
use crate::demo::SingleInference;
use crate::inference::DecodingMode;
use crate::ui::components::{ExamplePrompts, OutputField};
use dioxus::prelude::*;

#[component]
pub fn QuickDemo() -> Element {
    let app_state = use_context::<AppState>();
    let mut prompt = use_signal(String::new);
    let mut mode = use_signal(|| DecodingMode::Speculative);
    let mut output = use_signal(SingleInference::default);
    let mut is_running = app_state.is_running;

    let run = move |_: MouseEvent| {
        if is_running() {
            return;
        }
        let state = app_state.clone();
        let text = prompt();
        let selected = mode();

        spawn(async move {
            is_running.set(true);
            state.begin(selected);
            let result = state.service.single_inference(&text, selected).await;
            state.finish(selected);
            output.set(result);
            is_running.set(false);
        });
    };

    let button_label = if is_running() { "⏳ Generating..." } else { "🚀 Generate Response" };
    let current = output();

    rsx! {
        div {
            h3 { "Single Inference Mode" }
            p { class: "note", "Test individual queries with either baseline or speculative decoding." }

            div {
                class: "row",

                div {
                    class: "col",
                    label { "Enter Your Prompt" }
                    textarea {
                        rows: "4",
                        placeholder: "Ask me anything...",
                        value: "{prompt}",
                        oninput: move |evt| prompt.set(evt.value()),
                    }

                    label { "Inference Mode" }
                    for option in [DecodingMode::Baseline, DecodingMode::Speculative] {
                        div {
                            key: "{option}",
                            input {
                                r#type: "radio",
                                name: "mode",
                                id: "mode-{option}",
                                checked: mode() == option,
                                onchange: move |_| mode.set(option),
                            }
                            label { r#for: "mode-{option}", " {option.label()}" }
                        }
                    }
                    p { class: "note", "Compare standard vs accelerated inference" }

                    button {
                        class: "primary",
                        disabled: is_running(),
                        onclick: run,
                        "{button_label}"
                    }
                }

                div {
                    class: "col wide",
                    OutputField { label: "📝 Generated Response", value: current.text, lines: 8 }
                    div {
                        class: "row",
                        div { class: "col", OutputField { label: "⏱️ Latency", value: current.latency } }
                        div { class: "col", OutputField { label: "🚀 Throughput", value: current.throughput } }
                    }
                    OutputField { label: "ℹ️ Model Information", value: current.info, lines: 3 }
                }
            }

            ExamplePrompts {
                title: "Example Enterprise Prompts",
                on_pick: move |example: String| prompt.set(example),
            }
        }
    }
}
