//! Side-by-side tab: the same prompt through both modes

use crate::app::AppState;
use crate::demo::SideBySide;
use crate::inference::DecodingMode;
use crate::ui::components::{ExamplePrompts, OutputField};
use dioxus::prelude::*;

#[component]
pub fn Compare() -> Element {
    let app_state = use_context::<AppState>();
    let mut prompt = use_signal(String::new);
    let mut output = use_signal(SideBySide::default);
    let mut is_running = app_state.is_running;

    let run = move |_: MouseEvent| {
        if is_running() {
            return;
        }
        let state = app_state.clone();
        let text = prompt();

        spawn(async move {
            is_running.set(true);
            state.begin(DecodingMode::Baseline);
            state.begin(DecodingMode::Speculative);
            let result = state.service.side_by_side(&text).await;
            state.finish(DecodingMode::Baseline);
            state.finish(DecodingMode::Speculative);
            output.set(result);
            is_running.set(false);
        });
    };

    let button_label = if is_running() { "⏳ Running..." } else { "⚡ Run Comparison" };
    let current = output();

    rsx! {
        div {
            h3 { "Direct Performance Comparison" }
            p { class: "note", "Run the same prompt through both methods to see the performance difference." }
            p { class: "note", "⚠️ Note: both engines stay loaded at once and need enough free GPU memory for the draft and target models together." }

            div {
                class: "col",
                label { "Enter Prompt for Comparison" }
                textarea {
                    rows: "3",
                    placeholder: "Enter your query to compare both inference methods...",
                    value: "{prompt}",
                    oninput: move |evt| prompt.set(evt.value()),
                }
                button {
                    class: "primary",
                    disabled: is_running(),
                    onclick: run,
                    "{button_label}"
                }
            }

            div {
                class: "row",
                style: "margin-top: 16px;",
                div {
                    class: "col",
                    h4 { "🐢 Baseline (Sequential)" }
                    OutputField { label: "Output", value: current.baseline_text, lines: 10 }
                }
                div {
                    class: "col",
                    h4 { "🚀 Speculative (Parallel)" }
                    OutputField { label: "Output", value: current.speculative_text, lines: 10 }
                }
            }

            if !current.report.is_empty() {
                div {
                    class: "report",
                    style: "margin-top: 16px;",
                    "{current.report}"
                }
            }

            ExamplePrompts {
                title: "Try These Examples",
                on_pick: move |example: String| prompt.set(example),
            }
        }
    }
}
