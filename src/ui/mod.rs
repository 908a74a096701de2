//! UI components for the demo window
//!
//! This module contains all user interface components built with Dioxus.

#![allow(non_snake_case)]

pub mod about;
pub mod compare;
pub mod components;
pub mod quick_demo;

use crate::app::AppState;
use crate::inference::DecodingMode;
use crate::ui::about::About;
use crate::ui::compare::Compare;
use crate::ui::components::TabButton;
use crate::ui::quick_demo::QuickDemo;
use dioxus::prelude::*;

const STYLE: &str = r#"
:root {
    --bg: #16181d;
    --bg-elevated: #1f232b;
    --border-subtle: rgba(242,237,231,0.08);
    --text-primary: #f2ede7;
    --text-secondary: #c5beb6;
    --text-tertiary: #8a847d;
    --accent-primary: #2a6b7c;
    --error: #c2554d;
}
body { margin: 0; background: var(--bg); color: var(--text-primary); font-family: system-ui, sans-serif; }
.page { display: flex; flex-direction: column; height: 100vh; }
.header { padding: 16px 24px; border-bottom: 1px solid var(--border-subtle); }
.header h1 { margin: 0 0 4px 0; font-size: 22px; }
.header p { margin: 0; color: var(--text-secondary); font-size: 13px; }
.status { display: flex; gap: 16px; margin-top: 8px; font-size: 12px; color: var(--text-tertiary); }
.tabs { display: flex; gap: 4px; padding: 4px; margin-top: 12px; width: fit-content; border-radius: 12px; border: 1px solid var(--border-subtle); }
.tab { padding: 8px 16px; border-radius: 8px; border: 1px solid transparent; background: none; color: var(--text-tertiary); cursor: pointer; font-size: 14px; }
.tab.active { color: var(--text-primary); background: rgba(242,237,231,0.06); border-color: var(--border-subtle); }
.content { flex: 1; overflow-y: auto; padding: 24px; }
.row { display: flex; gap: 16px; }
.col { flex: 1; display: flex; flex-direction: column; gap: 10px; min-width: 0; }
.col.wide { flex: 1.5; }
label { font-size: 12px; color: var(--text-tertiary); }
textarea, .field { width: 100%; box-sizing: border-box; background: var(--bg-elevated); color: var(--text-primary); border: 1px solid var(--border-subtle); border-radius: 10px; padding: 10px 12px; font-size: 14px; font-family: inherit; white-space: pre-wrap; }
.field { min-height: 20px; }
.primary { padding: 12px; border: none; border-radius: 10px; background: var(--accent-primary); color: var(--text-primary); font-size: 15px; cursor: pointer; }
.primary:disabled { opacity: 0.4; cursor: not-allowed; }
.examples { display: flex; flex-direction: column; gap: 6px; margin-top: 16px; }
.example { text-align: left; padding: 8px 12px; border-radius: 8px; border: 1px solid var(--border-subtle); background: none; color: var(--text-secondary); cursor: pointer; font-size: 13px; }
.report { white-space: pre-wrap; font-family: ui-monospace, monospace; font-size: 13px; background: var(--bg-elevated); border-radius: 10px; padding: 12px 16px; }
.note { color: var(--text-tertiary); font-size: 13px; }
"#;

#[derive(PartialEq, Clone, Copy)]
enum DemoTab {
    Quick,
    Compare,
    About,
}

/// Window layout: header, tab strip and the active view
pub fn Layout() -> Element {
    let mut active_tab = use_signal(|| DemoTab::Quick);
    let app_state = use_context::<AppState>();
    let baseline = app_state.model_state(DecodingMode::Baseline);
    let speculative = app_state.model_state(DecodingMode::Speculative);

    rsx! {
        style { "{STYLE}" }
        div {
            class: "page",

            div {
                class: "header",
                h1 { "🚀 AI Response Accelerator - Qwen 2.5 Edition" }
                p { "Enterprise-grade LLM with faster response times. Powered by speculative decoding (Qwen2.5-7B → Qwen2.5-72B-AWQ)." }

                div {
                    class: "status",
                    span { "Baseline: {baseline.read().label()}" }
                    span { "Speculative: {speculative.read().label()}" }
                }

                div {
                    class: "tabs",
                    TabButton {
                        active: active_tab() == DemoTab::Quick,
                        onclick: move |_| active_tab.set(DemoTab::Quick),
                        label: "⚡ Quick Demo",
                    }
                    TabButton {
                        active: active_tab() == DemoTab::Compare,
                        onclick: move |_| active_tab.set(DemoTab::Compare),
                        label: "📊 Side-by-Side Comparison",
                    }
                    TabButton {
                        active: active_tab() == DemoTab::About,
                        onclick: move |_| active_tab.set(DemoTab::About),
                        label: "ℹ️ About",
                    }
                }
            }

            div {
                class: "content",
                match active_tab() {
                    DemoTab::Quick => rsx! { QuickDemo {} },
                    DemoTab::Compare => rsx! { Compare {} },
                    DemoTab::About => rsx! { About {} },
                }
            }
        }
    }
}
