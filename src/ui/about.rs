//! About tab: how speculative decoding works and what this machine runs

use crate::app::AppState;
use crate::system::gpu::{detect_gpu, GpuInfo};
use dioxus::prelude::*;

#[component]
pub fn About() -> Element {
    let app_state = use_context::<AppState>();
    let gpu = use_resource(|| async {
        tokio::task::spawn_blocking(detect_gpu)
            .await
            .unwrap_or_default()
    });

    let baseline = &app_state.settings.baseline;
    let speculative = &app_state.settings.speculative;
    let draft_tokens = speculative
        .speculative
        .as_ref()
        .map(|s| s.num_speculative_tokens)
        .unwrap_or_default();
    let baseline_url = baseline.launch.base_url();
    let speculative_url = speculative.launch.base_url();

    rsx! {
        div {
            style: "max-width: 760px;",

            h2 { "How Speculative Decoding Works" }

            h4 { "Traditional Approach (Baseline)" }
            ul {
                li { "Generates tokens one at a time sequentially" }
                li { "Each token requires a full model forward pass" }
                li { "Limited by sequential dependencies" }
            }

            h4 { "Speculative Decoding (Accelerated)" }
            ol {
                li { "Draft phase: the small model (7B) quickly proposes several candidate tokens" }
                li { "Verification phase: the large model (72B) checks all candidates in one pass" }
                li { "Acceptance: correct predictions are kept, the first wrong one is regenerated" }
            }
            p { "Result: 2-4× faster inference with identical output quality." }

            hr {}

            h3 { "Technical Specifications" }
            ul {
                li { "Draft model: Qwen2.5-7B-Instruct (~14GB)" }
                li { "Target model: Qwen2.5-72B-Instruct-AWQ (~40GB, 4-bit quantized)" }
                li { "Serving engine: vLLM with speculative decoding, {draft_tokens} speculative tokens" }
                li { "Baseline endpoint: {baseline.served_model_name} at {baseline_url}" }
                li { "Speculative endpoint: {speculative.served_model_name} at {speculative_url}" }
                li { "Expected speedup: 2.5-3.5×" }
                match &*gpu.read() {
                    Some(info) => rsx! { GpuLine { info: info.clone() } },
                    None => rsx! { li { "GPU: detecting..." } },
                }
            }

            hr {}

            h3 { "Business Benefits" }
            ul {
                li { "✅ Up to 3× more throughput with the same hardware" }
                li { "✅ Sub-2-second responses for better UX" }
                li { "✅ Zero quality loss, the target model verifies every token" }
                li { "✅ Lower inference cost per query" }
            }
        }
    }
}

#[component]
fn GpuLine(info: GpuInfo) -> Element {
    if !info.is_available {
        return rsx! { li { "GPU: {info.name}" } };
    }

    let total_gb = info.vram_total_mb as f64 / 1024.0;
    let free_gb = info.vram_free_mb() as f64 / 1024.0;

    rsx! {
        li { "GPU: {info.name} ({total_gb:.1} GB total, {free_gb:.1} GB free)" }
    }
}
