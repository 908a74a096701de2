//! Root Dioxus application component
//!
//! This module contains the main App component that serves as the root of the UI tree.

use crate::demo::DemoService;
use crate::inference::DecodingMode;
use crate::storage::settings::HarnessSettings;
use crate::ui::Layout;
use dioxus::prelude::*;
use std::sync::Arc;

/// Load state of one generator as seen by the UI
#[derive(Clone, PartialEq, Debug)]
pub enum ModelState {
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

impl ModelState {
    pub fn label(&self) -> &'static str {
        match self {
            ModelState::NotLoaded => "not loaded",
            ModelState::Loading => "loading...",
            ModelState::Loaded => "ready",
            ModelState::Failed => "load failed",
        }
    }
}

/// Process-wide handles injected by `main` before the window opens
#[derive(Clone)]
pub struct DemoContext {
    pub service: Arc<DemoService>,
    pub settings: HarnessSettings,
}

/// Global application state shared across components
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DemoService>,
    pub settings: HarnessSettings,
    pub baseline_state: Signal<ModelState>,
    pub speculative_state: Signal<ModelState>,
    /// One request at a time; both tabs share this flag
    pub is_running: Signal<bool>,
}

impl AppState {
    pub fn new(context: DemoContext) -> Self {
        tracing::info!("AppState initialized");
        Self {
            service: context.service,
            settings: context.settings,
            baseline_state: Signal::new(ModelState::NotLoaded),
            speculative_state: Signal::new(ModelState::NotLoaded),
            is_running: Signal::new(false),
        }
    }

    pub fn model_state(&self, mode: DecodingMode) -> Signal<ModelState> {
        match mode {
            DecodingMode::Baseline => self.baseline_state,
            DecodingMode::Speculative => self.speculative_state,
        }
    }

    /// Mark `mode` as loading if its generator has not been built yet
    pub fn begin(&self, mode: DecodingMode) {
        if !self.service.is_loaded(mode) {
            let mut state = self.model_state(mode);
            state.set(ModelState::Loading);
        }
    }

    /// Sync the UI state of `mode` with the service after a request
    pub fn finish(&self, mode: DecodingMode) {
        let mut state = self.model_state(mode);
        if self.service.is_loaded(mode) {
            state.set(ModelState::Loaded);
        } else if *state.peek() == ModelState::Loading {
            state.set(ModelState::Failed);
        }
    }
}

#[component]
pub fn App() -> Element {
    let context = use_context::<DemoContext>();
    use_context_provider(|| AppState::new(context));

    rsx! {
        Layout {}
    }
}
