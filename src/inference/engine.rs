//! Engine lifecycle
//!
//! Spawns the serving engine (or attaches to a running one) and waits until it is ready.

use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::time::sleep;

use crate::inference::InferenceError;
use crate::types::config::{EngineConfig, LaunchMode};

const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(2);
const HEALTH_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A loaded engine. A spawned engine process is killed when the handle drops.
#[derive(Debug)]
pub struct EngineHandle {
    base_url: String,
    child: Option<Child>,
    http: reqwest::Client,
}

impl EngineHandle {
    /// Load the engine described by `config` and block until it serves requests.
    pub async fn start(config: &EngineConfig) -> Result<Self, InferenceError> {
        config.validate()?;

        let base_url = config.launch.base_url();
        let http = reqwest::Client::new();

        match &config.launch {
            LaunchMode::Spawn { binary, .. } => {
                let args = config.serve_args();
                tracing::info!("Starting engine: {} {}", binary, args.join(" "));

                let mut cmd = Command::new(binary);
                cmd.args(&args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .kill_on_drop(true);

                let child = cmd
                    .spawn()
                    .map_err(|e| InferenceError::Spawn(format!("{}: {}", binary, e)))?;

                let mut handle = Self {
                    base_url,
                    child: Some(child),
                    http,
                };
                handle
                    .wait_until_healthy(Duration::from_secs(config.load_timeout_secs))
                    .await?;
                Ok(handle)
            }
            LaunchMode::Attach { .. } => {
                let handle = Self {
                    base_url,
                    child: None,
                    http,
                };
                if !handle.is_healthy().await {
                    return Err(InferenceError::Unreachable(handle.base_url.clone()));
                }
                tracing::info!("Attached to engine at {}", handle.base_url);
                Ok(handle)
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether this handle owns the engine process
    pub fn is_spawned(&self) -> bool {
        self.child.is_some()
    }

    /// Single health probe, false on any failure
    pub async fn is_healthy(&self) -> bool {
        self.http
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_REQUEST_TIMEOUT)
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    async fn wait_until_healthy(&mut self, timeout: Duration) -> Result<(), InferenceError> {
        let started = Instant::now();

        loop {
            if let Some(child) = self.child.as_mut() {
                let exited = child
                    .try_wait()
                    .map_err(|e| InferenceError::Spawn(e.to_string()))?;
                if let Some(status) = exited {
                    return Err(InferenceError::EngineExited(status.to_string()));
                }
            }

            if self.is_healthy().await {
                tracing::info!(
                    "Engine ready at {} after {:.1}s",
                    self.base_url,
                    started.elapsed().as_secs_f64()
                );
                return Ok(());
            }

            if started.elapsed() >= timeout {
                return Err(InferenceError::LoadTimeout(timeout.as_secs()));
            }

            sleep(HEALTH_POLL_INTERVAL).await;
        }
    }
}
