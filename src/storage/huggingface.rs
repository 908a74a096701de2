//! HuggingFace snapshot downloader
//!
//! Mirrors the draft and target model repositories into local directories.

use crate::storage::StorageError;
use async_trait::async_trait;
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

pub const HUB_ENDPOINT: &str = "https://huggingface.co";
pub const DRAFT_REPO: &str = "Qwen/Qwen2.5-7B-Instruct";
pub const TARGET_REPO: &str = "Qwen/Qwen2.5-72B-Instruct-AWQ";

/// Subdirectories of the models root the artifacts land in
pub const DRAFT_DIR: &str = "draft";
pub const TARGET_DIR: &str = "target";

/// Files never mirrored locally
pub const IGNORE_PATTERNS: &[&str] = &["*.md", "*.txt", "*.pdf"];

/// A repository mirrored into a local directory
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub name: String,
    pub repo_id: String,
    pub revision: String,
    pub local_dir: PathBuf,
}

impl ModelArtifact {
    pub fn new(name: &str, repo_id: &str, local_dir: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            repo_id: repo_id.to_string(),
            revision: "main".to_string(),
            local_dir,
        }
    }
}

/// The draft and target artifacts under `models_dir`
pub fn default_artifacts(models_dir: &Path) -> Vec<ModelArtifact> {
    vec![
        ModelArtifact::new("draft", DRAFT_REPO, models_dir.join(DRAFT_DIR)),
        ModelArtifact::new("target", TARGET_REPO, models_dir.join(TARGET_DIR)),
    ]
}

/// Accept `owner/repo` or a huggingface.co URL and return `owner/repo`
pub fn parse_repo_id(input: &str) -> Result<String, StorageError> {
    let input = input.trim();
    let input = input.split('?').next().unwrap_or(input);
    let input = input.split('#').next().unwrap_or(input);

    let path = input
        .trim_start_matches("https://huggingface.co/")
        .trim_start_matches("http://huggingface.co/");

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return Err(StorageError::InvalidPath(input.to_string()));
    }
    Ok(format!("{}/{}", parts[0], parts[1]))
}

/// Entry of the Hub tree listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteFile {
    pub path: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "file".to_string()
}

impl RemoteFile {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// Remote model repository
#[async_trait]
pub trait ModelHub: Send + Sync {
    /// List every entry of the repository at `revision`
    async fn list_files(&self, repo_id: &str, revision: &str)
        -> Result<Vec<RemoteFile>, StorageError>;

    /// Write one file to `dest`, returning the number of bytes written
    async fn fetch(
        &self,
        repo_id: &str,
        revision: &str,
        file: &RemoteFile,
        dest: &Path,
    ) -> Result<u64, StorageError>;
}

/// The public HuggingFace Hub
pub struct HuggingFaceHub {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HuggingFaceHub {
    pub fn new(token: Option<String>) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(3600)) // large shards
            .user_agent(concat!("specbench/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: HUB_ENDPOINT.to_string(),
            token,
        })
    }

    /// Read the token from `HF_TOKEN`, if set
    pub fn from_env() -> Result<Self, StorageError> {
        let token = std::env::var("HF_TOKEN").ok().filter(|t| !t.trim().is_empty());
        if token.is_some() {
            tracing::debug!("Using HF_TOKEN for hub requests");
        }
        Self::new(token)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ModelHub for HuggingFaceHub {
    async fn list_files(
        &self,
        repo_id: &str,
        revision: &str,
    ) -> Result<Vec<RemoteFile>, StorageError> {
        let url = format!(
            "{}/api/models/{}/tree/{}?recursive=true",
            self.endpoint, repo_id, revision
        );
        let response = self.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(StorageError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(response.json().await?)
    }

    async fn fetch(
        &self,
        repo_id: &str,
        revision: &str,
        file: &RemoteFile,
        dest: &Path,
    ) -> Result<u64, StorageError> {
        let url = format!(
            "{}/{}/resolve/{}/{}",
            self.endpoint, repo_id, revision, file.path
        );
        tracing::debug!("Downloading from: {}", url);

        let mut response = self.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(StorageError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let expected = file.size.or(response.content_length());

        let mut out = File::create(dest).await?;
        let mut downloaded: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }
        out.flush().await?;

        if let Some(expected) = expected {
            if downloaded != expected {
                return Err(StorageError::Incomplete {
                    path: file.path.clone(),
                    got: downloaded,
                    expected,
                });
            }
        }
        Ok(downloaded)
    }
}

/// Counters for one mirrored repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub bytes: u64,
}

/// Result of mirroring one artifact
#[derive(Debug)]
pub struct ArtifactOutcome {
    pub artifact: ModelArtifact,
    pub result: Result<SnapshotSummary, StorageError>,
}

impl ArtifactOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

fn ignore_patterns() -> Vec<Pattern> {
    IGNORE_PATTERNS
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
}

fn is_ignored(path: &str, patterns: &[Pattern]) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    patterns.iter().any(|p| p.matches(name))
}

/// Turn a repository path into a path below the artifact directory
fn safe_relative_path(path: &str) -> Result<PathBuf, StorageError> {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed.contains('\\') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    let relative = Path::new(trimmed);
    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(StorageError::InvalidPath(path.to_string())),
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(clean)
}

/// Whether `dest` already holds the complete file
fn is_complete(dest: &Path, file: &RemoteFile) -> bool {
    match fs::metadata(dest) {
        Ok(meta) => match file.size {
            Some(size) => meta.len() == size,
            None => meta.len() > 0,
        },
        Err(_) => false,
    }
}

/// Mirror one repository into its local directory.
///
/// Files already present with the expected size are skipped. Each file is
/// written to a `.part` sibling and renamed into place once complete.
pub async fn download_snapshot(
    hub: &dyn ModelHub,
    artifact: &ModelArtifact,
) -> Result<SnapshotSummary, StorageError> {
    fs::create_dir_all(&artifact.local_dir)?;

    let files = hub.list_files(&artifact.repo_id, &artifact.revision).await?;
    let patterns = ignore_patterns();
    let mut summary = SnapshotSummary::default();

    for file in files.iter().filter(|f| f.is_file()) {
        if is_ignored(&file.path, &patterns) {
            summary.ignored += 1;
            continue;
        }

        let dest = artifact.local_dir.join(safe_relative_path(&file.path)?);
        if is_complete(&dest, file) {
            tracing::debug!("Already present: {}", file.path);
            summary.skipped += 1;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut part_name = dest.as_os_str().to_owned();
        part_name.push(".part");
        let part = PathBuf::from(part_name);

        tracing::info!(
            "  {} ({})",
            file.path,
            file.size.map(format_size).unwrap_or_else(|| "unknown size".into())
        );
        let bytes = hub
            .fetch(&artifact.repo_id, &artifact.revision, file, &part)
            .await?;
        fs::rename(&part, &dest)?;

        summary.downloaded += 1;
        summary.bytes += bytes;
    }

    Ok(summary)
}

/// Mirror every artifact; a failure is reported without stopping the others
pub async fn download_models(
    hub: &dyn ModelHub,
    artifacts: &[ModelArtifact],
) -> Vec<ArtifactOutcome> {
    let mut outcomes = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        println!(
            "\n📥 Downloading {} model: {} → {}",
            artifact.name,
            artifact.repo_id,
            artifact.local_dir.display()
        );

        let result = download_snapshot(hub, artifact).await;
        match &result {
            Ok(summary) => println!(
                "✅ {} model ready ({} downloaded, {} already present, {})",
                artifact.name,
                summary.downloaded,
                summary.skipped,
                format_size(summary.bytes)
            ),
            Err(e) => {
                tracing::error!("Failed to download {} model: {}", artifact.name, e);
                println!("❌ Error downloading {} model: {}", artifact.name, e);
            }
        }

        outcomes.push(ArtifactOutcome {
            artifact: artifact.clone(),
            result,
        });
    }

    outcomes
}

/// Get a human-readable size string
pub fn format_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < 1024.0 {
        format!("{} B", bytes as u64)
    } else if bytes < 1024.0 * 1024.0 {
        format!("{:.2} KB", bytes / 1024.0)
    } else if bytes < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.2} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory hub keyed by repository id
    struct FakeHub {
        repos: HashMap<String, Vec<(String, Vec<u8>)>>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeHub {
        fn new() -> Self {
            Self {
                repos: HashMap::new(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn with_repo(mut self, repo_id: &str, files: &[(&str, &[u8])]) -> Self {
            self.repos.insert(
                repo_id.to_string(),
                files
                    .iter()
                    .map(|(p, b)| (p.to_string(), b.to_vec()))
                    .collect(),
            );
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelHub for FakeHub {
        async fn list_files(
            &self,
            repo_id: &str,
            _revision: &str,
        ) -> Result<Vec<RemoteFile>, StorageError> {
            let files = self.repos.get(repo_id).ok_or(StorageError::Status {
                status: 404,
                url: repo_id.to_string(),
            })?;
            let mut entries = vec![RemoteFile {
                path: "onnx".into(),
                size: None,
                kind: "directory".into(),
            }];
            entries.extend(files.iter().map(|(path, bytes)| RemoteFile {
                path: path.clone(),
                size: Some(bytes.len() as u64),
                kind: "file".into(),
            }));
            Ok(entries)
        }

        async fn fetch(
            &self,
            repo_id: &str,
            _revision: &str,
            file: &RemoteFile,
            dest: &Path,
        ) -> Result<u64, StorageError> {
            let bytes = self
                .repos
                .get(repo_id)
                .and_then(|files| files.iter().find(|(p, _)| *p == file.path))
                .map(|(_, b)| b.clone())
                .ok_or_else(|| StorageError::InvalidPath(file.path.clone()))?;
            fs::write(dest, &bytes)?;
            self.fetched.lock().unwrap().push(file.path.clone());
            Ok(bytes.len() as u64)
        }
    }

    #[test]
    fn test_default_artifacts() {
        let artifacts = default_artifacts(Path::new("./models"));
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].name, "draft");
        assert_eq!(artifacts[0].repo_id, "Qwen/Qwen2.5-7B-Instruct");
        assert_eq!(artifacts[0].local_dir, PathBuf::from("./models/draft"));
        assert_eq!(artifacts[1].repo_id, "Qwen/Qwen2.5-72B-Instruct-AWQ");
        assert_eq!(artifacts[1].local_dir, PathBuf::from("./models/target"));
    }

    #[test]
    fn test_parse_repo_id() {
        assert_eq!(
            parse_repo_id("https://huggingface.co/Qwen/Qwen2.5-7B-Instruct/tree/main").unwrap(),
            "Qwen/Qwen2.5-7B-Instruct"
        );
        assert_eq!(parse_repo_id(" Qwen/Qwen2.5-7B-Instruct ").unwrap(), "Qwen/Qwen2.5-7B-Instruct");
        assert!(parse_repo_id("Qwen").is_err());
    }

    #[test]
    fn test_ignore_patterns() {
        let patterns = ignore_patterns();
        assert!(is_ignored("README.md", &patterns));
        assert!(is_ignored("docs/LICENSE.txt", &patterns));
        assert!(is_ignored("paper.pdf", &patterns));
        assert!(!is_ignored("config.json", &patterns));
        assert!(!is_ignored("model-00001-of-00002.safetensors", &patterns));
    }

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(
            safe_relative_path("onnx/model.bin").unwrap(),
            PathBuf::from("onnx").join("model.bin")
        );
        assert!(safe_relative_path("../escape").is_err());
        assert!(safe_relative_path("/etc/passwd").is_err());
        assert!(safe_relative_path("a\\b").is_err());
        assert!(safe_relative_path("  ").is_err());
    }

    #[tokio::test]
    async fn test_snapshot_skips_ignored_and_nests_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let hub = FakeHub::new().with_repo(
            "org/model",
            &[
                ("config.json", b"{}"),
                ("README.md", b"# readme"),
                ("onnx/model.bin", b"weights"),
            ],
        );
        let artifact = ModelArtifact::new("draft", "org/model", dir.path().join("draft"));

        let summary = download_snapshot(&hub, &artifact).await.unwrap();
        assert_eq!(summary.downloaded, 2);
        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.bytes, 9);

        let local = dir.path().join("draft");
        assert_eq!(fs::read(local.join("config.json")).unwrap(), b"{}");
        assert_eq!(fs::read(local.join("onnx").join("model.bin")).unwrap(), b"weights");
        assert!(!local.join("README.md").exists());
        assert!(!local.join("config.json.part").exists());
    }

    #[tokio::test]
    async fn test_snapshot_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("target");
        fs::create_dir_all(&local).unwrap();
        // complete file from an earlier run, and a truncated one
        fs::write(local.join("config.json"), b"{}").unwrap();
        fs::write(local.join("model.safetensors"), b"wei").unwrap();

        let hub = FakeHub::new().with_repo(
            "org/model",
            &[("config.json", b"{}"), ("model.safetensors", b"weights")],
        );
        let artifact = ModelArtifact::new("target", "org/model", local.clone());

        let summary = download_snapshot(&hub, &artifact).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.downloaded, 1);
        assert_eq!(hub.fetched(), vec!["model.safetensors".to_string()]);
        assert_eq!(fs::read(local.join("model.safetensors")).unwrap(), b"weights");
    }

    #[tokio::test]
    async fn test_failed_artifact_does_not_stop_the_next() {
        let dir = tempfile::tempdir().unwrap();
        let hub = FakeHub::new().with_repo("org/good", &[("config.json", b"{}")]);
        let artifacts = vec![
            ModelArtifact::new("draft", "org/missing", dir.path().join("draft")),
            ModelArtifact::new("target", "org/good", dir.path().join("target")),
        ];

        let outcomes = download_models(&hub, &artifacts).await;
        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].is_success());
        assert!(matches!(
            outcomes[0].result,
            Err(StorageError::Status { status: 404, .. })
        ));
        assert!(outcomes[1].is_success());
        assert!(dir.path().join("target").join("config.json").exists());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
