//! GPU detection
//!
//! Best-effort inventory of the NVIDIA GPUs the serving engine will run on.

use std::process::Command;

/// GPU information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuInfo {
    pub name: String,
    pub vram_total_mb: u64,
    pub vram_used_mb: u64,
    /// Number of devices reported; VRAM figures are summed across them
    pub device_count: usize,
    pub is_available: bool,
}

impl GpuInfo {
    fn not_detected() -> Self {
        Self {
            name: "GPU not detected".to_string(),
            ..Self::default()
        }
    }

    pub fn vram_free_mb(&self) -> u64 {
        self.vram_total_mb.saturating_sub(self.vram_used_mb)
    }
}

/// Detect available GPUs (best effort)
pub fn detect_gpu() -> GpuInfo {
    detect_gpu_nvidia_smi().unwrap_or_else(GpuInfo::not_detected)
}

fn detect_gpu_nvidia_smi() -> Option<GpuInfo> {
    let output = Command::new("nvidia-smi")
        .args([
            "--query-gpu=name,memory.total,memory.used",
            "--format=csv,noheader,nounits",
        ])
        .output()
        .ok()?;

    if !output.status.success() {
        tracing::debug!("nvidia-smi exited with {}", output.status);
        return None;
    }

    parse_nvidia_smi(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `name, total, used` CSV lines, one per device
fn parse_nvidia_smi(stdout: &str) -> Option<GpuInfo> {
    let mut names: Vec<String> = Vec::new();
    let mut vram_total_mb = 0;
    let mut vram_used_mb = 0;

    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
        if parts.len() < 3 {
            continue;
        }
        let (Ok(total), Ok(used)) = (parts[1].parse::<u64>(), parts[2].parse::<u64>()) else {
            continue;
        };
        names.push(parts[0].to_string());
        vram_total_mb += total;
        vram_used_mb += used;
    }

    let first = names.first()?.clone();
    let name = if names.len() > 1 {
        format!("{} x{}", first, names.len())
    } else {
        first
    };

    Some(GpuInfo {
        name,
        vram_total_mb,
        vram_used_mb,
        device_count: names.len(),
        is_available: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_gpu() {
        let info = parse_nvidia_smi("NVIDIA A100-SXM4-80GB, 81920, 1024\n").unwrap();
        assert_eq!(info.name, "NVIDIA A100-SXM4-80GB");
        assert_eq!(info.vram_total_mb, 81920);
        assert_eq!(info.vram_free_mb(), 80896);
        assert_eq!(info.device_count, 1);
        assert!(info.is_available);
    }

    #[test]
    fn test_parse_multi_gpu_sums_memory() {
        let out = "NVIDIA L40S, 46068, 100\nNVIDIA L40S, 46068, 200\n\n";
        let info = parse_nvidia_smi(out).unwrap();
        assert_eq!(info.name, "NVIDIA L40S x2");
        assert_eq!(info.vram_total_mb, 92136);
        assert_eq!(info.vram_used_mb, 300);
        assert_eq!(info.device_count, 2);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_nvidia_smi("").is_none());
        assert!(parse_nvidia_smi("No devices were found").is_none());
        assert!(parse_nvidia_smi("GPU, [N/A], [N/A]").is_none());
    }

    #[test]
    fn test_not_detected() {
        let info = GpuInfo::not_detected();
        assert!(!info.is_available);
        assert_eq!(info.vram_free_mb(), 0);
    }
}
