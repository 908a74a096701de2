//! Benchmark reports
//!
//! Console rendering and the three persisted artifacts: CSV table, JSON document,
//! plain-text summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use crate::benchmark::runner::{BenchmarkRun, PromptFailure};
use crate::benchmark::stats::BenchmarkSummary;
use crate::benchmark::BenchmarkError;
use crate::types::result::{ComparisonRecord, GenerationResult};

pub const CSV_FILE: &str = "qwen_benchmark_results.csv";
pub const JSON_FILE: &str = "qwen_benchmark_results.json";
pub const SUMMARY_FILE: &str = "qwen_benchmark_summary.txt";

const CSV_HEADER: &str = "prompt_id,prompt,prompt_preview,baseline_latency,baseline_tokens_per_sec,baseline_tokens,speculative_latency,speculative_tokens_per_sec,speculative_tokens,speedup,latency_reduction_pct,throughput_increase_pct,baseline_output,speculative_output";

/// Where the artifacts of a run were written
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub summary: PathBuf,
}

impl ReportPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            csv: dir.join(CSV_FILE),
            json: dir.join(JSON_FILE),
            summary: dir.join(SUMMARY_FILE),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    summary: &'a BenchmarkSummary,
    records: Vec<ComparisonRecord>,
    failures: &'a [PromptFailure],
}

/// Write all three artifacts into `dir`, creating it if needed
pub fn write_reports(
    run: &BenchmarkRun,
    summary: &BenchmarkSummary,
    dir: &Path,
) -> Result<ReportPaths, BenchmarkError> {
    fs::create_dir_all(dir)?;
    let paths = ReportPaths::in_dir(dir);

    fs::write(&paths.csv, format_csv(&run.records))?;

    let report = JsonReport {
        generated_at: Utc::now(),
        summary,
        records: run.records.iter().map(rounded).collect(),
        failures: &run.failures,
    };
    fs::write(&paths.json, serde_json::to_string_pretty(&report)?)?;

    fs::write(&paths.summary, format_summary_text(summary))?;

    tracing::info!("Reports written to {}", dir.display());
    Ok(paths)
}

/// Record with values rounded the way reports present them
pub fn rounded(record: &ComparisonRecord) -> ComparisonRecord {
    ComparisonRecord {
        baseline_latency: round_to(record.baseline_latency, 3),
        baseline_tokens_per_sec: round_to(record.baseline_tokens_per_sec, 1),
        speculative_latency: round_to(record.speculative_latency, 3),
        speculative_tokens_per_sec: round_to(record.speculative_tokens_per_sec, 1),
        speedup: round_to(record.speedup, 2),
        latency_reduction_pct: round_to(record.latency_reduction_pct, 1),
        throughput_increase_pct: round_to(record.throughput_increase_pct, 1),
        ..record.clone()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// One header line plus one row per record
pub fn format_csv(records: &[ComparisonRecord]) -> String {
    let mut csv = String::new();
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for r in records.iter().map(rounded) {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            r.prompt_id,
            csv_field(&r.prompt),
            csv_field(&r.prompt_preview),
            r.baseline_latency,
            r.baseline_tokens_per_sec,
            r.baseline_tokens,
            r.speculative_latency,
            r.speculative_tokens_per_sec,
            r.speculative_tokens,
            r.speedup,
            r.latency_reduction_pct,
            r.throughput_increase_pct,
            csv_field(&r.baseline_output),
            csv_field(&r.speculative_output),
        );
    }

    csv
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn format_summary_text(summary: &BenchmarkSummary) -> String {
    let mut out = String::new();
    out.push_str("QWEN 2.5 SPECULATIVE DECODING BENCHMARK SUMMARY\n");
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");
    let _ = writeln!(out, "Average Speedup: {:.2}x", summary.speedup.mean);
    let _ = writeln!(out, "Median Speedup: {:.2}x", summary.speedup.median);
    let _ = writeln!(
        out,
        "Latency Reduction: {:.1}%",
        summary.mean_latency_reduction_pct
    );
    let _ = writeln!(
        out,
        "Throughput Increase: {:.1}%",
        summary.mean_throughput_increase_pct
    );
    out
}

/// Per-prompt block printed while the run progresses
pub fn format_prompt_result(record: &ComparisonRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n[BASELINE - Sequential Decoding]");
    let _ = writeln!(out, "  ⏱️  Latency: {:.2}s", record.baseline_latency);
    let _ = writeln!(out, "  🚀 Speed: {:.1} tok/s", record.baseline_tokens_per_sec);
    let _ = writeln!(out, "  📊 Tokens: {}", record.baseline_tokens);
    let _ = writeln!(out, "\n[SPECULATIVE - Parallel Verification]");
    let _ = writeln!(out, "  ⏱️  Latency: {:.2}s", record.speculative_latency);
    let _ = writeln!(out, "  🚀 Speed: {:.1} tok/s", record.speculative_tokens_per_sec);
    let _ = writeln!(out, "  📊 Tokens: {}", record.speculative_tokens);
    let _ = writeln!(out, "\n  🎯 SPEEDUP: {:.2}x faster", record.speedup);
    let _ = writeln!(out, "  📉 Latency Reduction: {:.1}%", record.latency_reduction_pct);
    let _ = writeln!(out, "  📈 Throughput Increase: {:.1}%", record.throughput_increase_pct);
    out
}

/// Report of a single stand-alone generation
pub fn format_generation_result(result: &GenerationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nResponse: {}", result.text);
    let _ = writeln!(out, "Latency: {:.2}s", result.latency);
    let _ = writeln!(out, "Throughput: {:.1} tokens/sec", result.tokens_per_sec);
    let _ = writeln!(out, "Total Tokens: {}", result.tokens);
    out
}

/// Final console report
pub fn format_console_summary(summary: &BenchmarkSummary, failures: &[PromptFailure]) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);
    let s = &summary.speedup;
    let impact = &summary.business_impact;

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "📊 BENCHMARK SUMMARY - QWEN 2.5 SPECULATIVE DECODING");
    let _ = writeln!(out, "{}", rule);

    let _ = writeln!(out, "\n🎯 Performance Metrics ({} prompts):", summary.prompts);
    let _ = writeln!(
        out,
        "   Average Speedup: {:.2}x (range: {:.2}x - {:.2}x)",
        s.mean, s.min, s.max
    );
    let _ = writeln!(out, "   Median Speedup: {:.2}x", s.median);

    let _ = writeln!(out, "\n⏱️  Latency:");
    let _ = writeln!(out, "   Baseline Avg: {:.2}s", summary.mean_baseline_latency);
    let _ = writeln!(out, "   Speculative Avg: {:.2}s", summary.mean_speculative_latency);
    let _ = writeln!(out, "   Avg Reduction: {:.1}%", summary.mean_latency_reduction_pct);

    let _ = writeln!(out, "\n🚀 Throughput:");
    let _ = writeln!(
        out,
        "   Baseline Avg: {:.1} tok/s",
        summary.mean_baseline_tokens_per_sec
    );
    let _ = writeln!(
        out,
        "   Speculative Avg: {:.1} tok/s",
        summary.mean_speculative_tokens_per_sec
    );
    let _ = writeln!(out, "   Avg Increase: {:.1}%", summary.mean_throughput_increase_pct);

    let _ = writeln!(
        out,
        "\n💰 Business Impact (assuming {} queries/day):",
        group_thousands(impact.queries_per_day)
    );
    let _ = writeln!(
        out,
        "   Time saved per query: {:.2}s",
        impact.time_saved_per_query_secs
    );
    let _ = writeln!(
        out,
        "   Total time saved daily: {:.1} hours",
        impact.total_hours_saved_per_day
    );
    let _ = writeln!(
        out,
        "   GPU capacity increase: {:.1}x (serve {:.1}x more users)",
        impact.capacity_multiplier, impact.capacity_multiplier
    );

    if !failures.is_empty() {
        let _ = writeln!(out, "\n❌ Failed prompts ({}):", failures.len());
        for failure in failures {
            let _ = writeln!(
                out,
                "   #{} [{}] {}",
                failure.prompt_id, failure.stage, failure.error
            );
        }
    }

    out
}

pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::runner::FailureStage;
    use crate::types::result::GenerationResult;

    fn sample_record() -> ComparisonRecord {
        let base = GenerationResult::new("Hello, \"world\"\nline two", 10.0, 100);
        let spec = GenerationResult::new("plain", 4.0, 100);
        ComparisonRecord::new(1, "Summarize, briefly", &base, &spec).unwrap()
    }

    fn sample_run() -> BenchmarkRun {
        BenchmarkRun {
            records: vec![sample_record()],
            failures: vec![PromptFailure {
                prompt_id: 2,
                prompt: "second".to_string(),
                stage: FailureStage::Speculative,
                error: "engine crashed".to_string(),
            }],
        }
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_csv_rows() {
        let csv = format_csv(&[sample_record()]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,\"Summarize, briefly\",\"Summarize, briefly...\",10,10,100,4,25,100,2.5,60,150,"));
        assert_eq!(CSV_HEADER.split(',').count(), 14);
    }

    #[test]
    fn test_rounding() {
        let base = GenerationResult::new("", 3.14159, 7);
        let spec = GenerationResult::new("", 1.23456, 7);
        let r = rounded(&ComparisonRecord::new(1, "p", &base, &spec).unwrap());
        assert_eq!(r.baseline_latency, 3.142);
        assert_eq!(r.speculative_latency, 1.235);
        assert_eq!(r.speedup, 2.54);
        assert_eq!(r.baseline_tokens_per_sec, 2.2);
    }

    #[test]
    fn test_summary_text_has_four_aggregates() {
        let summary = BenchmarkSummary::from_records(&[sample_record()], 1_000_000).unwrap();
        let text = format_summary_text(&summary);
        let aggregates: Vec<&str> = text.lines().filter(|l| l.contains(": ")).collect();
        assert_eq!(aggregates.len(), 4);
        assert!(text.contains("Average Speedup: 2.50x"));
        assert!(text.contains("Median Speedup: 2.50x"));
        assert!(text.contains("Latency Reduction: 60.0%"));
        assert!(text.contains("Throughput Increase: 150.0%"));
    }

    #[test]
    fn test_console_summary() {
        let run = sample_run();
        let summary = BenchmarkSummary::from_records(&run.records, 1_000_000).unwrap();
        let text = format_console_summary(&summary, &run.failures);
        assert!(text.contains("Average Speedup: 2.50x (range: 2.50x - 2.50x)"));
        assert!(text.contains("assuming 1,000,000 queries/day"));
        assert!(text.contains("Time saved per query: 6.00s"));
        assert!(text.contains("#2 [speculative] engine crashed"));
    }

    #[test]
    fn test_generation_result_lists_tokens() {
        let text = format_generation_result(&GenerationResult::new("Quantum bits.", 2.0, 100));
        assert!(text.contains("Response: Quantum bits."));
        assert!(text.contains("Latency: 2.00s"));
        assert!(text.contains("Throughput: 50.0 tokens/sec"));
        assert!(text.contains("Total Tokens: 100"));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_000_000), "1,000,000");
    }

    #[test]
    fn test_write_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let run = sample_run();
        let summary = BenchmarkSummary::from_records(&run.records, 1_000_000).unwrap();

        let paths = write_reports(&run, &summary, &out).unwrap();
        assert!(paths.csv.exists());
        assert!(paths.summary.exists());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(json["records"].as_array().unwrap().len(), 1);
        assert_eq!(json["records"][0]["speedup"], 2.5);
        assert_eq!(json["failures"][0]["prompt_id"], 2);
        assert_eq!(json["summary"]["prompts"], 1);
    }
}
