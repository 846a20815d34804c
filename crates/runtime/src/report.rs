//! At-exit report for compiled Ekans programs
//!
//! Dumps allocator and collector counters when the program finishes,
//! controlled by the `EKANS_REPORT` env var:
//! - Unset → no report, zero cost
//! - `1` → human-readable to stderr
//! - `json` → JSON to stderr
//! - `json:/path` → JSON to file
//!
//! ## Feature Flag
//!
//! JSON output requires the `report-json` feature (enabled by default);
//! without it, `json` requests fall back to the human format with a
//! warning.

use ekans_core::{alloc, gc, heap};
use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::Ordering;

/// Output format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Human,
    Json,
}

/// Output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    Stderr,
    File(String),
}

/// Parsed report configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub destination: ReportDestination,
}

impl ReportConfig {
    /// Parse from the EKANS_REPORT environment variable
    pub fn from_env() -> Option<Self> {
        let val = std::env::var("EKANS_REPORT").ok()?;
        match val.as_str() {
            "" | "0" => None,
            "1" => Some(ReportConfig {
                format: ReportFormat::Human,
                destination: ReportDestination::Stderr,
            }),
            "json" => Some(ReportConfig {
                format: ReportFormat::Json,
                destination: ReportDestination::Stderr,
            }),
            s if s.starts_with("json:") => Some(ReportConfig {
                format: ReportFormat::Json,
                destination: ReportDestination::File(s[5..].to_string()),
            }),
            _ => {
                eprintln!("Warning: EKANS_REPORT='{val}' not recognized, ignoring");
                None
            }
        }
    }
}

static REPORT_CONFIG: OnceLock<Option<ReportConfig>> = OnceLock::new();

fn get_report_config() -> &'static Option<ReportConfig> {
    REPORT_CONFIG.get_or_init(ReportConfig::from_env)
}

/// Collected counters for the report
#[derive(Debug)]
pub struct ReportData {
    pub total_allocations: u64,
    pub total_bytes: u64,
    pub collections: u64,
    pub values_freed: u64,
    pub live_at_exit: usize,
}

fn collect_report_data() -> ReportData {
    ReportData {
        total_allocations: alloc::TOTAL_ALLOCATIONS.load(Ordering::Relaxed),
        total_bytes: alloc::TOTAL_BYTES.load(Ordering::Relaxed),
        collections: gc::COLLECTIONS.load(Ordering::Relaxed),
        values_freed: gc::VALUES_FREED.load(Ordering::Relaxed),
        // Normally zero: finalization collects with no roots left.
        live_at_exit: unsafe { heap::live_count() },
    }
}

fn write_human(out: &mut dyn Write, data: &ReportData) {
    let _ = writeln!(out, "=== Ekans Runtime Report ===");
    let _ = writeln!(out, "allocations:   {}", data.total_allocations);
    let _ = writeln!(out, "bytes:         {}", data.total_bytes);
    let _ = writeln!(out, "collections:   {}", data.collections);
    let _ = writeln!(out, "values freed:  {}", data.values_freed);
    let _ = writeln!(out, "live at exit:  {}", data.live_at_exit);
}

#[cfg(feature = "report-json")]
fn write_json(out: &mut dyn Write, data: &ReportData) {
    let json = serde_json::json!({
        "allocations": data.total_allocations,
        "bytes": data.total_bytes,
        "collections": data.collections,
        "values_freed": data.values_freed,
        "live_at_exit": data.live_at_exit,
    });
    let _ = writeln!(out, "{json}");
}

#[cfg(not(feature = "report-json"))]
fn write_json(out: &mut dyn Write, data: &ReportData) {
    eprintln!("Warning: report-json feature disabled, falling back to human format");
    write_human(out, data);
}

/// Emit the report if EKANS_REPORT asks for one. Called from
/// `ekans_finalize`.
pub(crate) fn emit_at_exit() {
    let Some(config) = get_report_config() else {
        return;
    };
    let data = collect_report_data();

    let write_to = |out: &mut dyn Write| match config.format {
        ReportFormat::Human => write_human(out, &data),
        ReportFormat::Json => write_json(out, &data),
    };

    match &config.destination {
        ReportDestination::Stderr => {
            let mut err = std::io::stderr().lock();
            write_to(&mut err);
        }
        ReportDestination::File(path) => match std::fs::File::create(path) {
            Ok(mut file) => write_to(&mut file),
            Err(e) => eprintln!("Warning: cannot write EKANS_REPORT file '{path}': {e}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_report_data_reads_counters() {
        unsafe { ekans_core::heap::install_sentinels() };
        let data = collect_report_data();
        // Counters are monotonic; the exact numbers depend on test order.
        assert!(data.total_bytes >= data.total_allocations);
    }

    #[test]
    fn test_human_format_shape() {
        let data = ReportData {
            total_allocations: 10,
            total_bytes: 480,
            collections: 2,
            values_freed: 7,
            live_at_exit: 0,
        };
        let mut buf = Vec::new();
        write_human(&mut buf, &data);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Ekans Runtime Report"));
        assert!(text.contains("values freed:  7"));
    }

    #[cfg(feature = "report-json")]
    #[test]
    fn test_json_format_is_valid() {
        let data = ReportData {
            total_allocations: 1,
            total_bytes: 48,
            collections: 1,
            values_freed: 1,
            live_at_exit: 0,
        };
        let mut buf = Vec::new();
        write_json(&mut buf, &data);
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["allocations"], 1);
        assert_eq!(parsed["live_at_exit"], 0);
    }
}
