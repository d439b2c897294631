//! Structured JSON logger.
//!
//! - one log line = one event
//! - deterministic key ordering (event, severity, then fields sorted)
//! - synchronous, no buffering

use std::fmt;
use std::io::{self, Write};

use crate::audit::{AuditRejection, AuditReport};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured JSON logger
pub struct Logger;

impl Logger {
    /// Logs a passed audit with its observed counters
    pub fn audit_passed(collection: &str, report: &AuditReport) {
        let ratio = report
            .scan_ratio()
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "n/a".to_string());
        let index = if report.index_scan_seen { "true" } else { "false" };
        Self::log(
            Severity::Info,
            "audit_passed",
            &[
                ("collection", collection),
                ("index_scan", index),
                ("scan_ratio", &ratio),
            ],
        );
    }

    /// Logs a rejected audit with the failed check
    pub fn audit_rejected(collection: &str, rejection: &AuditRejection) {
        let reason = rejection.to_string();
        Self::log(
            Severity::Warn,
            "audit_rejected",
            &[("collection", collection), ("reason", &reason)],
        );
    }

    /// Logs an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        Self::log_to_writer(severity, event, fields, &mut io::stdout());
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let mut output = String::with_capacity(256);

        output.push_str("{\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push_str("\",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(key, _)| *key);

        for (key, value) in sorted_fields {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");

        // One write call per event keeps lines whole under concurrency
        let _ = writer.write_all(output.as_bytes());
        let _ = writer.flush();
    }

    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }
}
