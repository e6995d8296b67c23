//! Device-scoped performance measurement results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device category of a performance measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Desktop,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Mobile, Device::Desktop];

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category scores on a 0–100 scale. `None` when the service omitted the category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub performance: Option<u8>,
    pub seo: Option<u8>,
    pub accessibility: Option<u8>,
    pub best_practices: Option<u8>,
}

/// How much an opportunity would help, bucketed from its estimated savings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minimal,
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn from_savings(savings_ms: f64, savings_kib: f64) -> Self {
        if savings_ms > 1000.0 || savings_kib > 100.0 {
            Impact::High
        } else if savings_ms > 500.0 || savings_kib > 50.0 {
            Impact::Medium
        } else if savings_ms > 100.0 || savings_kib > 10.0 {
            Impact::Low
        } else {
            Impact::Minimal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Minimal => "minimal",
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub savings_ms: f64,
    pub savings_kib: f64,
    pub impact: Impact,
}

impl Opportunity {
    /// Human-readable estimated savings, e.g. `"1.2 s, 340 KiB"`.
    pub fn estimated_savings(&self) -> String {
        let mut parts = Vec::new();
        if self.savings_ms >= 1000.0 {
            parts.push(format!("{:.1} s", self.savings_ms / 1000.0));
        } else if self.savings_ms > 0.0 {
            parts.push(format!("{:.0} ms", self.savings_ms));
        }
        if self.savings_kib > 0.0 {
            parts.push(format!("{:.0} KiB", self.savings_kib));
        }
        if parts.is_empty() { "negligible".to_string() } else { parts.join(", ") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub title: String,
    pub detail: String,
}

/// Lab metrics from the measurement run, in milliseconds except `cls`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreWebVitals {
    pub lcp_ms: Option<f64>,
    pub fcp_ms: Option<f64>,
    pub tbt_ms: Option<f64>,
    pub cls: Option<f64>,
    pub speed_index_ms: Option<f64>,
    pub tti_ms: Option<f64>,
}

/// One measurement of one device. Superseded, never mutated, on re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub device: Device,
    pub scores: Scores,
    pub opportunities: Vec<Opportunity>,
    pub diagnostics: Vec<Diagnostic>,
    pub vitals: CoreWebVitals,
    pub fetched_at: DateTime<Utc>,
    /// Set when the service answered but flagged its own run as unreliable.
    pub stale: bool,
}

impl PerformanceReport {
    pub fn new(device: Device, scores: Scores) -> Self {
        Self {
            device,
            scores,
            opportunities: Vec::new(),
            diagnostics: Vec::new(),
            vitals: CoreWebVitals::default(),
            fetched_at: Utc::now(),
            stale: false,
        }
    }
}
