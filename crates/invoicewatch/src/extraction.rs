//! Normalized analyzer output and the defaulting policy applied to it.
//!
//! The analyzer may omit or garble any field. [`ExtractionResult::from_raw`]
//! never fails: every missing or malformed field is replaced by a default.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analyzer::RawExtraction;

pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
pub const DEFAULT_SUMMARY: &str = "No summary provided";
pub const DEFAULT_LEGAL_IMPACT: &str = "None";
pub const DEFAULT_PAYMENT_ADVICE: &str = "Review Required";

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date regex"));

/// Tri-valued compliance classification assigned by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, RiskLevel::High)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRiskLevel(pub String);

impl fmt::Display for UnknownRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown risk level '{}'", self.0)
    }
}

impl std::error::Error for UnknownRiskLevel {}

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            _ => Err(UnknownRiskLevel(s.to_string())),
        }
    }
}

/// Fully defaulted analysis of one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub vendor_name: String,
    pub total_amount: f64,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub summary: String,
    pub is_gst_missing: bool,
    pub is_regulatory_item: bool,
    pub risk_level: RiskLevel,
    pub legal_impact: String,
    pub payment_advice: String,
}

impl ExtractionResult {
    /// Applies the defaulting policy. `today` stands in for missing dates.
    pub fn from_raw(raw: &RawExtraction, today: NaiveDate) -> Self {
        Self {
            vendor_name: text_or(&raw.vendor_name, UNKNOWN_VENDOR),
            total_amount: raw.total_amount.as_ref().map(parse_amount).unwrap_or(0.0),
            invoice_date: raw
                .invoice_date
                .as_deref()
                .and_then(parse_date)
                .unwrap_or(today),
            due_date: raw
                .due_date
                .as_deref()
                .and_then(parse_date)
                .unwrap_or(today),
            summary: text_or(&raw.summary, DEFAULT_SUMMARY),
            is_gst_missing: raw.is_gst_missing.unwrap_or(false),
            is_regulatory_item: raw.is_regulatory_item.unwrap_or(false),
            risk_level: raw
                .compliance_risk_level
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            legal_impact: text_or(&raw.legal_impact, DEFAULT_LEGAL_IMPACT),
            payment_advice: text_or(&raw.payment_advice, DEFAULT_PAYMENT_ADVICE),
        }
    }
}

fn text_or(value: &Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// Reads an amount from a JSON number or a formatted string such as
/// `"₹1,620.00"`. Unparseable, negative, or non-finite values become 0.
pub fn parse_amount(value: &serde_json::Value) -> f64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Parses an ISO date, accepting a full timestamp or an ISO date embedded in
/// other text, plus the common day-first forms.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(m) = ISO_DATE.find(s) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d") {
            return Some(date);
        }
    }

    ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %b %Y", "%d %B %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_empty_raw_gets_all_defaults() {
        let result = ExtractionResult::from_raw(&RawExtraction::default(), today());
        assert_eq!(result.vendor_name, UNKNOWN_VENDOR);
        assert_eq!(result.total_amount, 0.0);
        assert_eq!(result.invoice_date, today());
        assert_eq!(result.due_date, today());
        assert_eq!(result.summary, DEFAULT_SUMMARY);
        assert!(!result.is_gst_missing);
        assert!(!result.is_regulatory_item);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.legal_impact, "None");
        assert_eq!(result.payment_advice, "Review Required");
    }

    #[test]
    fn test_complete_raw_is_kept() {
        let raw = RawExtraction {
            vendor_name: Some("Acme Chemicals".to_string()),
            total_amount: Some(json!(45000.5)),
            invoice_date: Some("2026-09-01".to_string()),
            due_date: Some("2026-10-01".to_string()),
            is_gst_missing: Some(true),
            is_regulatory_item: Some(true),
            compliance_risk_level: Some("HIGH".to_string()),
            summary: Some("Industrial solvents".to_string()),
            legal_impact: Some("Loss of input tax credit.".to_string()),
            payment_advice: Some("High risk - Review before payment".to_string()),
        };

        let result = ExtractionResult::from_raw(&raw, today());
        assert_eq!(result.vendor_name, "Acme Chemicals");
        assert_eq!(result.total_amount, 45000.5);
        assert_eq!(
            result.invoice_date,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result.is_gst_missing);
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let raw = RawExtraction {
            vendor_name: Some("   ".to_string()),
            summary: Some(String::new()),
            ..Default::default()
        };
        let result = ExtractionResult::from_raw(&raw, today());
        assert_eq!(result.vendor_name, UNKNOWN_VENDOR);
        assert_eq!(result.summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_unknown_risk_level_defaults_low() {
        let raw = RawExtraction {
            compliance_risk_level: Some("CRITICAL".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ExtractionResult::from_raw(&raw, today()).risk_level,
            RiskLevel::Low
        );
    }

    #[test]
    fn test_risk_level_parse_is_case_insensitive() {
        assert_eq!("medium".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert_eq!(" High ".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("nope".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_risk_level_serde_uppercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
        let level: RiskLevel = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount(&json!(120)), 120.0);
        assert_eq!(parse_amount(&json!("₹1,620.00")), 1620.0);
        assert_eq!(parse_amount(&json!("$ 99.5")), 99.5);
        assert_eq!(parse_amount(&json!("n/a")), 0.0);
        assert_eq!(parse_amount(&json!(-15)), 0.0);
        assert_eq!(parse_amount(&json!(null)), 0.0);
        assert_eq!(parse_amount(&json!(true)), 0.0);
    }

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 5);
        assert_eq!(parse_date("2026-01-05"), expected);
        assert_eq!(parse_date("2026-01-05T00:00:00Z"), expected);
        assert_eq!(parse_date("Dated 2026-01-05"), expected);
        assert_eq!(parse_date("05/01/2026"), expected);
        assert_eq!(parse_date("5 Jan 2026"), expected);
        assert_eq!(parse_date("2026-13-45"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
    }
}
