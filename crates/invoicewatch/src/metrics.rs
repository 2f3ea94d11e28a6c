//! Read-side figures derived from persisted records: vendor trust, dashboard
//! totals, and the monthly risk chart. Nothing here is stored.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::extraction::RiskLevel;
use crate::store::InvoiceRecord;

/// Points lost per HIGH-risk invoice.
pub const STRIKE_PENALTY: u32 = 25;
/// Invoices shown in the dashboard's recent list.
pub const RECENT_LIMIT: usize = 5;
/// Months covered by the dashboard chart.
pub const CHART_MONTHS: u32 = 6;

/// `max(0, 100 - 25 * strikes)`.
pub fn trust_score(strikes: usize) -> u32 {
    let penalty = u32::try_from(strikes)
        .unwrap_or(u32::MAX)
        .saturating_mul(STRIKE_PENALTY);
    100u32.saturating_sub(penalty)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    F,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

pub fn grade(score: u32) -> Grade {
    match score {
        80.. => Grade::A,
        50..=79 => Grade::B,
        30..=49 => Grade::C,
        _ => Grade::F,
    }
}

/// Share of invoices that are not HIGH risk, rounded to a whole percent.
/// An empty history counts as fully healthy.
pub fn health_percentage(total: usize, high_risk: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    let safe = total.saturating_sub(high_risk) as f64;
    (safe * 100.0 / total as f64).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStanding {
    Verified,
    UnderWatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
    pub vendor_name: String,
    pub invoice_count: usize,
    pub total_spend: f64,
    pub strikes: usize,
    pub trust_score: u32,
    pub grade: Grade,
    pub standing: VendorStanding,
    /// Latest invoice date first.
    pub timeline: Vec<InvoiceRecord>,
}

impl VendorProfile {
    /// Builds a profile from a vendor's records. Returns `None` for an empty
    /// history.
    pub fn from_records(vendor_name: &str, mut records: Vec<InvoiceRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        records.sort_by(|a, b| {
            b.invoice_date
                .cmp(&a.invoice_date)
                .then(b.created_at.cmp(&a.created_at))
        });

        let strikes = records.iter().filter(|r| r.risk_level.is_high()).count();
        let score = trust_score(strikes);

        Some(Self {
            vendor_name: vendor_name.to_string(),
            invoice_count: records.len(),
            total_spend: records.iter().map(|r| r.amount).sum(),
            strikes,
            trust_score: score,
            grade: grade(score),
            standing: if strikes == 0 {
                VendorStanding::Verified
            } else {
                VendorStanding::UnderWatch
            },
            timeline: records,
        })
    }
}

/// Safe/risky upload counts for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// `YYYY-MM`.
    pub month: String,
    /// Short month name, e.g. `Sep`.
    pub label: String,
    pub safe: u64,
    pub risky: u64,
}

/// Buckets records by the month they were created, over the `months`
/// calendar months ending with the month of `reference`. Months without
/// uploads are present with zero counts; order is oldest first.
pub fn monthly_buckets(records: &[InvoiceRecord], months: u32, reference: NaiveDate) -> Vec<MonthlyBucket> {
    let Some(current) = reference.with_day(1) else {
        return Vec::new();
    };

    let starts: Vec<NaiveDate> = (0..months)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect();

    let mut buckets: Vec<MonthlyBucket> = starts
        .iter()
        .map(|start| MonthlyBucket {
            month: start.format("%Y-%m").to_string(),
            label: start.format("%b").to_string(),
            safe: 0,
            risky: 0,
        })
        .collect();

    for record in records {
        let created = record.created_at.date_naive();
        let position = starts
            .iter()
            .position(|s| s.year() == created.year() && s.month() == created.month());
        if let Some(bucket) = position.and_then(|i| buckets.get_mut(i)) {
            if record.risk_level == RiskLevel::High {
                bucket.risky += 1;
            } else {
                bucket.safe += 1;
            }
        }
    }

    buckets
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_scanned: usize,
    pub high_risk_count: usize,
    pub health_percentage: u32,
    /// Sum of HIGH-risk amounts.
    pub potential_savings: f64,
    pub recent: Vec<InvoiceRecord>,
    pub monthly: Vec<MonthlyBucket>,
}

impl DashboardSummary {
    pub fn build(records: &[InvoiceRecord], reference: NaiveDate) -> Self {
        let high: Vec<&InvoiceRecord> = records.iter().filter(|r| r.risk_level.is_high()).collect();

        let mut recent: Vec<InvoiceRecord> = records.to_vec();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(RECENT_LIMIT);

        Self {
            total_scanned: records.len(),
            high_risk_count: high.len(),
            health_percentage: health_percentage(records.len(), high.len()),
            potential_savings: high.iter().map(|r| r.amount).sum(),
            recent,
            monthly: monthly_buckets(records, CHART_MONTHS, reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, risk: RiskLevel, amount: f64, invoice_date: (i32, u32, u32), created: (i32, u32, u32)) -> InvoiceRecord {
        let date = NaiveDate::from_ymd_opt(invoice_date.0, invoice_date.1, invoice_date.2).unwrap();
        InvoiceRecord {
            id: id.to_string(),
            owner_id: "o1".to_string(),
            vendor_name: "Acme".to_string(),
            amount,
            currency: "INR".to_string(),
            invoice_date: date,
            due_date: date,
            summary: "Goods".to_string(),
            is_gst_missing: risk.is_high(),
            is_regulatory_item: false,
            requires_license: false,
            risk_level: risk,
            legal_impact: "None".to_string(),
            payment_advice: "Safe to pay".to_string(),
            status: "COMPLETED".to_string(),
            source_file: None,
            created_at: Utc
                .with_ymd_and_hms(created.0, created.1, created.2, 12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_trust_score_values() {
        assert_eq!(trust_score(0), 100);
        assert_eq!(trust_score(1), 75);
        assert_eq!(trust_score(3), 25);
        assert_eq!(trust_score(4), 0);
        assert_eq!(trust_score(50), 0);
        assert_eq!(trust_score(usize::MAX), 0);
    }

    #[test]
    fn test_trust_score_is_monotonic() {
        for strikes in 0..10 {
            assert!(trust_score(strikes + 1) <= trust_score(strikes));
        }
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade(100), Grade::A);
        assert_eq!(grade(80), Grade::A);
        assert_eq!(grade(79), Grade::B);
        assert_eq!(grade(50), Grade::B);
        assert_eq!(grade(49), Grade::C);
        assert_eq!(grade(30), Grade::C);
        assert_eq!(grade(29), Grade::F);
        assert_eq!(grade(0), Grade::F);
    }

    #[test]
    fn test_health_percentage() {
        assert_eq!(health_percentage(10, 2), 80);
        assert_eq!(health_percentage(0, 0), 100);
        assert_eq!(health_percentage(3, 1), 67);
        assert_eq!(health_percentage(4, 4), 0);
    }

    #[test]
    fn test_vendor_profile() {
        let records = vec![
            record("a", RiskLevel::Low, 100.0, (2026, 1, 10), (2026, 1, 10)),
            record("b", RiskLevel::High, 50.0, (2026, 3, 1), (2026, 3, 1)),
            record("c", RiskLevel::Medium, 25.5, (2026, 2, 1), (2026, 2, 1)),
        ];
        let profile = VendorProfile::from_records("Acme", records).unwrap();

        assert_eq!(profile.invoice_count, 3);
        assert!((profile.total_spend - 175.5).abs() < f64::EPSILON);
        assert_eq!(profile.strikes, 1);
        assert_eq!(profile.trust_score, 75);
        assert_eq!(profile.grade, Grade::B);
        assert_eq!(profile.standing, VendorStanding::UnderWatch);
        let order: Vec<_> = profile.timeline.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_clean_vendor_is_verified() {
        let records = vec![record("a", RiskLevel::Low, 1.0, (2026, 1, 1), (2026, 1, 1))];
        let profile = VendorProfile::from_records("Acme", records).unwrap();
        assert_eq!(profile.standing, VendorStanding::Verified);
        assert_eq!(profile.grade, Grade::A);
        assert!(VendorProfile::from_records("Nobody", Vec::new()).is_none());
    }

    #[test]
    fn test_monthly_buckets_zero_filled_and_ordered() {
        let records = vec![
            record("a", RiskLevel::High, 1.0, (2026, 9, 1), (2026, 9, 3)),
            record("b", RiskLevel::Low, 1.0, (2026, 9, 1), (2026, 9, 20)),
            record("c", RiskLevel::Medium, 1.0, (2026, 7, 1), (2026, 7, 4)),
            // Outside the window.
            record("d", RiskLevel::High, 1.0, (2026, 1, 1), (2026, 1, 4)),
        ];
        let reference = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let buckets = monthly_buckets(&records, 6, reference);

        let months: Vec<_> = buckets.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2026-05", "2026-06", "2026-07", "2026-08", "2026-09", "2026-10"]
        );
        assert_eq!(buckets[4].label, "Sep");
        assert_eq!((buckets[4].safe, buckets[4].risky), (1, 1));
        assert_eq!((buckets[2].safe, buckets[2].risky), (1, 0));
        assert_eq!((buckets[5].safe, buckets[5].risky), (0, 0));
    }

    #[test]
    fn test_monthly_buckets_cross_year() {
        let records = vec![record("a", RiskLevel::High, 1.0, (2025, 12, 1), (2025, 12, 31))];
        let reference = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let buckets = monthly_buckets(&records, 2, reference);
        assert_eq!(buckets[0].month, "2025-12");
        assert_eq!(buckets[0].risky, 1);
        assert_eq!(buckets[1].month, "2026-01");
    }

    #[test]
    fn test_dashboard_summary() {
        let records: Vec<_> = (1..=10)
            .map(|day| {
                let risk = if day <= 2 { RiskLevel::High } else { RiskLevel::Low };
                record(&format!("r{day}"), risk, 100.0, (2026, 10, day), (2026, 10, day))
            })
            .collect();
        let summary = DashboardSummary::build(&records, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());

        assert_eq!(summary.total_scanned, 10);
        assert_eq!(summary.high_risk_count, 2);
        assert_eq!(summary.health_percentage, 80);
        assert!((summary.potential_savings - 200.0).abs() < f64::EPSILON);
        let recent: Vec<_> = summary.recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(recent, vec!["r10", "r9", "r8", "r7", "r6"]);
        assert_eq!(summary.monthly.len(), CHART_MONTHS as usize);
        assert_eq!(summary.monthly[5].safe, 8);
        assert_eq!(summary.monthly[5].risky, 2);
    }

    #[test]
    fn test_empty_dashboard() {
        let summary = DashboardSummary::build(&[], NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(summary.health_percentage, 100);
        assert_eq!(summary.potential_savings, 0.0);
        assert!(summary.recent.is_empty());
    }
}
