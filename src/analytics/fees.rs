//! Fee summaries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{FeeCategory, FeeRecord};

/// Billed / paid / pending totals across a student's fee records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeSummary {
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
    /// Whether any unsettled record is past its due date
    pub overdue: bool,
    /// Earliest due date among unsettled records
    pub next_due: Option<NaiveDate>,
    pub by_category: BTreeMap<FeeCategory, f64>,
}

pub fn summarize(records: &[FeeRecord], today: NaiveDate) -> FeeSummary {
    let mut by_category = BTreeMap::new();
    for record in records {
        for item in &record.items {
            *by_category.entry(item.category).or_insert(0.0) += item.amount;
        }
    }

    let unsettled = || records.iter().filter(|r| !r.is_settled());

    FeeSummary {
        total: records.iter().map(FeeRecord::amount).sum(),
        paid: records.iter().map(|r| r.paid).sum(),
        pending: records.iter().map(FeeRecord::pending).sum(),
        overdue: unsettled().any(|r| r.due_date < today),
        next_due: unsettled().map(|r| r.due_date).min(),
        by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeeItem;

    fn record(id: u64, due: (i32, u32, u32), items: &[(FeeCategory, f64)], paid: f64) -> FeeRecord {
        FeeRecord {
            id,
            student_id: "STU001".to_string(),
            term: "Term".to_string(),
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
            items: items
                .iter()
                .map(|&(category, amount)| FeeItem { category, amount })
                .collect(),
            paid,
        }
    }

    #[test]
    fn test_summary_totals() {
        let records = vec![
            record(1, (2024, 1, 15), &[(FeeCategory::Tuition, 3000.0), (FeeCategory::Library, 100.0)], 3100.0),
            record(2, (2024, 8, 15), &[(FeeCategory::Tuition, 3000.0), (FeeCategory::Hostel, 900.0)], 1000.0),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let summary = summarize(&records, today);
        assert_eq!(summary.total, 7000.0);
        assert_eq!(summary.paid, 4100.0);
        assert_eq!(summary.pending, 2900.0);
        assert!(summary.overdue);
        assert_eq!(summary.next_due, NaiveDate::from_ymd_opt(2024, 8, 15));
        assert_eq!(summary.by_category.get(&FeeCategory::Tuition), Some(&6000.0));
    }

    #[test]
    fn test_settled_records_are_never_overdue() {
        let records = vec![record(1, (2020, 1, 1), &[(FeeCategory::Other, 50.0)], 50.0)];
        let summary = summarize(&records, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(!summary.overdue);
        assert_eq!(summary.next_due, None);
        assert_eq!(summary.pending, 0.0);
    }
}
