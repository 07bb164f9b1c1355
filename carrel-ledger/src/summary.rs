use crate::models::{FinancialRecord, RecordStatus, TransactionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Period totals for the financial dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_payments_cents: i64,
    pub total_refunds_cents: i64,
    pub total_adjustments_cents: i64,
    pub net_cents: i64,
    pub completed_count: usize,
    pub pending_count: usize,
    pub failed_count: usize,
}

impl RevenueSummary {
    pub fn compute(records: &[FinancialRecord]) -> Self {
        let mut total_payments = 0;
        let mut total_refunds = 0;
        let mut total_adjustments = 0;
        let mut completed = 0;
        let mut pending = 0;
        let mut failed = 0;

        for record in records {
            match record.status {
                RecordStatus::Completed => {
                    completed += 1;
                    match record.transaction_type {
                        TransactionType::Payment => total_payments += record.amount_cents,
                        TransactionType::Refund => total_refunds += record.amount_cents,
                        TransactionType::Adjustment => total_adjustments += record.amount_cents,
                    }
                }
                RecordStatus::Pending => pending += 1,
                RecordStatus::Failed => failed += 1,
                RecordStatus::Refunded => {}
            }
        }

        Self {
            total_payments_cents: total_payments,
            total_refunds_cents: total_refunds,
            total_adjustments_cents: total_adjustments,
            net_cents: total_payments - total_refunds + total_adjustments,
            completed_count: completed,
            pending_count: pending,
            failed_count: failed,
        }
    }
}

/// Net revenue for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub net_cents: i64,
    pub record_count: usize,
}

/// Group completed records into per-day revenue rows, ordered by date.
pub fn revenue_by_day(records: &[FinancialRecord]) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<NaiveDate, (i64, usize)> = BTreeMap::new();
    for record in records {
        if record.status != RecordStatus::Completed {
            continue;
        }
        let day = record.created_at.date_naive();
        let entry = days.entry(day).or_insert((0, 0));
        entry.0 += record.net_cents();
        entry.1 += 1;
    }

    days.into_iter()
        .map(|(date, (net_cents, record_count))| DailyRevenue {
            date,
            net_cents,
            record_count,
        })
        .collect()
}

/// Net revenue grouped by payment method.
pub fn revenue_by_method(records: &[FinancialRecord]) -> BTreeMap<String, i64> {
    let mut methods = BTreeMap::new();
    for record in records {
        if record.status != RecordStatus::Completed {
            continue;
        }
        *methods.entry(record.payment_method.clone()).or_insert(0) += record.net_cents();
    }
    methods
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(transaction_type: TransactionType, amount: i64, status: RecordStatus) -> FinancialRecord {
        let mut r = FinancialRecord::new(
            Uuid::new_v4(),
            None,
            transaction_type,
            amount,
            "USD".to_string(),
            "cash".to_string(),
            Uuid::new_v4().to_string(),
        );
        r.status = status;
        r
    }

    #[test]
    fn test_summary_nets_refunds() {
        let records = vec![
            record(TransactionType::Payment, 5000, RecordStatus::Completed),
            record(TransactionType::Payment, 3000, RecordStatus::Completed),
            record(TransactionType::Refund, 1000, RecordStatus::Completed),
            record(TransactionType::Payment, 9999, RecordStatus::Pending),
            record(TransactionType::Payment, 100, RecordStatus::Failed),
        ];

        let summary = RevenueSummary::compute(&records);
        assert_eq!(summary.total_payments_cents, 8000);
        assert_eq!(summary.total_refunds_cents, 1000);
        assert_eq!(summary.net_cents, 7000);
        assert_eq!(summary.completed_count, 3);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.failed_count, 1);
    }

    #[test]
    fn test_revenue_by_day_skips_incomplete() {
        let paid = record(TransactionType::Payment, 2000, RecordStatus::Completed);
        let pending = record(TransactionType::Payment, 7777, RecordStatus::Pending);

        let days = revenue_by_day(&[paid.clone(), pending]);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].net_cents, 2000);
        assert_eq!(days[0].record_count, 1);
        assert_eq!(days[0].date, paid.created_at.date_naive());
    }

    #[test]
    fn test_revenue_by_method() {
        let mut card = record(TransactionType::Payment, 4000, RecordStatus::Completed);
        card.payment_method = "card".to_string();
        let cash = record(TransactionType::Payment, 1500, RecordStatus::Completed);

        let methods = revenue_by_method(&[card, cash]);
        assert_eq!(methods["card"], 4000);
        assert_eq!(methods["cash"], 1500);
    }
}
