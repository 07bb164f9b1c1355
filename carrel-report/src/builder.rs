use crate::models::{Period, ReportError};
use carrel_attendance::models::Attendance;
use carrel_attendance::stats::AttendanceStats;
use carrel_ledger::models::FinancialRecord;
use carrel_ledger::summary::{revenue_by_day, revenue_by_method, RevenueSummary};
use carrel_ops::models::Operation;
use carrel_ops::stats::{completion_rate_by_assignee, counts_by_type_and_status};
use carrel_seating::layout::FloorPlan;
use carrel_seating::seat::Seat;
use chrono::Datelike;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Assembles report payloads from rows the store already fetched for the
/// requested period. Pure aggregation; persistence happens in the caller.
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn validate_period(period: &Period) -> Result<(), ReportError> {
        if period.start >= period.end {
            return Err(ReportError::InvalidPeriod);
        }
        Ok(())
    }

    pub fn revenue(period: &Period, records: &[FinancialRecord]) -> Value {
        let summary = RevenueSummary::compute(records);
        let daily = revenue_by_day(records);
        let methods = revenue_by_method(records);

        json!({
            "period": period,
            "summary": summary,
            "by_day": daily,
            "by_method": methods,
        })
    }

    pub fn attendance(period: &Period, records: &[Attendance]) -> Value {
        let stats = AttendanceStats::compute(records);
        json!({
            "period": period,
            "stats": stats,
        })
    }

    pub fn utilization(seats: &[Seat]) -> Value {
        json!({
            "sections": FloorPlan::summarize(seats),
            "utilization": FloorPlan::utilization(seats),
        })
    }

    pub fn activity(period: &Period, operations: &[Operation]) -> Value {
        json!({
            "period": period,
            "counts": counts_by_type_and_status(operations),
        })
    }

    pub fn performance(period: &Period, operations: &[Operation]) -> Value {
        json!({
            "period": period,
            "by_assignee": completion_rate_by_assignee(operations),
        })
    }

    /// Month-over-month net revenue across the period.
    pub fn trends(period: &Period, records: &[FinancialRecord]) -> Value {
        let mut months: BTreeMap<String, i64> = BTreeMap::new();
        for record in records {
            let key = format!("{:04}-{:02}", record.created_at.year(), record.created_at.month());
            *months.entry(key).or_insert(0) += record.net_cents();
        }
        json!({
            "period": period,
            "monthly_net_cents": months,
        })
    }

    /// Custom reports echo the caller's filters next to basic counts so the
    /// dashboard can render whatever was asked for.
    pub fn custom(
        period: &Period,
        filters: &Value,
        records: &[FinancialRecord],
        operations: &[Operation],
    ) -> Value {
        json!({
            "period": period,
            "filters": filters,
            "financial_records": records.len(),
            "operations": operations.len(),
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use carrel_ledger::models::{RecordStatus, TransactionType};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn period() -> Period {
        Period {
            start: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
        }
    }

    fn paid(amount: i64) -> FinancialRecord {
        let mut r = FinancialRecord::new(
            Uuid::new_v4(),
            None,
            TransactionType::Payment,
            amount,
            "USD".to_string(),
            "card".to_string(),
            Uuid::new_v4().to_string(),
        );
        r.status = RecordStatus::Completed;
        r
    }

    #[test]
    fn test_period_validation() {
        assert!(ReportBuilder::validate_period(&period()).is_ok());

        let backwards = Period {
            start: period().end,
            end: period().start,
        };
        assert!(ReportBuilder::validate_period(&backwards).is_err());
    }

    #[test]
    fn test_revenue_payload_shape() {
        let payload = ReportBuilder::revenue(&period(), &[paid(5000), paid(1500)]);
        assert_eq!(payload["summary"]["total_payments_cents"], 6500);
        assert!(payload["by_day"].is_array());
        assert_eq!(payload["by_method"]["card"], 6500);
    }

    #[test]
    fn test_trends_groups_by_month() {
        let payload = ReportBuilder::trends(&period(), &[paid(1000), paid(2000)]);
        let months = payload["monthly_net_cents"].as_object().unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months.values().next().unwrap().as_i64().unwrap(), 3000);
    }
}
