use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Payment,
    Refund,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Payment => "PAYMENT",
            TransactionType::Refund => "REFUND",
            TransactionType::Adjustment => "ADJUSTMENT",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "PENDING",
            RecordStatus::Completed => "COMPLETED",
            RecordStatus::Failed => "FAILED",
            RecordStatus::Refunded => "REFUNDED",
        }
    }
}

/// One ledger row: a payment, refund, or manual adjustment.
/// `reference` is the external receipt/transaction id and is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub amount_cents: i64,
    pub currency: String,
    pub status: RecordStatus,
    pub payment_method: String,
    pub reference: String,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        student_id: Uuid,
        booking_id: Option<Uuid>,
        transaction_type: TransactionType,
        amount_cents: i64,
        currency: String,
        payment_method: String,
        reference: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            booking_id,
            transaction_type,
            amount_cents,
            currency,
            status: RecordStatus::Pending,
            payment_method,
            reference,
            description: None,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    /// Signed contribution to revenue: refunds subtract, adjustments carry
    /// their own sign, and only completed rows count.
    pub fn net_cents(&self) -> i64 {
        if self.status != RecordStatus::Completed {
            return 0;
        }
        match self.transaction_type {
            TransactionType::Payment => self.amount_cents,
            TransactionType::Refund => -self.amount_cents,
            TransactionType::Adjustment => self.amount_cents,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Financial record not found: {0}")]
    NotFound(String),

    #[error("Duplicate reference: {0}")]
    DuplicateReference(String),
}
