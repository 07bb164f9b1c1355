use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SeatStatusEvent {
    pub seat_id: Uuid,
    pub seat_number: String,
    pub section: String,
    pub status: String,
    pub booking_id: Option<Uuid>,
    pub changed_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub seat_id: Uuid,
    pub user_id: Uuid,
    pub start_time: i64,
    pub end_time: i64,
    pub amount_cents: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingStatusEvent {
    pub booking_id: Uuid,
    pub seat_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct AttendanceRecordedEvent {
    pub student_id: Uuid,
    pub date: chrono::NaiveDate,
    pub status: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PaymentRecordedEvent {
    pub record_id: Uuid,
    pub student_id: Uuid,
    pub transaction_type: String,
    pub amount_cents: i64,
    pub currency: String,
    pub timestamp: i64,
}
