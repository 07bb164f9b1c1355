use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use carrel_booking::lifecycle::{ensure_transition, releases_seat};
use carrel_booking::models::{Booking, BookingStatus, BookingType, PaymentStatus, Price};
use carrel_core::repository::{BookingRepository, RepoError, RepoResult};

use crate::{map_db_err, parse_enum};

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Both multi-write paths run at SERIALIZABLE so the conflict check,
    /// the seat flip and the booking write commit or fail as one unit.
    async fn set_transaction_serializable(
        tx: &mut Transaction<'_, Postgres>,
    ) -> RepoResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    seat_id: Uuid,
    user_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
    booking_type: String,
    amount_cents: i64,
    currency: String,
    payment_status: String,
    checked_in_at: Option<DateTime<Utc>>,
    checked_out_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> RepoResult<Booking> {
        let status: BookingStatus = parse_enum("status", &self.status)?;
        let booking_type: BookingType = parse_enum("booking_type", &self.booking_type)?;
        let payment_status: PaymentStatus = parse_enum("payment_status", &self.payment_status)?;
        Ok(Booking {
            id: self.id,
            seat_id: self.seat_id,
            user_id: self.user_id,
            start_time: self.start_time,
            end_time: self.end_time,
            status,
            booking_type,
            price: Price {
                amount_cents: self.amount_cents,
                currency: self.currency,
            },
            payment_status,
            checked_in_at: self.checked_in_at,
            checked_out_at: self.checked_out_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, seat_id, user_id, start_time, end_time, status, booking_type, amount_cents, currency, payment_status, checked_in_at, checked_out_at, created_at, updated_at";

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create(&self, booking: &Booking) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        Self::set_transaction_serializable(&mut tx).await?;

        // Conditional seat flip: reserve only if still AVAILABLE. Zero rows
        // means the seat is missing or taken; which of the two decides the
        // status code, so look it up before failing.
        let flipped = sqlx::query(
            r#"
            UPDATE seats
            SET status = 'RESERVED', current_booking = $1, updated_at = NOW()
            WHERE id = $2 AND status = 'AVAILABLE'
            "#,
        )
        .bind(booking.id)
        .bind(booking.seat_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        if flipped.rows_affected() == 0 {
            let exists: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM seats WHERE id = $1")
                    .bind(booking.seat_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_db_err)?;

            return match exists {
                None => Err(RepoError::NotFound(format!("seat {}", booking.seat_id))),
                Some(_) => Err(RepoError::Conflict("seat is not available".to_string())),
            };
        }

        // Half-open overlap scan over active bookings. First conflicting
        // record wins; the exclusion constraint backstops this under
        // concurrent commits.
        let conflict: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM bookings
            WHERE seat_id = $1
              AND status IN ('PENDING', 'CONFIRMED')
              AND start_time < $3
              AND end_time > $2
            LIMIT 1
            "#,
        )
        .bind(booking.seat_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;

        if let Some((conflicting,)) = conflict {
            return Err(RepoError::Conflict(format!(
                "requested interval overlaps booking {}",
                conflicting
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO bookings (id, seat_id, user_id, start_time, end_time, status, booking_type, amount_cents, currency, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(booking.id)
        .bind(booking.seat_id)
        .bind(booking.user_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.status.as_str())
        .bind(booking.booking_type.as_str())
        .bind(booking.price.amount_cents)
        .bind(&booking.price.currency)
        .bind(booking.payment_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn list_all(&self) -> RepoResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn find_conflict(
        &self,
        seat_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE seat_id = $1
              AND status IN ('PENDING', 'CONFIRMED')
              AND start_time < $3
              AND end_time > $2
            ORDER BY start_time
            LIMIT 1
            "#,
            BOOKING_COLUMNS
        ))
        .bind(seat_id)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn transition(
        &self,
        id: Uuid,
        to: BookingStatus,
        payment: Option<PaymentStatus>,
    ) -> RepoResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        Self::set_transaction_serializable(&mut tx).await?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| RepoError::NotFound(format!("booking {}", id)))?;

        let current = row.into_booking()?;
        ensure_transition(current.status, to)
            .map_err(|e| RepoError::Conflict(e.to_string()))?;

        let updated = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $1,
                payment_status = COALESCE($2, payment_status),
                updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(to.as_str())
        .bind(payment.map(|p| p.as_str()))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?
        .into_booking()?;

        if releases_seat(to) {
            if to == BookingStatus::Cancelled {
                // Release only if the seat still points at this booking.
                sqlx::query(
                    r#"
                    UPDATE seats
                    SET status = 'AVAILABLE', current_booking = NULL, updated_at = NOW()
                    WHERE id = $1 AND current_booking = $2
                    "#,
                )
                .bind(updated.seat_id)
                .bind(updated.id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
            } else {
                // Completion releases unconditionally.
                sqlx::query(
                    r#"
                    UPDATE seats
                    SET status = 'AVAILABLE', current_booking = NULL, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(updated.seat_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
            }
        }

        tx.commit().await.map_err(map_db_err)?;
        Ok(updated)
    }

    async fn count_in_period(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> RepoResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE start_time < $2 AND end_time > $1",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(count)
    }
}
