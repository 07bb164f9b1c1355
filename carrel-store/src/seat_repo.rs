use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use carrel_core::repository::{RepoError, RepoResult, SeatRepository};
use carrel_seating::seat::{Position, Seat, SeatStatus, SeatType};

use crate::{map_db_err, parse_enum};

pub struct StoreSeatRepository {
    pool: PgPool,
}

impl StoreSeatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct SeatRow {
    id: Uuid,
    seat_number: String,
    section: String,
    floor: i32,
    seat_type: String,
    pos_x: i32,
    pos_y: i32,
    features: Vec<String>,
    status: String,
    current_booking: Option<Uuid>,
    last_maintenance: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl SeatRow {
    fn into_seat(self) -> RepoResult<Seat> {
        let seat_type: SeatType = parse_enum("seat_type", &self.seat_type)?;
        let status: SeatStatus = parse_enum("status", &self.status)?;
        Ok(Seat {
            id: self.id,
            seat_number: self.seat_number,
            section: self.section,
            floor: self.floor,
            seat_type,
            position: Position { x: self.pos_x, y: self.pos_y },
            features: self.features,
            status,
            current_booking: self.current_booking,
            last_maintenance: self.last_maintenance,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SEAT_COLUMNS: &str = "id, seat_number, section, floor, seat_type, pos_x, pos_y, features, status, current_booking, last_maintenance, created_at, updated_at";

#[async_trait]
impl SeatRepository for StoreSeatRepository {
    async fn create(&self, seat: &Seat) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO seats (id, seat_number, section, floor, seat_type, pos_x, pos_y, features, status, current_booking, last_maintenance)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(seat.id)
        .bind(&seat.seat_number)
        .bind(&seat.section)
        .bind(seat.floor)
        .bind(seat.seat_type.as_str())
        .bind(seat.position.x)
        .bind(seat.position.y)
        .bind(&seat.features)
        .bind(seat.status.as_str())
        .bind(seat.current_booking)
        .bind(seat.last_maintenance)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<Seat>> {
        let row = sqlx::query_as::<_, SeatRow>(&format!(
            "SELECT {} FROM seats WHERE id = $1",
            SEAT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(SeatRow::into_seat).transpose()
    }

    async fn list(&self, section: Option<&str>) -> RepoResult<Vec<Seat>> {
        let rows: Vec<SeatRow> = if let Some(section) = section {
            sqlx::query_as::<_, SeatRow>(&format!(
                "SELECT {} FROM seats WHERE section = $1 ORDER BY section, seat_number",
                SEAT_COLUMNS
            ))
            .bind(section)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?
        } else {
            sqlx::query_as::<_, SeatRow>(&format!(
                "SELECT {} FROM seats ORDER BY section, seat_number",
                SEAT_COLUMNS
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?
        };

        rows.into_iter().map(SeatRow::into_seat).collect()
    }

    async fn update(&self, seat: &Seat) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE seats
            SET seat_number = $1, section = $2, floor = $3, seat_type = $4,
                pos_x = $5, pos_y = $6, features = $7, status = $8,
                current_booking = $9, last_maintenance = $10, updated_at = NOW()
            WHERE id = $11
            "#,
        )
        .bind(&seat.seat_number)
        .bind(&seat.section)
        .bind(seat.floor)
        .bind(seat.seat_type.as_str())
        .bind(seat.position.x)
        .bind(seat.position.y)
        .bind(&seat.features)
        .bind(seat.status.as_str())
        .bind(seat.current_booking)
        .bind(seat.last_maintenance)
        .bind(seat.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("seat {}", seat.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM seats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("seat {}", id)));
        }
        Ok(())
    }
}
