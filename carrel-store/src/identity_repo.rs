use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use carrel_core::identity::{MembershipStatus, Role, Student, User};
use carrel_core::repository::{RepoError, RepoResult, StudentRepository, UserRepository};
use carrel_shared::pii::Masked;

use crate::{map_db_err, parse_enum};

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> RepoResult<User> {
        let role: Role = parse_enum("role", &self.role)?;
        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, created_at, updated_at";

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn create(&self, user: &User) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(UserRow::into_user).transpose()
    }
}

pub struct StoreStudentRepository {
    pool: PgPool,
}

impl StoreStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct StudentRow {
    id: Uuid,
    user_id: Option<Uuid>,
    full_name: String,
    email: String,
    phone: Option<String>,
    membership_status: String,
    joined_on: NaiveDate,
    assigned_seat: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudentRow {
    fn into_student(self) -> RepoResult<Student> {
        let membership_status: MembershipStatus = parse_enum("membership_status", &self.membership_status)?;
        Ok(Student {
            id: self.id,
            user_id: self.user_id,
            full_name: self.full_name,
            email: Masked(self.email),
            phone: self.phone.map(Masked),
            membership_status,
            joined_on: self.joined_on,
            assigned_seat: self.assigned_seat,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const STUDENT_COLUMNS: &str = "id, user_id, full_name, email, phone, membership_status, joined_on, assigned_seat, created_at, updated_at";

#[async_trait]
impl StudentRepository for StoreStudentRepository {
    async fn create(&self, student: &Student) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO students (id, user_id, full_name, email, phone, membership_status, joined_on, assigned_seat)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(student.id)
        .bind(student.user_id)
        .bind(&student.full_name)
        .bind(&student.email.0)
        .bind(student.phone.as_ref().map(|p| p.0.clone()))
        .bind(student.membership_status.as_str())
        .bind(student.joined_on)
        .bind(student.assigned_seat)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<Student>> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(StudentRow::into_student).transpose()
    }

    async fn list(&self) -> RepoResult<Vec<Student>> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students ORDER BY full_name",
            STUDENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(StudentRow::into_student).collect()
    }

    async fn update(&self, student: &Student) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET user_id = $1, full_name = $2, email = $3, phone = $4,
                membership_status = $5, joined_on = $6, assigned_seat = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(student.user_id)
        .bind(&student.full_name)
        .bind(&student.email.0)
        .bind(student.phone.as_ref().map(|p| p.0.clone()))
        .bind(student.membership_status.as_str())
        .bind(student.joined_on)
        .bind(student.assigned_seat)
        .bind(student.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("student {}", student.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("student {}", id)));
        }
        Ok(())
    }
}
