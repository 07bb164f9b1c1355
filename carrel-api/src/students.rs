use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use carrel_core::identity::{MembershipStatus, Student};
use carrel_shared::pii::Masked;

use crate::error::AppError;
use crate::middleware::auth::staff_auth_middleware;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CreateStudentRequest {
    full_name: String,
    email: String,
    phone: Option<String>,
    user_id: Option<Uuid>,
    joined_on: Option<chrono::NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct UpdateStudentRequest {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    membership_status: Option<MembershipStatus>,
    assigned_seat: Option<Uuid>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/students", get(list_students).post(create_student))
        .route("/v1/students/{id}", get(get_student).put(update_student).delete(delete_student))
        .layer(middleware::from_fn_with_state(state, staff_auth_middleware))
}

async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::ValidationError("full_name is required".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::ValidationError("invalid email address".to_string()));
    }

    let now = Utc::now();
    let student = Student {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        full_name: req.full_name,
        email: Masked(req.email.to_lowercase()),
        phone: req.phone.map(Masked),
        membership_status: MembershipStatus::Active,
        joined_on: req.joined_on.unwrap_or_else(|| now.date_naive()),
        assigned_seat: None,
        created_at: now,
        updated_at: now,
    };

    state.students.create(&student).await?;
    Ok(Json(student))
}

async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Student>, AppError> {
    let student = state
        .students
        .get(student_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("student {} not found", student_id)))?;

    Ok(Json(student))
}

async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, AppError> {
    let students = state.students.list().await?;
    Ok(Json(students))
}

async fn update_student(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    let mut student = state
        .students
        .get(student_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("student {} not found", student_id)))?;

    if let Some(full_name) = req.full_name {
        student.full_name = full_name;
    }
    if let Some(email) = req.email {
        if !email.contains('@') {
            return Err(AppError::ValidationError("invalid email address".to_string()));
        }
        student.email = Masked(email.to_lowercase());
    }
    if let Some(phone) = req.phone {
        student.phone = Some(Masked(phone));
    }
    if let Some(status) = req.membership_status {
        student.membership_status = status;
    }
    if let Some(seat) = req.assigned_seat {
        state
            .seats
            .get(seat)
            .await?
            .ok_or_else(|| AppError::NotFoundError(format!("seat {} not found", seat)))?;
        student.assigned_seat = Some(seat);
    }
    student.updated_at = Utc::now();

    state.students.update(&student).await?;
    Ok(Json(student))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    state.students.delete(student_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
