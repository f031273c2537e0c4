use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use habit_core::{
    CheckIn, CheckInInput, CheckInToggle, Habit, HabitFilter, HabitInput, HabitService, HabitStats,
    Note, NoteInput,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin: Option<CheckIn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl From<CheckInToggle> for ToggleResponse {
    fn from(toggle: CheckInToggle) -> Self {
        match toggle {
            CheckInToggle::Created(checkin) => Self {
                checked: true,
                checkin: Some(checkin),
                message: None,
            },
            CheckInToggle::Removed => Self {
                checked: false,
                checkin: None,
                message: Some("Check-in removed"),
            },
        }
    }
}

/// Parses an action payload, treating an empty body like `{}` so the
/// missing field is reported by name.
fn json_or_default<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let Json(value) = Json::<T>::from_bytes(body)?;
    Ok(value)
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn list_habits(
    State(service): State<HabitService>,
    filter: Result<Query<HabitFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Habit>>> {
    let Query(filter) = filter?;
    Ok(Json(service.list_habits(&filter)?))
}

pub async fn create_habit(
    State(service): State<HabitService>,
    input: Result<Json<HabitInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Habit>)> {
    let Json(input) = input?;
    let habit = service.create_habit(&input)?;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn get_habit(
    State(service): State<HabitService>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Habit>> {
    let Path(id) = id?;
    Ok(Json(service.get_habit(id)?))
}

pub async fn replace_habit(
    State(service): State<HabitService>,
    id: Result<Path<i64>, PathRejection>,
    input: Result<Json<HabitInput>, JsonRejection>,
) -> ApiResult<Json<Habit>> {
    let Path(id) = id?;
    let Json(input) = input?;
    Ok(Json(service.replace_habit(id, &input)?))
}

pub async fn patch_habit(
    State(service): State<HabitService>,
    id: Result<Path<i64>, PathRejection>,
    input: Result<Json<HabitInput>, JsonRejection>,
) -> ApiResult<Json<Habit>> {
    let Path(id) = id?;
    let Json(input) = input?;
    Ok(Json(service.patch_habit(id, &input)?))
}

pub async fn delete_habit(
    State(service): State<HabitService>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    service.delete_habit(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggles the check-in for the posted date: 201 when created, 200 when
/// removed.
pub async fn checkin(
    State(service): State<HabitService>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ToggleResponse>)> {
    let Path(id) = id?;
    let input: CheckInInput = json_or_default(&body)?;
    let toggle = service.toggle_checkin(id, &input)?;
    let status = if toggle.is_checked() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(toggle.into())))
}

pub async fn add_note(
    State(service): State<HabitService>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let Path(id) = id?;
    let input: NoteInput = json_or_default(&body)?;
    let note = service.add_note(id, &input)?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn habit_stats(
    State(service): State<HabitService>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<HabitStats>> {
    let Path(id) = id?;
    let today = Utc::now().date_naive();
    Ok(Json(service.habit_stats(id, today)?))
}
