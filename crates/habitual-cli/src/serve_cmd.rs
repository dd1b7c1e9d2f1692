use std::net::SocketAddr;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use habitual_core::execution::ExecutionToggle;
use habitual_core::plan::PlanToggle;
use habitual_core::reconcile::{Agenda, InitialState};
use habitual_core::{CalendarDay, Goal, Habit, Tracker, TrackerError, Weekday};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(msg) => Self::bad_request(msg),
            TrackerError::NotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            TrackerError::Store(inner) => {
                tracing::error!(error = %format!("{inner:#}"), "store failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "internal server error".to_string(),
                }
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, AppError>;

fn success() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    fn day(&self) -> Result<Option<CalendarDay>, TrackerError> {
        Ok(self
            .date
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse::<CalendarDay>)
            .transpose()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct TogglePlanRequest {
    pub weekday: String,
    pub habit_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReplicateRequest {
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleExecutionRequest {
    pub habit_id: Uuid,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub tracker: Tracker,
    /// Weekday copied by `/api/plan/replicate` when the body names none.
    pub replicate_source: Weekday,
}

pub fn build_router(tracker: Tracker, replicate_source: Weekday) -> Router {
    let state = AppState {
        tracker,
        replicate_source,
    };
    Router::new()
        .route("/api/init", get(initial_state))
        .route("/api/agenda", get(agenda))
        .route("/api/habits", get(list_habits).post(create_habit))
        .route("/api/habits/{id}", delete(delete_habit))
        .route("/api/plan/toggle", post(toggle_plan))
        .route("/api/plan/replicate", post(replicate_plan))
        .route("/api/executions/toggle", post(toggle_execution))
        .route("/api/goals", get(list_goals).post(create_goal))
        .route("/api/goals/{id}", patch(update_goal).delete(delete_goal))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(
    tracker: Tracker,
    replicate_source: Weekday,
    bind: &str,
    port: u16,
) -> Result<()> {
    let app = build_router(tracker, replicate_source);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("habitual serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("habitual serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn initial_state(
    State(state): State<AppState>,
    query: std::result::Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<InitialState> {
    let Query(query) = query?;
    let loaded = state
        .tracker
        .reconciler
        .load_initial_state(query.day()?)
        .await?;
    Ok(Json(loaded))
}

async fn agenda(
    State(state): State<AppState>,
    query: std::result::Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<Agenda> {
    let Query(query) = query?;
    Ok(Json(state.tracker.reconciler.agenda(query.day()?).await?))
}

async fn list_habits(State(state): State<AppState>) -> ApiResult<Vec<Habit>> {
    Ok(Json(state.tracker.habits.list().await?))
}

async fn create_habit(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateHabitRequest>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<Habit>), AppError> {
    let Json(req) = body?;
    let habit = state.tracker.habits.create(&req.name, &req.category).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

async fn delete_habit(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> ApiResult<serde_json::Value> {
    let Path(id) = path?;
    state.tracker.habits.delete(id).await?;
    Ok(success())
}

async fn toggle_plan(
    State(state): State<AppState>,
    body: std::result::Result<Json<TogglePlanRequest>, JsonRejection>,
) -> ApiResult<PlanToggle> {
    let Json(req) = body?;
    let weekday: Weekday = req.weekday.parse().map_err(TrackerError::from)?;
    Ok(Json(state.tracker.plan.toggle(weekday, req.habit_id).await?))
}

/// The body is optional: an empty body replicates from the configured day.
async fn replicate_plan(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<serde_json::Value> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ReplicateRequest::default()
    } else {
        serde_json::from_slice::<ReplicateRequest>(&body)
            .map_err(|err| AppError::bad_request(format!("invalid request body: {err}")))?
    };
    let source = match req.source {
        Some(raw) => raw.parse::<Weekday>().map_err(TrackerError::from)?,
        None => state.replicate_source,
    };
    state.tracker.plan.replicate_from(source).await?;
    Ok(success())
}

async fn toggle_execution(
    State(state): State<AppState>,
    body: std::result::Result<Json<ToggleExecutionRequest>, JsonRejection>,
) -> ApiResult<ExecutionToggle> {
    let Json(req) = body?;
    let day: CalendarDay = req.date.parse().map_err(TrackerError::from)?;
    Ok(Json(state.tracker.executions.toggle(req.habit_id, day).await?))
}

async fn list_goals(
    State(state): State<AppState>,
    query: std::result::Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<Vec<Goal>> {
    let Query(query) = query?;
    Ok(Json(state.tracker.goals.list_by_day(query.day()?).await?))
}

async fn create_goal(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateGoalRequest>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<Goal>), AppError> {
    let Json(req) = body?;
    let date = DateQuery { date: req.date }.day()?;
    let goal = state
        .tracker
        .goals
        .create(&req.title, &req.category, date)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn update_goal(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    body: std::result::Result<Json<UpdateGoalRequest>, JsonRejection>,
) -> ApiResult<Goal> {
    let Path(id) = path?;
    let Json(req) = body?;
    Ok(Json(state.tracker.goals.set_completed(id, req.completed).await?))
}

async fn delete_goal(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> ApiResult<serde_json::Value> {
    let Path(id) = path?;
    state.tracker.goals.delete(id).await?;
    Ok(success())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
