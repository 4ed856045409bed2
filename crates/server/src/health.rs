use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use comparcar_db::{migrations, DbPool};
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: Readiness,
    pub detail: String,
}

impl HealthCheck {
    fn ready(detail: impl Into<String>) -> Self {
        Self { status: Readiness::Ready, detail: detail.into() }
    }

    fn degraded(detail: impl Into<String>) -> Self {
        Self { status: Readiness::Degraded, detail: detail.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: Readiness,
    pub database: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

/// Ready only when the database answers and the `cars` schema is migrated.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let catalog = match database.status {
        Readiness::Ready => catalog_check(&state.db_pool).await,
        Readiness::Degraded => HealthCheck::degraded("skipped because the database is unreachable"),
    };

    let ready = database.status == Readiness::Ready && catalog.status == Readiness::Ready;
    if !ready {
        warn!(
            event_name = "system.health.degraded",
            correlation_id = "health",
            database = %database.detail,
            catalog = %catalog.detail,
            "health check degraded"
        );
    }

    let payload = HealthResponse {
        status: if ready { Readiness::Ready } else { Readiness::Degraded },
        database,
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck::ready("database query succeeded"),
        Err(error) => HealthCheck::degraded(format!("database query failed: {error}")),
    }
}

async fn catalog_check(pool: &DbPool) -> HealthCheck {
    match migrations::applied_count(pool).await {
        Ok(0) => return HealthCheck::degraded("no migrations applied"),
        Ok(_) => {}
        Err(error) => return HealthCheck::degraded(format!("migration state unreadable: {error}")),
    }

    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cars").fetch_one(pool).await {
        Ok(count) => HealthCheck::ready(format!("{count} cars in catalog")),
        Err(error) => HealthCheck::degraded(format!("cars table unreadable: {error}")),
    }
}
