use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{routing::get, Router};
use hello_core::greeting::{display_name, render_greeting, DEFAULT_NAME};
use hello_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for `GET /`.
#[derive(Debug, Deserialize)]
pub struct GreetingParams {
    /// Raw `id` value; absent or empty means `0`.
    pub id: Option<String>,
}

/// Parse the `id` parameter, defaulting to `0` when absent or empty.
pub fn parse_id(raw: Option<&str>) -> AppResult<DbId> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::BadRequest(format!("id must be an integer, got '{value}'"))),
    }
}

/// GET /?id=<n> -- greet the human with this id, or the world.
///
/// Query string rejections are mapped onto [`AppError::BadRequest`] so every
/// 400 carries the same JSON body.
async fn get_greeting(
    State(state): State<AppState>,
    params: Result<Query<GreetingParams>, QueryRejection>,
) -> AppResult<String> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let id = parse_id(params.id.as_deref())?;
    let human = state.humans.find_by_id(id).await?;
    tracing::debug!(id, found = human.is_some(), "Looked up human");

    let name = match &human {
        Some(human) => display_name(human.name.as_deref()),
        None => DEFAULT_NAME,
    };
    Ok(render_greeting(name))
}

/// Mount the greeting route at the root path.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_greeting))
}
