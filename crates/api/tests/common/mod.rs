#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use hello_api::config::ServerConfig;
use hello_api::router::build_app_router;
use hello_api::state::AppState;
use hello_core::types::DbId;
use hello_db::models::human::Human;
use hello_db::HumanStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        request_timeout_secs: 30,
    }
}

/// Build the full application router over the given store, with the same
/// middleware stack production uses.
pub fn build_test_app(humans: Arc<dyn HumanStore>) -> Router {
    let config = test_config();
    let state = AppState {
        humans,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// In-memory record store that counts lookups.
#[derive(Default)]
pub struct InMemoryHumans {
    rows: HashMap<DbId, Option<String>>,
    pub lookups: AtomicUsize,
}

impl InMemoryHumans {
    pub fn with(rows: &[(DbId, Option<&str>)]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|(id, name)| (*id, name.map(str::to_string)))
                .collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> Vec<Human> {
        let mut rows: Vec<Human> = self
            .rows
            .iter()
            .map(|(id, name)| Human {
                id: *id,
                name: name.clone(),
            })
            .collect();
        rows.sort_by_key(|h| h.id);
        rows
    }
}

#[async_trait]
impl HumanStore for InMemoryHumans {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Human>, sqlx::Error> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.get(&id).map(|name| Human {
            id,
            name: name.clone(),
        }))
    }
}

/// Store whose backing database has gone away.
pub struct UnavailableHumans;

#[async_trait]
impl HumanStore for UnavailableHumans {
    async fn find_by_id(&self, _id: DbId) -> Result<Option<Human>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect the response body as UTF-8 text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
