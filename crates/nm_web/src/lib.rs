use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod mock;
pub mod state;

pub use mock::{MockGenerator, MockReport};
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route(
            "/api/GenerateFakeArticles",
            get(handlers::generate_fake_articles).post(handlers::generate_fake_articles),
        )
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState, MockGenerator, MockReport};
    pub use nm_core::{Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use nm_core::{BlobStore, Config, Error, Result};
    use nm_storage::MemoryStorage;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const RAW: &str = "articles-data";

    fn app(store: Arc<dyn BlobStore>) -> Router {
        let config = Config::new("memory://").unwrap();
        create_app(AppState {
            generator: MockGenerator::new(&config, store),
        })
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_count_five_writes_five_distinct_keys() {
        let memory = MemoryStorage::new();
        let (status, body) = call(app(Arc::new(memory.clone())), get("/api/GenerateFakeArticles?count=5")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"requested": 5, "written": 5, "failed": 0}));
        let keys = memory.keys(RAW).await;
        assert_eq!(keys.len(), 5);
        assert!(keys.iter().all(|k| k.starts_with("mock-")));
    }

    #[tokio::test]
    async fn test_invalid_counts_write_nothing() {
        for uri in [
            "/api/GenerateFakeArticles?count=0",
            "/api/GenerateFakeArticles?count=-3",
            "/api/GenerateFakeArticles?count=10001",
            "/api/GenerateFakeArticles?count=abc",
        ] {
            let memory = MemoryStorage::new();
            let (status, body) = call(app(Arc::new(memory.clone())), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["kind"], "ValidationError");
            assert!(memory.keys(RAW).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_default_count() {
        let memory = MemoryStorage::new();
        let (status, body) = call(app(Arc::new(memory.clone())), get("/api/GenerateFakeArticles")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requested"], 10);
        assert_eq!(memory.keys(RAW).await.len(), 10);
    }

    #[tokio::test]
    async fn test_post_body_count() {
        let memory = MemoryStorage::new();
        let (status, body) = call(
            app(Arc::new(memory.clone())),
            post("/api/GenerateFakeArticles", json!({"count": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["written"], 3);

        let (status, _) = call(
            app(Arc::new(memory.clone())),
            post("/api/GenerateFakeArticles?count=2", json!({"count": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(memory.keys(RAW).await.len(), 5);
    }

    struct UnavailableStore;

    #[async_trait]
    impl BlobStore for UnavailableStore {
        fn name(&self) -> &str {
            "unavailable"
        }

        async fn ensure_container(&self, container: &str) -> Result<()> {
            Err(Error::Storage(format!("cannot create {}", container)))
        }

        async fn put(&self, _container: &str, _key: &str, _bytes: Vec<u8>) -> Result<()> {
            Err(Error::Storage("unreachable".to_string()))
        }

        async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
            Err(Error::BlobNotFound {
                container: container.to_string(),
                key: key.to_string(),
            })
        }

        async fn list(&self, _container: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    /// Accepts every other write.
    #[derive(Default)]
    struct FlakyStore {
        memory: MemoryStorage,
        puts: AtomicUsize,
    }

    #[async_trait]
    impl BlobStore for FlakyStore {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn ensure_container(&self, container: &str) -> Result<()> {
            self.memory.ensure_container(container).await
        }

        async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
            if self.puts.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
                return Err(Error::Storage(format!("write of {} rejected", key)));
            }
            self.memory.put(container, key, bytes).await
        }

        async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
            self.memory.get(container, key).await
        }

        async fn list(&self, container: &str) -> Result<Vec<String>> {
            self.memory.list(container).await
        }
    }

    #[tokio::test]
    async fn test_failed_writes_do_not_abort_batch() {
        let store = Arc::new(FlakyStore::default());
        let (status, body) = call(app(store.clone()), get("/api/GenerateFakeArticles?count=6")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"requested": 6, "written": 3, "failed": 3}));
        assert_eq!(store.memory.keys(RAW).await.len(), 3);
    }

    #[tokio::test]
    async fn test_container_failure_is_server_error() {
        let (status, body) = call(app(Arc::new(UnavailableStore)), get("/api/GenerateFakeArticles?count=2")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "StorageError");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(app(Arc::new(MemoryStorage::new())), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }
}
