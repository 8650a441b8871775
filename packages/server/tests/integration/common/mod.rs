use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;

use vivah_common::CdnConfig;
use vivah_common::cdn::{CdnError, DestroyOutcome, MediaCdn, UploadRequest, UploadedAsset};
use vivah_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, EventConfig, ServerConfig, WishesConfig,
};
use vivah_server::state::AppState;
use vivah_server::utils::jwt::JwtKeys;

const JWT_SECRET: &str = "test-secret-for-integration-tests";

pub mod routes {
    pub const WISHES: &str = "/api/v1/wishes";
    pub const MY_WISHES: &str = "/api/v1/wishes/mine";
    pub const IMAGES: &str = "/api/v1/images";
    pub const EVENT: &str = "/api/v1/event";
    pub const SCHEDULE: &str = "/api/v1/event/schedule";
    pub const GUESTS: &str = "/api/v1/event/guests";
    pub const COUNTDOWN: &str = "/api/v1/event/countdown";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn wish(id: &str) -> String {
        format!("/api/v1/wishes/{id}")
    }

    pub fn wish_approval(id: &str) -> String {
        format!("/api/v1/wishes/{id}/approval")
    }

    pub fn image(id: &str) -> String {
        format!("/api/v1/images/{id}")
    }
}

/// Fake CDN that records destroy calls and can be told to fail.
#[derive(Default)]
pub struct RecordingCdn {
    pub destroyed: Mutex<Vec<String>>,
    pub fail_destroy: bool,
}

#[async_trait]
impl MediaCdn for RecordingCdn {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, CdnError> {
        Ok(UploadedAsset {
            secure_url: format!(
                "https://res.cloudinary.com/test/image/upload/v1/{}",
                request.file_name
            ),
            public_id: request.file_name,
            bytes: Some(request.bytes.len() as u64),
            width: None,
            height: None,
            format: Some("jpg".into()),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, CdnError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        if self.fail_destroy {
            return Err(CdnError::Rejected {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(DestroyOutcome::Deleted)
    }
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub cdn: Arc<RecordingCdn>,
    keys: JwtKeys,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// The `id` of the wish or image in the response body.
    pub fn id(&self) -> String {
        self.body["wish"]["id"]
            .as_str()
            .or_else(|| self.body["image"]["id"].as_str())
            .unwrap_or_else(|| panic!("Response has no id: {}", self.text))
            .to_string()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: Some(JWT_SECRET.to_string()),
            ..Default::default()
        },
        cdn: CdnConfig::default(),
        wishes: WishesConfig::default(),
        event: EventConfig::default(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(), RecordingCdn::default()).await
    }

    /// Spawn with moderation enabled for new wishes.
    pub async fn spawn_moderated() -> Self {
        let mut config = test_config();
        config.wishes.auto_approve = false;
        Self::spawn_with(config, RecordingCdn::default()).await
    }

    /// Spawn with a CDN whose destroy calls always fail.
    pub async fn spawn_with_failing_cdn() -> Self {
        let cdn = RecordingCdn {
            fail_destroy: true,
            ..Default::default()
        };
        Self::spawn_with(test_config(), cdn).await
    }

    async fn spawn_with(config: AppConfig, cdn: RecordingCdn) -> Self {
        // One connection: every pooled connection to `sqlite::memory:` is its own database.
        let mut opts = ConnectOptions::new(config.database.url.clone());
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts)
            .await
            .expect("Failed to connect to in-memory database");
        vivah_server::database::sync_schema(&db)
            .await
            .expect("Failed to create schema");

        let keys = JwtKeys::from_config(&config.auth).expect("Invalid test auth config");
        let cdn = Arc::new(cdn);
        let state = AppState::new(db.clone(), config, cdn.clone()).expect("Failed to build state");
        let app = vivah_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            cdn,
            keys,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Token for a signed-in guest.
    pub fn token(&self, user_id: &str) -> String {
        self.token_with_role(user_id, None)
    }

    pub fn token_with_role(&self, user_id: &str, role: Option<&str>) -> String {
        self.keys
            .sign(user_id, role, Duration::hours(1))
            .expect("Failed to sign test token")
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.cdn.destroyed.lock().unwrap().clone()
    }

    async fn send(&self, req: reqwest::RequestBuilder, token: Option<&str>) -> TestResponse {
        let req = match token {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        };
        let res = req.send().await.expect("Failed to send request");
        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(self.client.get(self.url(path)), token).await
    }

    pub async fn post(&self, path: &str, body: &Value, token: Option<&str>) -> TestResponse {
        self.send(self.client.post(self.url(path)).json(body), token)
            .await
    }

    pub async fn patch(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(self.client.patch(self.url(path)).json(body), Some(token))
            .await
    }

    pub async fn put(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(self.client.put(self.url(path)).json(body), Some(token))
            .await
    }

    pub async fn delete(&self, path: &str, token: &str) -> TestResponse {
        self.send(self.client.delete(self.url(path)), Some(token))
            .await
    }

    /// Post a wish via the API and return its `id`.
    pub async fn create_wish(&self, text: &str, author: &str, token: Option<&str>) -> String {
        let res = self
            .post(
                routes::WISHES,
                &serde_json::json!({ "text": text, "author": author }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_wish failed: {}", res.text);
        res.id()
    }

    /// Record an image via the API and return its `id`.
    pub async fn create_image(&self, public_id: &str, token: &str) -> String {
        let res = self
            .post(
                routes::IMAGES,
                &serde_json::json!({
                    "image_url": format!("https://res.cloudinary.com/test/image/upload/v1/{public_id}.jpg"),
                    "public_id": public_id,
                    "original_name": "IMG_0001.jpg",
                    "original_size": 4_500_000,
                    "optimized_size": 1_900_000,
                    "width": 2560,
                    "height": 1440,
                    "format": "jpeg",
                }),
                Some(token),
            )
            .await;
        assert_eq!(res.status, 201, "create_image failed: {}", res.text);
        res.id()
    }
}
