use std::sync::Arc;

use sea_orm::DatabaseConnection;
use vivah_common::cdn::MediaCdn;
use vivah_common::event::EventContent;

use crate::config::AppConfig;
use crate::content::load_event_content;
use crate::utils::jwt::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub jwt: Arc<JwtKeys>,
    pub cdn: Arc<dyn MediaCdn>,
    pub content: Arc<EventContent>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: AppConfig,
        cdn: Arc<dyn MediaCdn>,
    ) -> anyhow::Result<Self> {
        let jwt = JwtKeys::from_config(&config.auth)?;
        let content = load_event_content(&config.event)?;
        Ok(Self {
            db,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            cdn,
            content: Arc::new(content),
        })
    }
}
