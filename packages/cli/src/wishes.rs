use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;
use vivah_common::api::{CreateWishRequest, UpdateWishRequest, Wish};

use crate::cache::ResponseCache;
use crate::error::ClientError;

pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Page key: `(limit, offset)`.
pub type WishesCache = ResponseCache<(u64, u64), Vec<Wish>>;

/// Where wishes are read from and written to.
#[async_trait]
pub trait WishBackend: Send + Sync {
    async fn list_wishes(&self, limit: u64, offset: u64) -> Result<Vec<Wish>, ClientError>;
    async fn list_my_wishes(&self) -> Result<Vec<Wish>, ClientError>;
    async fn create_wish(&self, request: &CreateWishRequest) -> Result<Wish, ClientError>;
    async fn update_wish(
        &self,
        id: Uuid,
        request: &UpdateWishRequest,
    ) -> Result<Wish, ClientError>;
    async fn delete_wish(&self, id: Uuid) -> Result<(), ClientError>;
}

/// Wishes wall with a cached public list. Writes made through this service
/// drop every cached page.
pub struct WishService<B> {
    backend: B,
    cache: Arc<WishesCache>,
}

impl<B: WishBackend> WishService<B> {
    pub fn new(backend: B, cache: Arc<WishesCache>) -> Self {
        Self { backend, cache }
    }

    pub fn with_ttl(backend: B, ttl: Duration) -> Self {
        Self::new(backend, Arc::new(ResponseCache::new(ttl)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Wish>, ClientError> {
        let backend = &self.backend;
        self.cache
            .get_or_fetch((limit, offset), move || backend.list_wishes(limit, offset))
            .await
    }

    /// The caller's own wishes. Never cached.
    pub async fn mine(&self) -> Result<Vec<Wish>, ClientError> {
        self.backend.list_my_wishes().await
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateWishRequest) -> Result<Wish, ClientError> {
        let text_ok = request.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let author_ok = request.author.as_deref().is_some_and(|a| !a.trim().is_empty());
        if !text_ok || !author_ok {
            return Err(ClientError::Validation(
                "Both a message and your name are required".into(),
            ));
        }

        let wish = self.backend.create_wish(&request).await?;
        self.cache.invalidate_all().await;
        Ok(wish)
    }

    #[instrument(skip(self, request))]
    pub async fn update(&self, id: Uuid, request: UpdateWishRequest) -> Result<Wish, ClientError> {
        let wish = self.backend.update_wish(id, &request).await?;
        self.cache.invalidate_all().await;
        Ok(wish)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.backend.delete_wish(id).await?;
        self.cache.invalidate_all().await;
        Ok(())
    }
}
