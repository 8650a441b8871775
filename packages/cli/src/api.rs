use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use vivah_common::api::{
    CreateImageRequest, CreateWishRequest, ErrorBody, Image, ImageListResponse, ImageResponse,
    UpdateWishRequest, Wish, WishListResponse, WishResponse,
};
use vivah_common::event::{Countdown, EventDetails, RsvpList, ScheduleDay};

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::upload::MetadataSink;
use crate::wishes::WishBackend;

/// Typed client for the server's `/api/v1` endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, http: &reqwest::Client) -> Self {
        Self {
            http: http.clone(),
            base_url: format!("{}/api/v1", config.base_url.trim_end_matches('/')),
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.code, body.message),
            Err(_) => ("UNKNOWN".to_string(), text),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn list_images(
        &self,
        limit: u64,
        offset: u64,
        user_only: bool,
    ) -> Result<Vec<Image>, ClientError> {
        let builder = self.request(Method::GET, "/images").query(&[
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("user_only", user_only.to_string()),
        ]);
        let body: ImageListResponse = Self::json(builder).await?;
        Ok(body.images)
    }

    pub async fn delete_image(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/images/{id}"))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn event(&self) -> Result<EventDetails, ClientError> {
        Self::json(self.request(Method::GET, "/event")).await
    }

    pub async fn schedule(&self) -> Result<Vec<ScheduleDay>, ClientError> {
        Self::json(self.request(Method::GET, "/event/schedule")).await
    }

    pub async fn guests(&self) -> Result<RsvpList, ClientError> {
        Self::json(self.request(Method::GET, "/event/guests")).await
    }

    pub async fn countdown(&self) -> Result<Countdown, ClientError> {
        Self::json(self.request(Method::GET, "/event/countdown")).await
    }
}

#[async_trait]
impl WishBackend for ApiClient {
    async fn list_wishes(&self, limit: u64, offset: u64) -> Result<Vec<Wish>, ClientError> {
        let builder = self
            .request(Method::GET, "/wishes")
            .query(&[("limit", limit), ("offset", offset)]);
        let body: WishListResponse = Self::json(builder).await?;
        Ok(body.wishes)
    }

    async fn list_my_wishes(&self) -> Result<Vec<Wish>, ClientError> {
        let body: WishListResponse = Self::json(self.request(Method::GET, "/wishes/mine")).await?;
        Ok(body.wishes)
    }

    async fn create_wish(&self, request: &CreateWishRequest) -> Result<Wish, ClientError> {
        let body: WishResponse = Self::json(self.request(Method::POST, "/wishes").json(request)).await?;
        Ok(body.wish)
    }

    async fn update_wish(&self, id: Uuid, request: &UpdateWishRequest) -> Result<Wish, ClientError> {
        let builder = self
            .request(Method::PATCH, &format!("/wishes/{id}"))
            .json(request);
        let body: WishResponse = Self::json(builder).await?;
        Ok(body.wish)
    }

    async fn delete_wish(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/wishes/{id}"))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl MetadataSink for ApiClient {
    async fn save_image(&self, request: &CreateImageRequest) -> Result<Image, ClientError> {
        let body: ImageResponse = Self::json(self.request(Method::POST, "/images").json(request)).await?;
        Ok(body.image)
    }
}
