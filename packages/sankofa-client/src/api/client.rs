//! HTTP implementation of the Sankofa API.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::SankofaApi;
use crate::error::{ApiError, ClientError, Result};
use crate::session::SessionStore;
use crate::types::{
    ApiNotification, CreateGroupRequest, JoinGroupRequest, OtpPurpose, OtpRequest,
    OtpVerification, OtpVerifyRequest, Registration, RegistrationRequest, SusuGroup,
    Transaction, User,
};

/// Sankofa REST client.
///
/// Authenticated requests carry the access token currently held by the
/// session store, so a login in one place is picked up everywhere.
#[derive(Clone)]
pub struct HttpApi {
    http_client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl HttpApi {
    /// Create a client for `base_url` (e.g. `https://api.sankofa.example`).
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionStore>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "API base URL must start with http:// or https://, got {base_url:?}"
            )));
        }

        Ok(Self {
            http_client: Client::new(),
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request without credentials, for the sign-in endpoints. A stale token
    /// would otherwise be rejected before the view runs.
    fn public_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json")
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let mut builder = self.public_request(method, path);

        if let Some(tokens) = self.session.load().await?.and_then(|s| s.tokens) {
            builder = builder.bearer_auth(tokens.access);
        }

        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<reqwest::Response> {
        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            warn!(path, error = %e, "Sankofa request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        debug!(
            path,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "Sankofa API response"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_response(status.as_u16(), &body);
            warn!(path, status = status.as_u16(), error = %err.message, "Sankofa API error");
            return Err(err.into());
        }

        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path).await?;
        let response = self.send(builder, path).await?;
        parse_json(response).await
    }

    async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut builder = self.request(Method::POST, path).await?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(builder, path).await?;
        parse_json(response).await
    }

    async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.public_request(Method::POST, path).json(body);
        let response = self.send(builder, path).await?;
        parse_json(response).await
    }

    async fn post_no_content(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::POST, path).await?;
        self.send(builder, path).await?;
        Ok(())
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
}

#[async_trait]
impl SankofaApi for HttpApi {
    async fn request_otp(&self, phone_number: &str, purpose: OtpPurpose) -> Result<()> {
        let path = "/api/auth/otp/request/";
        let builder = self
            .public_request(Method::POST, path)
            .json(&OtpRequest {
                phone_number,
                purpose,
            });
        self.send(builder, path).await?;
        Ok(())
    }

    async fn register(
        &self,
        phone_number: &str,
        full_name: &str,
        email: Option<&str>,
    ) -> Result<Registration> {
        let request = RegistrationRequest {
            phone_number,
            full_name,
            email,
        };
        self.post_public("/api/auth/register/", &request).await
    }

    async fn verify_otp(
        &self,
        phone_number: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<OtpVerification> {
        let request = OtpVerifyRequest {
            phone_number,
            code,
            purpose,
        };
        self.post_public("/api/auth/otp/verify/", &request).await
    }

    async fn current_user(&self, force_refresh: bool) -> Result<User> {
        let path = "/api/auth/me/";
        let mut builder = self.request(Method::GET, path).await?;
        if force_refresh {
            builder = builder.header(header::CACHE_CONTROL, "no-cache");
        }
        let response = self.send(builder, path).await?;
        parse_json(response).await
    }

    async fn list_groups(&self) -> Result<Vec<SusuGroup>> {
        self.get("/api/groups/").await
    }

    async fn get_group(&self, id: &str) -> Result<SusuGroup> {
        self.get(&format!("/api/groups/{id}/")).await
    }

    async fn create_group(&self, request: &CreateGroupRequest) -> Result<SusuGroup> {
        self.post("/api/groups/", Some(request)).await
    }

    async fn join_group(&self, id: &str, request: &JoinGroupRequest) -> Result<SusuGroup> {
        let path = format!("/api/groups/{id}/join/");
        let body = (!request.is_empty()).then_some(request);
        self.post(&path, body).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.get("/api/transactions/").await
    }

    async fn get_transaction(&self, id: &str) -> Result<Transaction> {
        self.get(&format!("/api/transactions/{id}/")).await
    }

    async fn list_notifications(&self) -> Result<Vec<ApiNotification>> {
        self.get("/api/notifications/").await
    }

    async fn mark_notification_read(&self, id: &str) -> Result<()> {
        self.post_no_content(&format!("/api/notifications/{id}/mark-read/"))
            .await
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        self.post_no_content("/api/notifications/mark-all-read/").await
    }
}

impl std::fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
