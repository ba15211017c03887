use super::DashboardSession;
use crate::api::v1::*;
use crate::domain_model::AdminUserId;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),
    #[error("not signed in")]
    NotSignedIn,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("api returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<ApiErrorCode>,
        message: String,
    },
    #[error("unexpected api response: {0}")]
    Malformed(String),
}

/// HTTP client for the back office API, carrying the dashboard session.
pub struct AdminApiClient {
    client: Client,
    base_url: Url,
    session: DashboardSession,
}

impl AdminApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DashboardError> {
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| DashboardError::InvalidBaseUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            session: DashboardSession::new(),
        })
    }

    pub fn session(&self) -> &DashboardSession {
        &self.session
    }

    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<&AdminUserView, DashboardError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .send(self.request(Method::POST, "login")?.json(&body))
            .await?;
        self.session.login_user(response);
        self.session
            .user()
            .ok_or_else(|| DashboardError::Malformed("login returned no user".to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<AdminUserView>, DashboardError> {
        let response: UserListResponse = self.send(self.request(Method::GET, "users")?).await?;
        Ok(response.users)
    }

    pub async fn update_user(
        &self,
        id: AdminUserId,
        update: &UpdateRequest,
    ) -> Result<AdminUserView, DashboardError> {
        let path = format!("update/{id}");
        self.send(self.authorized(Method::PUT, &path)?.json(update))
            .await
    }

    pub async fn delete_user(&self, id: AdminUserId) -> Result<(), DashboardError> {
        let path = format!("users/{id}");
        let _: DeleteResponse = self.send(self.authorized(Method::DELETE, &path)?).await?;
        Ok(())
    }

    pub async fn fetch_credit_report(
        &self,
        identifier: Option<&str>,
    ) -> Result<CreditReportResponse, DashboardError> {
        let body = CreditReportRequest {
            identifier: identifier.map(str::to_string),
        };
        self.send(self.authorized(Method::POST, "firstcentralreport")?.json(&body))
            .await
    }

    /// Revokes the token server side, then clears the local session even
    /// when the server call fails.
    pub async fn logout(&mut self) -> Result<(), DashboardError> {
        let result = match self.authorized(Method::POST, "logout") {
            Ok(request) => self.send::<LogoutResponse>(request).await.map(|_| ()),
            Err(e) => Err(e),
        };
        self.session.logout_user();
        result
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, DashboardError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| DashboardError::InvalidBaseUrl(e.to_string()))?;
        Ok(self.client.request(method, url))
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, DashboardError> {
        let token = self.session.token().ok_or(DashboardError::NotSignedIn)?;
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, DashboardError> {
        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| DashboardError::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), "api response");

        let envelope: ApiResponse<T> = serde_json::from_slice(&body)
            .map_err(|e| DashboardError::Malformed(e.to_string()))?;
        if let Some(error) = envelope.error {
            return Err(DashboardError::Api {
                status: status.as_u16(),
                code: Some(error.code),
                message: error.message,
            });
        }
        if !status.is_success() || !envelope.success {
            return Err(DashboardError::Api {
                status: status.as_u16(),
                code: None,
                message: status.to_string(),
            });
        }
        envelope
            .data
            .ok_or_else(|| DashboardError::Malformed("response carries no data".to_string()))
    }
}
