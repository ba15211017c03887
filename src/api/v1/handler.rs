use super::error::*;
use crate::application_port::*;
use crate::domain_model::{AdminUser, AdminUserId, ConsumerMatch};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::{self, Buf, reject};

const CREDIT_REPORT_MESSAGE: &str = "First central api called successfully";

/// Values the handlers need besides the services.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Prefix for `imageUrl`, e.g. `https://backoffice.example.com`.
    pub public_base_url: String,
    pub default_identifier: String,
}

impl ApiConfig {
    fn image_url(&self, photo: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.public_base_url.trim_end_matches('/'),
            photo
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Public projection of an admin user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    pub id: AdminUserId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub job_role: String,
    pub user_type: String,
    pub photo: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUserView {
    fn new(user: AdminUser, config: &ApiConfig) -> Self {
        let image_url = config.image_url(&user.photo);
        AdminUserView {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            username: user.username,
            job_role: user.job_role,
            user_type: user.user_type,
            photo: user.photo,
            image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<AdminUserView>,
}

pub async fn list_users(
    admin_user_service: Arc<dyn AdminUserService>,
    config: Arc<ApiConfig>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let users = admin_user_service
        .list()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let users = users
        .into_iter()
        .map(|user| AdminUserView::new(user, &config))
        .collect();
    Ok(warp::reply::json(&ApiResponse::ok(UserListResponse { users })))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: AdminUserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn register(
    form: FormData,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = read_register_form(form).await.map_err(reject::custom)?;

    let result = auth_service
        .register(input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = RegisterResponse {
        id: result.user_id,
        token: result.token.access_token.0,
        expires_at: result.token.expires_at,
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(response)),
        StatusCode::CREATED,
    ))
}

/// Collects the text fields and the `photo` file of a registration form.
/// Unknown parts are skipped; absent fields are left blank for validation.
async fn read_register_form(form: FormData) -> Result<RegisterInput, ApiErrorCode> {
    let mut input = RegisterInput {
        full_name: String::new(),
        email: String::new(),
        phone: String::new(),
        username: String::new(),
        password: String::new(),
        job_role: String::new(),
        user_type: String::new(),
        photo: None,
    };

    let mut form = std::pin::pin!(form);
    while let Some(part) = form.try_next().await.map_err(|e| {
        debug!("reading multipart form: {}", e);
        ApiErrorCode::InvalidInput
    })? {
        let name = part.name().to_string();
        if name == "photo" {
            let original_name = part.filename().unwrap_or("photo").to_string();
            let bytes = read_part(part).await?;
            input.photo = Some(PhotoUpload {
                original_name,
                bytes,
            });
            continue;
        }

        let field = match name.as_str() {
            "fullName" => &mut input.full_name,
            "email" => &mut input.email,
            "phone" => &mut input.phone,
            "username" => &mut input.username,
            "password" => &mut input.password,
            "jobRole" => &mut input.job_role,
            "userType" => &mut input.user_type,
            _ => continue,
        };
        let bytes = read_part(part).await?;
        *field = String::from_utf8(bytes).map_err(|_| ApiErrorCode::InvalidInput)?;
    }

    Ok(input)
}

async fn read_part(part: Part) -> Result<Vec<u8>, ApiErrorCode> {
    let mut stream = std::pin::pin!(part.stream());
    let mut bytes = Vec::new();
    while let Some(mut buf) = stream.try_next().await.map_err(|e| {
        debug!("reading multipart part: {}", e);
        ApiErrorCode::InvalidInput
    })? {
        while buf.has_remaining() {
            let chunk = buf.chunk();
            let len = chunk.len();
            bytes.extend_from_slice(chunk);
            buf.advance(len);
        }
    }
    Ok(bytes)
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: AdminUserView,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
    config: Arc<ApiConfig>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let login_input = LoginInput {
        username: body.username,
        password: body.password,
    };
    let login_result = auth_service
        .login(login_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let login_response = LoginResponse {
        user: AdminUserView::new(login_result.user, &config),
        token: login_result.token.access_token.0,
        expires_at: login_result.token.expires_at,
    };
    Ok(warp::reply::json(&ApiResponse::ok(login_response)))
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub password: Option<String>,
    pub job_role: String,
    pub user_type: String,
}

pub async fn update_user(
    id: String,
    caller: AdminUserId,
    body: UpdateRequest,
    admin_user_service: Arc<dyn AdminUserService>,
    config: Arc<ApiConfig>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let target = parse_user_id(&id).map_err(reject::custom)?;
    let input = UpdateAdminUserInput {
        full_name: body.full_name,
        email: body.email,
        phone: body.phone,
        username: body.username,
        password: body.password,
        job_role: body.job_role,
        user_type: body.user_type,
    };

    let updated = admin_user_service
        .update(caller, target, input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(AdminUserView::new(
        updated, &config,
    ))))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: AdminUserId,
}

pub async fn delete_user(
    id: String,
    caller: AdminUserId,
    admin_user_service: Arc<dyn AdminUserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let target = parse_user_id(&id).map_err(reject::custom)?;
    admin_user_service
        .delete(caller, target)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(DeleteResponse {
        id: target,
    })))
}

/// Ids that do not parse cannot name a stored user.
fn parse_user_id(id: &str) -> Result<AdminUserId, ApiErrorCode> {
    id.parse::<AdminUserId>().map_err(|_| ApiErrorCode::NotFound)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub logged_out: bool,
}

pub async fn logout(
    token: String,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .logout(&token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse {
        logged_out: true,
    })))
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditReportRequest {
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerView {
    pub matching_engine_id: String,
    pub enquiry_id: String,
    pub consumer_id: String,
}

impl From<ConsumerMatch> for ConsumerView {
    fn from(consumer: ConsumerMatch) -> Self {
        ConsumerView {
            matching_engine_id: consumer.matching_engine_id,
            enquiry_id: consumer.enquiry_id,
            consumer_id: consumer.consumer_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreditReportResponse {
    pub message: String,
    pub consumer: ConsumerView,
    pub data: serde_json::Value,
}

/// The body is optional; an empty body uses the configured identifier.
pub async fn first_central_report(
    caller: AdminUserId,
    body: warp::hyper::body::Bytes,
    credit_report_service: Arc<dyn CreditReportService>,
    config: Arc<ApiConfig>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request: CreditReportRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreditReportRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| ApiErrorCode::InvalidInput)
            .map_err(reject::custom)?
    };
    let identifier = request
        .identifier
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| config.default_identifier.clone());
    debug!(%caller, "credit report requested");

    let result = credit_report_service
        .fetch_credit_report(&identifier)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = CreditReportResponse {
        message: CREDIT_REPORT_MESSAGE.to_string(),
        consumer: result.consumer.into(),
        data: result.report.0,
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            public_base_url: "http://localhost:3030/".to_string(),
            default_identifier: "22471069115".to_string(),
        }
    }

    #[test]
    fn image_url_joins_base_and_photo() {
        assert_eq!(
            config().image_url("1-abc-me.png"),
            "http://localhost:3030/uploads/1-abc-me.png"
        );
    }

    #[test]
    fn user_view_uses_camel_case_and_omits_the_hash() {
        let now = Utc::now();
        let user = AdminUser {
            id: AdminUserId::new(),
            full_name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            phone: "08030000000".to_string(),
            username: "ada".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            job_role: "Credit Officer".to_string(),
            user_type: "admin".to_string(),
            photo: "1-abc-ada.png".to_string(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(AdminUserView::new(user, &config())).unwrap();

        assert_eq!(json["fullName"], "Ada Obi");
        assert_eq!(json["jobRole"], "Credit Officer");
        assert_eq!(json["imageUrl"], "http://localhost:3030/uploads/1-abc-ada.png");
        assert!(!json.to_string().contains("argon2id"));
    }

    #[test]
    fn malformed_ids_are_not_found() {
        assert_eq!(parse_user_id("42"), Err(ApiErrorCode::NotFound));
        assert!(parse_user_id(&AdminUserId::new().to_string()).is_ok());
    }
}
