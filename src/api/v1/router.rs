use super::error::*;
use super::handler;
use crate::application_port::AuthService;
use crate::domain_model::AdminUserId;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

/// Login and update bodies; registration has its own multipart limit.
const JSON_BODY_LIMIT: u64 = 64 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let config = Arc::new(server.api.clone());

    let list_users = warp::path("users")
        .and(warp::path::end())
        .and(warp::get())
        .and(with(server.admin_user_service.clone()))
        .and(with(config.clone()))
        .and_then(handler::list_users);

    let register = warp::path("register")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(server.max_upload_bytes))
        .and(with(server.auth_service.clone()))
        .and_then(handler::register);

    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and(with(config.clone()))
        .and_then(handler::login);

    let delete_user = warp::path!("users" / String)
        .and(warp::delete())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.admin_user_service.clone()))
        .and_then(handler::delete_user);

    let update_user = warp::path!("update" / String)
        .and(warp::put())
        .and(with_verification(server.auth_service.clone()))
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(with(server.admin_user_service.clone()))
        .and(with(config.clone()))
        .and_then(handler::update_user);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::post())
        .and(bearer_token())
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let credit_report = warp::path("firstcentralreport")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_verification(server.auth_service.clone()))
        .and(warp::body::bytes())
        .and(with(server.credit_report_service.clone()))
        .and(with(config))
        .and_then(handler::first_central_report);

    let uploads = warp::path("uploads")
        .and(warp::get())
        .and(warp::fs::dir(server.uploads_dir.clone()));

    list_users
        .or(register)
        .or(login)
        .or(delete_user)
        .or(update_user)
        .or(logout)
        .or(credit_report)
        .or(uploads)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn bearer_token() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(
        |header: String| async move {
            match header.strip_prefix("Bearer ") {
                Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
                _ => Err(reject::custom(ApiErrorCode::InvalidToken)),
            }
        },
    )
}

fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (AdminUserId,), Error = warp::Rejection> + Clone {
    bearer_token().and_then(move |token: String| {
        let auth_service = auth_service.clone();
        async move {
            let user_id = auth_service
                .verify_token(&token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)?;
            Ok::<_, warp::Rejection>(user_id)
        }
    })
}
