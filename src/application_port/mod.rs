mod admin_user_service;
mod auth_service;
mod credit_report_service;

pub use admin_user_service::*;
pub use auth_service::*;
pub use credit_report_service::*;
