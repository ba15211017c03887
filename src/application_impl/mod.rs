mod admin_user_service_impl;
mod auth_service_impl;
mod credit_report_service_impl;

pub use admin_user_service_impl::*;
pub use auth_service_impl::*;
pub use credit_report_service_impl::*;
