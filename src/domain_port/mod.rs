// store

mod auth_session_store;
mod photo_store;

pub use auth_session_store::*;
pub use photo_store::*;

// repo

mod admin_user_repo;

pub use admin_user_repo::*;

// outbound

mod credit_bureau_api;

pub use credit_bureau_api::*;
