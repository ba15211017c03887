mod admin_user_repo_memory;
mod auth_session_store_memory;
mod credit_bureau_fake;
mod photo_store_memory;

pub use admin_user_repo_memory::*;
pub use auth_session_store_memory::*;
pub use credit_bureau_fake::*;
pub use photo_store_memory::*;
