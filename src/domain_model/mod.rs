mod admin_user;
mod credit_bureau;

pub use admin_user::*;
pub use credit_bureau::*;
