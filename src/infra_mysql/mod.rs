mod admin_user_repo_mysql;

pub use admin_user_repo_mysql::*;

mod util;

pub use util::{EMAIL_UNIQUE_KEY, USERNAME_UNIQUE_KEY};
