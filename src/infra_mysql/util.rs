use crate::domain_port::*;
use sqlx::mysql::MySqlDatabaseError;

const ER_DUP_ENTRY: u16 = 1062;

pub const EMAIL_UNIQUE_KEY: &str = "uq_admin_user_email";
pub const USERNAME_UNIQUE_KEY: &str = "uq_admin_user_username";

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == ER_DUP_ENTRY;
        }
    }

    false
}

/// Which unique key a duplicate-entry error hit, judged by the key name
/// MySQL puts in the message.
pub fn duplicate_field(err: &sqlx::Error) -> Option<UniqueField> {
    if !is_dup_key(err) {
        return None;
    }
    let message = match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        _ => return None,
    };
    if message.contains(USERNAME_UNIQUE_KEY) {
        Some(UniqueField::Username)
    } else {
        Some(UniqueField::Email)
    }
}

pub fn map_write_error(err: sqlx::Error) -> RepoError {
    match duplicate_field(&err) {
        Some(field) => RepoError::Duplicate(field),
        None => RepoError::Store(err.to_string()),
    }
}
