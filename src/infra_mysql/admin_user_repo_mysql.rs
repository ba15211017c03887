use super::util::map_write_error;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const SELECT_COLUMNS: &str = r#"
SELECT user_id, full_name, email, phone, username, password_hash,
       job_role, user_type, photo, created_at, updated_at
FROM admin_user
"#;

pub struct MySqlAdminUserRepo {
    pool: MySqlPool,
}

impl MySqlAdminUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlAdminUserRepo { pool }
    }

    fn row_to_user(row: MySqlRow) -> Result<AdminUser, RepoError> {
        let store = |e: sqlx::Error| RepoError::Store(e.to_string());
        Ok(AdminUser {
            id: row.try_get::<AdminUserId, _>("user_id").map_err(store)?,
            full_name: row.try_get("full_name").map_err(store)?,
            email: row.try_get("email").map_err(store)?,
            phone: row.try_get("phone").map_err(store)?,
            username: row.try_get("username").map_err(store)?,
            password_hash: row.try_get("password_hash").map_err(store)?,
            job_role: row.try_get("job_role").map_err(store)?,
            user_type: row.try_get("user_type").map_err(store)?,
            photo: row.try_get("photo").map_err(store)?,
            created_at: row.try_get("created_at").map_err(store)?,
            updated_at: row.try_get("updated_at").map_err(store)?,
        })
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        bind: &str,
    ) -> Result<Option<AdminUser>, RepoError> {
        let sql = format!("{SELECT_COLUMNS} WHERE {clause} = ?");
        let row_opt: Option<MySqlRow> = sqlx::query(&sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Store(format!("query admin_user by {clause}: {e}")))?;

        row_opt.map(Self::row_to_user).transpose()
    }
}

#[async_trait::async_trait]
impl AdminUserRepo for MySqlAdminUserRepo {
    async fn list(&self) -> Result<Vec<AdminUser>, RepoError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at, user_id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Store(e.to_string()))?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn get(&self, user_id: AdminUserId) -> Result<Option<AdminUser>, RepoError> {
        let sql = format!("{SELECT_COLUMNS} WHERE user_id = ?");
        let row_opt: Option<MySqlRow> = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Store(format!("query admin_user by id: {e}")))?;

        row_opt.map(Self::row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, RepoError> {
        self.fetch_one_where("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, RepoError> {
        self.fetch_one_where("email", email).await
    }

    async fn insert(&self, user: &AdminUser) -> Result<(), RepoError> {
        sqlx::query(
            r#"
INSERT INTO admin_user (
    user_id, full_name, email, phone, username, password_hash,
    job_role, user_type, photo, created_at, updated_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.job_role)
        .bind(&user.user_type)
        .bind(&user.photo)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn update(&self, user: &AdminUser) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
UPDATE admin_user
SET full_name = ?, email = ?, phone = ?, username = ?, password_hash = ?,
    job_role = ?, user_type = ?, photo = ?, updated_at = ?
WHERE user_id = ?
"#,
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.job_role)
        .bind(&user.user_type)
        .bind(&user.photo)
        .bind(user.updated_at)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        // MySQL reports 0 affected rows when nothing changed
        Ok(self.get(user.id).await?.is_some())
    }

    async fn delete(&self, user_id: AdminUserId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM admin_user WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Store(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
