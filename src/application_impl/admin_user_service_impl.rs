use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

impl From<RepoError> for AdminUserError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::Duplicate(UniqueField::Email) => AdminUserError::EmailTaken,
            RepoError::Duplicate(UniqueField::Username) => AdminUserError::UsernameTaken,
            RepoError::Store(e) => AdminUserError::Store(e),
        }
    }
}

impl From<AuthError> for AdminUserError {
    fn from(error: AuthError) -> Self {
        AdminUserError::InternalError(error.to_string())
    }
}

pub struct RealAdminUserService {
    user_repo: Arc<dyn AdminUserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    photo_store: Arc<dyn PhotoStore>,
}

impl RealAdminUserService {
    pub fn new(
        user_repo: Arc<dyn AdminUserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        photo_store: Arc<dyn PhotoStore>,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            photo_store,
        }
    }

    /// Loads the target, then checks the caller may modify it. A missing
    /// target is `NotFound` whoever asks.
    async fn authorize_modification(
        &self,
        caller: AdminUserId,
        target: AdminUserId,
    ) -> Result<(AdminUser, AdminUser), AdminUserError> {
        let caller_record = self
            .user_repo
            .get(caller)
            .await?
            .ok_or(AdminUserError::Unauthenticated)?;
        let target_record = self
            .user_repo
            .get(target)
            .await?
            .ok_or(AdminUserError::NotFound)?;
        if caller_record.may_modify(target) {
            Ok((caller_record, target_record))
        } else {
            warn!(%caller, %target, "modification refused");
            Err(AdminUserError::Forbidden(target))
        }
    }

    fn validate_update(request: &UpdateAdminUserInput) -> Result<(), AdminUserError> {
        let fields = [
            ("fullName", request.full_name.as_str()),
            ("email", request.email.as_str()),
            ("phone", request.phone.as_str()),
            ("username", request.username.as_str()),
            ("jobRole", request.job_role.as_str()),
            ("userType", request.user_type.as_str()),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AdminUserError::MissingInput(missing.join(", ")))
        }
    }

    /// Keeps the stored hash unless a different password was supplied.
    async fn resolve_password_hash(
        &self,
        current_hash: &str,
        supplied: Option<&str>,
    ) -> Result<String, AdminUserError> {
        let Some(password) = supplied.filter(|p| !p.is_empty()) else {
            return Ok(current_hash.to_string());
        };
        if self
            .credential_hasher
            .verify_password(password, current_hash)
            .await?
        {
            return Ok(current_hash.to_string());
        }
        Ok(self.credential_hasher.hash_password(password).await?)
    }
}

#[async_trait::async_trait]
impl AdminUserService for RealAdminUserService {
    async fn list(&self) -> Result<Vec<AdminUser>, AdminUserError> {
        Ok(self.user_repo.list().await?)
    }

    async fn update(
        &self,
        caller: AdminUserId,
        target: AdminUserId,
        request: UpdateAdminUserInput,
    ) -> Result<AdminUser, AdminUserError> {
        let (caller_record, current) = self.authorize_modification(caller, target).await?;
        Self::validate_update(&request)?;

        let user_type = request.user_type.trim().to_string();
        if user_type != current.user_type && !caller_record.is_administrator() {
            warn!(%caller, %target, "userType change refused");
            return Err(AdminUserError::Forbidden(target));
        }

        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();
        if let Some(owner) = self.user_repo.find_by_email(&email).await? {
            if owner.id != target {
                return Err(AdminUserError::EmailTaken);
            }
        }
        if let Some(owner) = self.user_repo.find_by_username(&username).await? {
            if owner.id != target {
                return Err(AdminUserError::UsernameTaken);
            }
        }

        let password_hash = self
            .resolve_password_hash(&current.password_hash, request.password.as_deref())
            .await?;

        let updated = AdminUser {
            id: current.id,
            full_name: request.full_name.trim().to_string(),
            email,
            phone: request.phone.trim().to_string(),
            username,
            password_hash,
            job_role: request.job_role.trim().to_string(),
            user_type,
            photo: current.photo.clone(),
            created_at: current.created_at,
            updated_at: Utc::now(),
        };
        if !self.user_repo.update(&updated).await? {
            return Err(AdminUserError::NotFound);
        }

        info!(%caller, %target, "admin user updated");
        Ok(updated)
    }

    async fn delete(
        &self,
        caller: AdminUserId,
        target: AdminUserId,
    ) -> Result<(), AdminUserError> {
        let (_, existing) = self.authorize_modification(caller, target).await?;
        if !self.user_repo.delete(target).await? {
            return Err(AdminUserError::NotFound);
        }
        if let Err(e) = self.photo_store.remove(&existing.photo).await {
            warn!(photo = %existing.photo, "removing photo of deleted user: {}", e);
        }

        info!(%caller, %target, "admin user deleted");
        Ok(())
    }
}
