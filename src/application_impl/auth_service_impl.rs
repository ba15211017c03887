use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

impl From<RepoError> for AuthError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::Duplicate(UniqueField::Email) => AuthError::EmailTaken,
            RepoError::Duplicate(UniqueField::Username) => AuthError::UsernameTaken,
            RepoError::Store(e) => AuthError::Store(e),
        }
    }
}

#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit memory (KiB), iteration and lane costs.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params = argon2::Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::InternalError(format!("argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        })
    }
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::InternalError(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::InternalError(format!("hash task: {e}")))?
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|e| AuthError::InternalError(format!("invalid PHC hash: {e}")))?;

            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AuthError::InternalError(format!("verify error: {e}"))),
            }
        })
        .await
        .map_err(|e| AuthError::InternalError(format!("verify task: {e}")))?
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // admin user id
    username: String,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String, // session store key
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    fn validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.leeway = 0;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        v
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_access_token(
        &self,
        user: AdminUserId,
        username: &str,
        jti: &str,
        ttl: Duration,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let iat_dt = Utc::now();
        let exp_dt = iat_dt
            + chrono::Duration::from_std(ttl)
                .map_err(|e| AuthError::InternalError(format!("token ttl: {e}")))?;
        let claims = AccessClaims {
            sub: user.to_string(),
            username: username.to_string(),
            exp: exp_dt.timestamp(),
            iat: iat_dt.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: jti.to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn verify_access_token(
        &self,
        token: &AccessToken,
    ) -> Result<TokenVerifyResult, AuthError> {
        let data = decode::<AccessClaims>(
            &token.0,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &self.validation(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;
        let claims = data.claims;
        let user_id = claims
            .sub
            .parse::<AdminUserId>()
            .map_err(|_| AuthError::TokenInvalid)?;
        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(AuthError::TokenInvalid)?;
        Ok(TokenVerifyResult {
            user_id,
            username: claims.username,
            jti: claims.jti,
            expires_at,
        })
    }
}

/// Lifetimes of tokens issued on registration and on login.
#[derive(Debug, Clone, Copy)]
pub struct TokenPolicy {
    pub register_ttl: Duration,
    pub login_ttl: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        TokenPolicy {
            register_ttl: Duration::from_secs(60 * 60),
            login_ttl: Duration::from_secs(2 * 60 * 60),
        }
    }
}

pub struct RealAuthService {
    user_repo: Arc<dyn AdminUserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn AuthSessionStore>,
    photo_store: Arc<dyn PhotoStore>,
    token_policy: TokenPolicy,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn AdminUserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn AuthSessionStore>,
        photo_store: Arc<dyn PhotoStore>,
        token_policy: TokenPolicy,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            token_codec,
            session_store,
            photo_store,
            token_policy,
        }
    }

    fn validate_register(request: &RegisterInput) -> Result<(), AuthError> {
        let fields = [
            ("fullName", request.full_name.as_str()),
            ("email", request.email.as_str()),
            ("phone", request.phone.as_str()),
            ("username", request.username.as_str()),
            ("password", request.password.as_str()),
            ("jobRole", request.job_role.as_str()),
            ("userType", request.user_type.as_str()),
        ];
        let mut missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if request.photo.as_ref().is_none_or(|p| p.bytes.is_empty()) {
            missing.push("photo");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AuthError::MissingInput(missing.join(", ")))
        }
    }

    #[inline]
    fn new_jti() -> String {
        Uuid::new_v4().to_string()
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let secs = (until - Utc::now()).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }

    async fn issue_session(
        &self,
        user_id: AdminUserId,
        username: &str,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let jti = Self::new_jti();
        let (access_token, expires_at) = self
            .token_codec
            .issue_access_token(user_id, username, &jti, ttl)
            .await?;
        self.session_store
            .save(&jti, user_id, Self::ttl_secs(expires_at))
            .await?;
        Ok(IssuedToken {
            access_token,
            expires_at,
        })
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn register(&self, request: RegisterInput) -> Result<RegisterResult, AuthError> {
        Self::validate_register(&request)?;
        let RegisterInput {
            full_name,
            email,
            phone,
            username,
            password,
            job_role,
            user_type,
            photo,
        } = request;
        let email = normalize_email(&email);
        let username = username.trim().to_string();

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;

        let photo = photo.ok_or_else(|| AuthError::MissingInput("photo".to_string()))?;
        let photo_name = self
            .photo_store
            .save(&photo.original_name, &photo.bytes)
            .await
            .map_err(|e| match e {
                PhotoStoreError::InvalidName => AuthError::Photo(e.to_string()),
                PhotoStoreError::Io(io) => AuthError::InternalError(io.to_string()),
            })?;

        let now = Utc::now();
        let user = AdminUser {
            id: AdminUserId::new(),
            full_name: full_name.trim().to_string(),
            email,
            phone: phone.trim().to_string(),
            username,
            password_hash,
            job_role: job_role.trim().to_string(),
            user_type: user_type.trim().to_string(),
            photo: photo_name,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.user_repo.insert(&user).await {
            if let Err(cleanup) = self.photo_store.remove(&user.photo).await {
                warn!(photo = %user.photo, "removing orphaned photo: {}", cleanup);
            }
            return Err(e.into());
        }

        let token = self
            .issue_session(user.id, &user.username, self.token_policy.register_ttl)
            .await?;
        info!(user_id = %user.id, username = %user.username, "admin user registered");

        Ok(RegisterResult {
            user_id: user.id,
            token,
        })
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { username, password } = request;
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingInput("username, password".to_string()));
        }

        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &user.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .issue_session(user.id, &user.username, self.token_policy.login_ttl)
            .await?;
        info!(user_id = %user.id, "admin user logged in");

        Ok(LoginResult { user, token })
    }

    async fn verify_token(&self, token: &str) -> Result<AdminUserId, AuthError> {
        let verify_result = self
            .token_codec
            .verify_access_token(&AccessToken(token.to_string()))
            .await?;

        match self.session_store.lookup(&verify_result.jti).await? {
            Some(owner) if owner == verify_result.user_id => {}
            _ => return Err(AuthError::TokenInvalid),
        }

        if self.user_repo.get(verify_result.user_id).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        Ok(verify_result.user_id)
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let verify_result = self
            .token_codec
            .verify_access_token(&AccessToken(token.to_string()))
            .await?;
        if !self.session_store.revoke(&verify_result.jti).await? {
            return Err(AuthError::TokenInvalid);
        }
        info!(user_id = %verify_result.user_id, "admin user logged out");
        Ok(())
    }
}
