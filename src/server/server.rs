use crate::api::v1::ApiConfig;
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_fs::*;
use crate::infra_http::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::{MySql, Pool};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub admin_user_service: Arc<dyn AdminUserService>,
    pub credit_report_service: Arc<dyn CreditReportService>,
    pub api: ApiConfig,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: u64,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let pool = match settings.users.backend.as_str() {
            "fake" => None,
            "real" => {
                let dsn = settings
                    .users
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("users.mysql_dsn is required for the real backend"))?;
                Some(Pool::<MySql>::connect(dsn).await?)
            }
            other => return Err(anyhow!("Unknown users backend: {}", other)),
        };
        let user_repo: Arc<dyn AdminUserRepo> = match &pool {
            Some(pool) => Arc::new(MySqlAdminUserRepo::new(pool.clone())),
            None => Arc::new(MemoryAdminUserRepo::new()),
        };

        let session_store: Arc<dyn AuthSessionStore> = match settings.sessions.backend.as_str() {
            "fake" => Arc::new(MemoryAuthSessionStore::new()),
            "real" => {
                let dsn = settings
                    .sessions
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("sessions.redis_dsn is required for the real backend"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisAuthSessionStore::new(
                    redis_manager,
                    settings.sessions.prefix.clone(),
                ))
            }
            other => return Err(anyhow!("Unknown sessions backend: {}", other)),
        };

        let bureau: Arc<dyn CreditBureauApi> = match settings.credit_bureau.backend.as_str() {
            "fake" => Arc::new(FakeCreditBureauApi::new()),
            "real" => {
                let cfg = &settings.credit_bureau;
                Arc::new(FirstCentralHttpApi::new(FirstCentralConfig {
                    base_url: cfg.base_url.clone(),
                    username: cfg.username.clone(),
                    password: cfg.password.clone(),
                    timeout: Duration::from_secs(cfg.timeout_secs),
                    login_path: path_or(&cfg.login_path, DEFAULT_LOGIN_PATH),
                    match_path: path_or(&cfg.match_path, DEFAULT_MATCH_PATH),
                    report_path: path_or(&cfg.report_path, DEFAULT_REPORT_PATH),
                    enquiry_reason: cfg.enquiry_reason.clone(),
                    product_id: cfg.product_id.clone(),
                })?)
            }
            other => return Err(anyhow!("Unknown credit bureau backend: {}", other)),
        };

        let uploads_dir = PathBuf::from(&settings.uploads.dir);
        let photo_store: Arc<dyn PhotoStore> = Arc::new(FsPhotoStore::try_new(&uploads_dir).await?);

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher::new());
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            signing_key: settings.signing_key()?,
        }));
        let token_policy = TokenPolicy {
            register_ttl: Duration::from_secs(settings.auth.register_token_ttl_secs),
            login_ttl: Duration::from_secs(settings.auth.login_token_ttl_secs),
        };

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            user_repo.clone(),
            credential_hasher.clone(),
            token_codec,
            session_store,
            photo_store.clone(),
            token_policy,
        ));
        let admin_user_service: Arc<dyn AdminUserService> = Arc::new(RealAdminUserService::new(
            user_repo,
            credential_hasher,
            photo_store,
        ));
        let credit_report_service: Arc<dyn CreditReportService> =
            Arc::new(RealCreditReportService::new(bureau));

        let api = ApiConfig {
            public_base_url: settings.uploads.public_base_url.clone(),
            default_identifier: settings.credit_bureau.default_identifier.clone(),
        };

        info!(
            users = %settings.users.backend,
            sessions = %settings.sessions.backend,
            credit_bureau = %settings.credit_bureau.backend,
            "server started"
        );

        Ok(Self {
            auth_service,
            admin_user_service,
            credit_report_service,
            api,
            uploads_dir,
            max_upload_bytes: settings.uploads.max_upload_bytes,
            pool,
        })
    }

    /// Assembles a server from already-built services, without a database pool.
    pub fn with_services(
        auth_service: Arc<dyn AuthService>,
        admin_user_service: Arc<dyn AdminUserService>,
        credit_report_service: Arc<dyn CreditReportService>,
        api: ApiConfig,
        uploads_dir: PathBuf,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            auth_service,
            admin_user_service,
            credit_report_service,
            api,
            uploads_dir,
            max_upload_bytes,
            pool: None,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

fn path_or(configured: &Option<String>, default: &str) -> String {
    configured.as_deref().unwrap_or(default).to_string()
}
