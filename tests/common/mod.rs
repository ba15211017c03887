#![allow(dead_code)]

use loan_backoffice::api;
use loan_backoffice::application_impl::*;
use loan_backoffice::application_port::*;
use loan_backoffice::infra_memory::*;
use loan_backoffice::server::Server;
use serde_json::json;
use std::sync::Arc;

pub const BOUNDARY: &str = "----backoffice-test-boundary";
pub const PASSWORD: &str = "s3cret-pass";

pub struct TestApp {
    pub server: Arc<Server>,
    pub repo: Arc<MemoryAdminUserRepo>,
    pub bureau: Arc<FakeCreditBureauApi>,
    pub codec: Arc<JwtHs256Codec>,
    pub uploads: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_bureau(FakeCreditBureauApi::new().with_report(json!({
            "SubjectList": [{ "ConsumerID": "c-1" }],
            "CreditAccountSummary": { "TotalOutstandingdebt": "0.00" }
        })))
    }

    pub fn with_bureau(bureau: FakeCreditBureauApi) -> Self {
        let repo = Arc::new(MemoryAdminUserRepo::new());
        let hasher = Arc::new(Argon2PasswordHasher::with_params(8, 1, 1).unwrap());
        let codec = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "test.backoffice".to_string(),
            audience: "test-dashboard".to_string(),
            signing_key: b"integration-signing-key".to_vec(),
        }));
        let photos = Arc::new(MemoryPhotoStore::new());
        let bureau = Arc::new(bureau);
        let uploads = tempfile::tempdir().unwrap();

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            repo.clone(),
            hasher.clone(),
            codec.clone(),
            Arc::new(MemoryAuthSessionStore::new()),
            photos.clone(),
            TokenPolicy::default(),
        ));
        let admin_user_service: Arc<dyn AdminUserService> =
            Arc::new(RealAdminUserService::new(repo.clone(), hasher, photos));
        let credit_report_service: Arc<dyn CreditReportService> =
            Arc::new(RealCreditReportService::new(bureau.clone()));

        let server = Arc::new(Server::with_services(
            auth_service,
            admin_user_service,
            credit_report_service,
            api::v1::ApiConfig {
                public_base_url: "http://backoffice.test".to_string(),
                default_identifier: "22471069115".to_string(),
            },
            uploads.path().to_path_buf(),
            1024 * 1024,
        ));

        TestApp {
            server,
            repo,
            bureau,
            codec,
            uploads,
        }
    }
}

pub fn registration_fields<'a>(username: &'a str, email: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("fullName", "Alice Okafor"),
        ("email", email),
        ("phone", "08031234567"),
        ("username", username),
        ("password", PASSWORD),
        ("jobRole", "Credit Analyst"),
        ("userType", "staff"),
    ]
}

pub fn multipart_body(fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
