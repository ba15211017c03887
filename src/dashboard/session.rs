use crate::api::v1::{AdminUserView, LoginResponse};
use chrono::{DateTime, Utc};

/// Signed-in state of the admin dashboard: the current user and their token.
#[derive(Debug, Clone, Default)]
pub struct DashboardSession {
    user: Option<AdminUserView>,
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_user(&mut self, payload: LoginResponse) {
        self.user = Some(payload.user);
        self.token = Some(payload.token);
        self.expires_at = Some(payload.expires_at);
    }

    pub fn logout_user(&mut self) {
        self.user = None;
        self.token = None;
        self.expires_at = None;
    }

    pub fn user(&self) -> Option<&AdminUserView> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// A session whose token has expired counts as signed out.
    pub fn is_authenticated(&self) -> bool {
        match (&self.token, self.expires_at) {
            (Some(_), Some(expires_at)) => expires_at > Utc::now(),
            (Some(_), None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::AdminUserId;

    fn payload(expires_at: DateTime<Utc>) -> LoginResponse {
        let now = Utc::now();
        LoginResponse {
            user: AdminUserView {
                id: AdminUserId::new(),
                full_name: "Ada Obi".to_string(),
                email: "ada@example.com".to_string(),
                phone: "08030000000".to_string(),
                username: "ada".to_string(),
                job_role: "Credit Officer".to_string(),
                user_type: "admin".to_string(),
                photo: "1-abc-ada.png".to_string(),
                image_url: "http://localhost/uploads/1-abc-ada.png".to_string(),
                created_at: now,
                updated_at: now,
            },
            token: "token-value".to_string(),
            expires_at,
        }
    }

    #[test]
    fn starts_signed_out() {
        let session = DashboardSession::new();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn login_then_logout() {
        let mut session = DashboardSession::new();
        session.login_user(payload(Utc::now() + chrono::Duration::hours(2)));
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("token-value"));
        assert_eq!(session.user().map(|u| u.username.as_str()), Some("ada"));

        session.logout_user();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn expired_token_is_not_authenticated() {
        let mut session = DashboardSession::new();
        session.login_user(payload(Utc::now() - chrono::Duration::seconds(1)));
        assert!(!session.is_authenticated());
    }
}
