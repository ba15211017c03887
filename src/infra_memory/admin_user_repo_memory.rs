use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use tokio::sync::Mutex;

/// In-process user store for the `fake` backend and tests.
#[derive(Default)]
pub struct MemoryAdminUserRepo {
    users: DashMap<AdminUserId, AdminUser>,
    // serializes writes so the email/username uniqueness check and the
    // write happen as one step
    write_lock: Mutex<()>,
}

impl MemoryAdminUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, pred: impl Fn(&AdminUser) -> bool) -> Option<AdminUser> {
        self.users
            .iter()
            .find(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
    }

    fn check_unique(&self, user: &AdminUser) -> Result<(), RepoError> {
        for entry in self.users.iter() {
            let other = entry.value();
            if other.id == user.id {
                continue;
            }
            if other.email == user.email {
                return Err(RepoError::Duplicate(UniqueField::Email));
            }
            if other.username == user.username {
                return Err(RepoError::Duplicate(UniqueField::Username));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AdminUserRepo for MemoryAdminUserRepo {
    async fn list(&self) -> Result<Vec<AdminUser>, RepoError> {
        let mut users: Vec<AdminUser> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn get(&self, user_id: AdminUserId) -> Result<Option<AdminUser>, RepoError> {
        Ok(self.users.get(&user_id).map(|e| e.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, RepoError> {
        Ok(self.find(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, RepoError> {
        Ok(self.find(|u| u.email == email))
    }

    async fn insert(&self, user: &AdminUser) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        if self.users.contains_key(&user.id) {
            return Err(RepoError::Store(format!("duplicate id {}", user.id)));
        }
        self.check_unique(user)?;
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &AdminUser) -> Result<bool, RepoError> {
        let _guard = self.write_lock.lock().await;
        if !self.users.contains_key(&user.id) {
            return Ok(false);
        }
        self.check_unique(user)?;
        self.users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn delete(&self, user_id: AdminUserId) -> Result<bool, RepoError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.users.remove(&user_id).is_some())
    }
}
