use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::{
    repo::UserRepository,
    repo_types::{NewUser, User},
};

/// Vec-backed repository for tests and database-less runs.
///
/// Lookups scan in insertion order. Emails are not checked for uniqueness
/// here; callers check before creating.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    items: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, data: NewUser) -> anyhow::Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role.unwrap_or_default(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.items.write().await.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "John Doe".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: None,
        }
    }

    #[tokio::test]
    async fn create_fills_id_role_and_timestamp() {
        let repo = InMemoryUserRepository::new();
        let before = OffsetDateTime::now_utc();
        let user = repo.create(new_user("a@example.com")).await.unwrap();
        assert_eq!(user.role, Role::Member);
        assert!(user.created_at >= before);
        assert!(!user.id.is_nil());
    }

    #[tokio::test]
    async fn create_keeps_explicit_role() {
        let repo = InMemoryUserRepository::new();
        let mut data = new_user("admin@example.com");
        data.role = Some(Role::Admin);
        let user = repo.create(data).await.unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn lookups_return_none_when_absent() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookups_find_created_user() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("b@example.com")).await.unwrap();

        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        let by_email = repo.find_by_email("b@example.com").await.unwrap().unwrap();
        assert_eq!(by_id.email, "b@example.com");
        assert_eq!(by_email.id, created.id);
    }

    #[tokio::test]
    async fn duplicates_are_not_rejected_here() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("dup@example.com")).await.unwrap();
        repo.create(new_user("dup@example.com")).await.unwrap();
        assert_eq!(repo.len().await, 2);
    }
}
