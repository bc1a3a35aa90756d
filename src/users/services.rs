use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::users::{
    password::{hash_password, verify_password},
    repo::{EmailTaken, UserRepository},
    repo_types::{NewUser, User},
};

/// Outcomes a use case can report besides success.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("E-mail already exists")]
    DuplicateEmail,
    #[error("Invalid Credentials Error")]
    InvalidCredentials,
    #[error("Resource Not Found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase {
    users: Arc<dyn UserRepository>,
}

impl RegisterUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Creates the account. The returned user still carries its hash.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, UserError> {
        // Check-then-create is not atomic; the Postgres unique index is the backstop.
        if self.users.find_by_email(&input.email).await?.is_some() {
            warn!(email = %input.email, "email already registered");
            return Err(UserError::DuplicateEmail);
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                role: None,
            })
            .await
            .map_err(|e| {
                if e.is::<EmailTaken>() {
                    UserError::DuplicateEmail
                } else {
                    UserError::Internal(e)
                }
            })?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }
}

pub struct AuthenticateUseCase {
    users: Arc<dyn UserRepository>,
}

impl AuthenticateUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn execute(&self, email: &str, password: &str) -> Result<User, UserError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(UserError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user authenticated");
        Ok(user)
    }
}

pub struct GetUserProfileUseCase {
    users: Arc<dyn UserRepository>,
}

impl GetUserProfileUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, user_id: Uuid) -> Result<User, UserError> {
        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user),
            None => {
                debug!(%user_id, "profile lookup missed");
                Err(UserError::NotFound)
            }
        }
    }
}
