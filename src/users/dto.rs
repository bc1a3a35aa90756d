use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::Issues,
    extract::Validate,
    users::repo_types::{Role, User},
};

pub const MIN_PASSWORD_CHARS: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str, issues: &mut Issues) {
    if !is_valid_email(email) {
        issues
            .entry("email".into())
            .or_default()
            .push("Invalid email".into());
    }
}

fn check_password(password: &str, issues: &mut Issues) {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        issues
            .entry("password".into())
            .or_default()
            .push(format!("must contain at least {MIN_PASSWORD_CHARS} characters"));
    }
}

fn finish(issues: Issues) -> Result<(), Issues> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Issues> {
        let mut issues = Issues::new();
        check_email(self.email.trim(), &mut issues);
        check_password(&self.password, &mut issues);
        finish(issues)
    }
}

/// Body of `POST /users/sessions`.
#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

impl Validate for AuthenticateRequest {
    fn validate(&self) -> Result<(), Issues> {
        let mut issues = Issues::new();
        check_email(self.email.trim(), &mut issues);
        check_password(&self.password, &mut issues);
        finish(issues)
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public part of the user; never includes the password hash.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        }
    }
}
