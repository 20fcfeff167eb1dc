//! # Account Commands
//!
//! Registration and credential checks. How credentials travel (headers,
//! tokens, sessions) is the caller's business; these commands only see
//! plain usernames and passwords.

use chrono::{DateTime, Utc};
use rentline_core::policy::Actor;
use rentline_core::validation::{parse_role, validate_password, validate_username};
use rentline_core::{CoreError, Role, User};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::error::ApiResult;
use crate::service::RentalService;

/// Registration input. All fields optional so missing ones are reported
/// as `MISSING_FIELDS` rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    /// `customer` (default, alias `user`) or `merchant`
    pub role: Option<String>,
}

impl RegisterRequest {
    pub fn new(username: &str, password: &str, role: Option<&str>) -> Self {
        RegisterRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            role: role.map(str::to_string),
        }
    }
}

/// User DTO. The password hash never leaves the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto {
            id: u.id,
            username: u.username,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

/// An authenticated user and the actor to pass to other commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: UserDto,
    pub actor: Actor,
}

impl RentalService {
    /// Registers a new account.
    ///
    /// ## Errors
    /// * `MISSING_FIELDS` - username or password absent
    /// * `INVALID_ROLE` - role other than customer / user / merchant
    /// * `VALIDATION_ERROR` - password too short, username with spaces, ...
    /// * `USERNAME_TAKEN` - name already registered
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<UserDto> {
        let username = validate_username(request.username.as_deref().unwrap_or_default())?;
        let password = request.password.as_deref().unwrap_or_default();
        validate_password(password)?;
        let role = parse_role(request.role.as_deref())?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash: hash_password(password)?,
            role,
            created_at: self.booking.now(),
        };

        self.db.users().insert(&user).await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");

        Ok(user.into())
    }

    /// Checks a username / password pair.
    ///
    /// Unknown users and wrong passwords both return `INVALID_CREDENTIALS`.
    pub async fn authenticate(&self, username: &str, password: &str) -> ApiResult<Session> {
        let user = self.db.users().get_by_username(username.trim()).await?;

        match user {
            Some(user) if verify_password(password, &user.password_hash) => {
                let actor = Actor::principal(&user.id, user.role);
                Ok(Session {
                    user: user.into(),
                    actor,
                })
            }
            _ => {
                warn!(username = %username, "Authentication failed");
                Err(CoreError::InvalidCredentials.into())
            }
        }
    }
}
