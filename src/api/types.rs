//! Request and response types for the dashboard API. Payloads carrying
//! passwords or reset tokens redact them from `Debug` output so they can never
//! reach the logs by accident.

use serde::{Deserialize, Serialize};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => formatter.write_str("user"),
            Self::Admin => formatter.write_str("admin"),
        }
    }
}

/// Identity record owned by the server; the client only holds cached copies.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    /// Legacy records carry no surname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Partial user sent to `PUT /users/{id}`; only present fields are serialized.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.surname.is_none() && self.email.is_none() && self.role.is_none()
    }

    /// Applies the present fields to a cached user.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(surname) = &self.surname {
            user.surname = Some(surname.clone());
        }
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RefreshRequest")
            .field("refresh_token", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
    pub reset_token: String,
}

impl fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .field("new_password", &REDACTED)
            .field("reset_token", &REDACTED)
            .finish()
    }
}

/// `data` of a successful login.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginResponse")
            .field("token", &REDACTED)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TokenResponse")
            .field("token", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceStatus {
    #[default]
    Up,
    Down,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => formatter.write_str("UP"),
            Self::Down => formatter.write_str("DOWN"),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: ServiceStatus,
    #[serde(default)]
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_defaults_role_and_tolerates_missing_surname() -> Result<(), serde_json::Error> {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "A",
            "email": "a@b.com"
        }))?;
        assert_eq!(user.id, Some(1));
        assert_eq!(user.surname, None);
        assert_eq!(user.role, Role::User);
        Ok(())
    }

    #[test]
    fn new_user_omits_id_on_the_wire() -> Result<(), serde_json::Error> {
        let user = User {
            id: None,
            name: "Ada".to_string(),
            surname: Some("Lovelace".to_string()),
            email: "ada@example.com".to_string(),
            role: Role::Admin,
        };
        let value = serde_json::to_value(&user)?;
        assert_eq!(
            value,
            json!({
                "name": "Ada",
                "surname": "Lovelace",
                "email": "ada@example.com",
                "role": "admin"
            })
        );
        Ok(())
    }

    #[test]
    fn camel_case_request_payloads() -> Result<(), serde_json::Error> {
        let reset = ResetPasswordRequest {
            email: "a@b.com".to_string(),
            new_password: "new".to_string(),
            reset_token: "rt".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&reset)?,
            json!({"email": "a@b.com", "newPassword": "new", "resetToken": "rt"})
        );

        let refresh = RefreshRequest {
            refresh_token: "r1".to_string(),
        };
        assert_eq!(serde_json::to_value(&refresh)?, json!({"refreshToken": "r1"}));
        Ok(())
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let login = LoginRequest {
            email: "a@b.com".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{login:?}");
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("hunter2"));

        let response = LoginResponse {
            token: "T1".to_string(),
            user: User {
                id: Some(1),
                name: "A".to_string(),
                surname: None,
                email: "a@b.com".to_string(),
                role: Role::User,
            },
        };
        assert!(!format!("{response:?}").contains("T1"));
    }

    #[test]
    fn user_update_serializes_only_present_fields() -> Result<(), serde_json::Error> {
        let update = UserUpdate {
            role: Some(Role::Admin),
            ..UserUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update)?, json!({"role": "admin"}));
        assert!(!update.is_empty());
        assert!(UserUpdate::default().is_empty());
        Ok(())
    }

    #[test]
    fn health_status_uses_uppercase_wire_values() -> Result<(), serde_json::Error> {
        let health: HealthStatus =
            serde_json::from_value(json!({"status": "DOWN", "timestamp": "2024-01-01T00:00:00Z"}))?;
        assert_eq!(health.status, ServiceStatus::Down);
        assert_eq!(health.status.to_string(), "DOWN");
        Ok(())
    }
}
