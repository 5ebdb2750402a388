use serde::{Deserialize, Serialize};

/// Opaque session bundle issued by the identity service. It is never
/// inspected here, only passed back to the caller unchanged.
pub type Session = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Driver,
    Admin,
}

impl Role {
    /// Record-store table holding profiles for this role.
    pub fn table(&self) -> &'static str {
        match self {
            Role::Student => "students",
            Role::Driver => "drivers",
            Role::Admin => "admins",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Driver => "driver",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "driver" => Ok(Role::Driver),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Identity returned by the identity service on successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of a password sign-in: the authenticated identity (if the service
/// returned one) plus the untouched session bundle.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: Option<AuthUser>,
    pub session: Session,
}

/// Role-partitioned profile row, keyed by the identity service's user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub auth_id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub guardian_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub role: Role,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub session: Session,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_maps_to_its_profile_table() {
        assert_eq!(Role::Student.table(), "students");
        assert_eq!(Role::Driver.table(), "drivers");
        assert_eq!(Role::Admin.table(), "admins");
    }

    #[test]
    fn role_parses_from_lowercase_names() {
        assert_eq!(Role::from_str("student").unwrap(), Role::Student);
        assert_eq!(Role::from_str("driver").unwrap(), Role::Driver);
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
    }

    #[test]
    fn unrecognized_role_is_rejected_not_defaulted() {
        let err = Role::from_str("superuser").unwrap_err();
        assert_eq!(err.to_string(), "unknown role: superuser");
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }

    #[test]
    fn login_request_rejects_unknown_role_at_the_boundary() {
        let body = r#"{"role": "root", "email": "a@x.com", "password": "pw"}"#;
        assert!(serde_json::from_str::<LoginRequest>(body).is_err());
    }

    #[test]
    fn profile_optional_phones_default_to_none() {
        let row = r#"{"auth_id": "U1", "full_name": "Ann", "email": "a@x.com"}"#;
        let profile: Profile = serde_json::from_str(row).unwrap();
        assert!(profile.phone.is_none());
        assert!(profile.guardian_phone.is_none());
    }
}
