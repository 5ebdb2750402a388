use log::{error, warn};

use crate::db::{AuthApi, BackendError};
use crate::models::{AuthResponse, Role, UserResponse};

/// Failure modes of the login flow. Display strings are the user-facing
/// contract; original causes stay attached as sources for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{0}")]
    AuthFailed(String),
    #[error("No auth user returned")]
    MissingAuthUser,
    #[error("Profile not found")]
    ProfileNotFound(#[source] BackendError),
    #[error("Login failed")]
    Unexpected(#[source] BackendError),
}

/// Authenticate against the identity service, then resolve the matching
/// profile row for `role`. The two calls are strictly sequential: the lookup
/// needs the identity id the sign-in produces. Nothing is retried.
pub async fn login_user<A: AuthApi + Sync>(
    api: &A,
    role: Role,
    email: &str,
    password: &str,
) -> Result<AuthResponse, LoginError> {
    let sign_in = match api.sign_in(email, password).await {
        Ok(sign_in) => sign_in,
        Err(BackendError::Auth(message)) => return Err(LoginError::AuthFailed(message)),
        Err(err) => {
            error!("sign-in failed unexpectedly: {err}");
            return Err(LoginError::Unexpected(err));
        }
    };

    let auth_user = sign_in.user.ok_or(LoginError::MissingAuthUser)?;

    let profile = match api.find_profile(role, &auth_user.id).await {
        Ok(profile) => profile,
        Err(err) => {
            warn!("profile lookup failed for {} ({role}): {err}", auth_user.id);
            return Err(LoginError::ProfileNotFound(err));
        }
    };

    Ok(AuthResponse {
        user: UserResponse {
            id: auth_user.id,
            role,
            full_name: profile.full_name,
            email: profile.email,
            phone: profile.phone.or(profile.guardian_phone),
        },
        session: sign_in.session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthUser, Profile, SignIn};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum FakeSignIn {
        Accepted { user: Option<AuthUser> },
        Rejected(String),
        Broken,
    }

    struct FakeApi {
        sign_in: FakeSignIn,
        profiles: Vec<(Role, Profile)>,
        lookups: AtomicUsize,
    }

    impl FakeApi {
        fn new(sign_in: FakeSignIn) -> Self {
            FakeApi {
                sign_in,
                profiles: Vec::new(),
                lookups: AtomicUsize::new(0),
            }
        }

        fn with_profile(mut self, role: Role, profile: Profile) -> Self {
            self.profiles.push((role, profile));
            self
        }
    }

    #[async_trait::async_trait]
    impl AuthApi for FakeApi {
        async fn sign_in(&self, _email: &str, _password: &str) -> Result<SignIn, BackendError> {
            match &self.sign_in {
                FakeSignIn::Accepted { user } => Ok(SignIn {
                    user: user.clone(),
                    session: json!({ "access_token": "tok-1", "token_type": "bearer" }),
                }),
                FakeSignIn::Rejected(message) => Err(BackendError::Auth(message.clone())),
                FakeSignIn::Broken => Err(BackendError::UnexpectedResponse {
                    status: 500,
                    body: "upstream exploded".to_string(),
                }),
            }
        }

        async fn find_profile(&self, role: Role, auth_id: &str) -> Result<Profile, BackendError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let matches: Vec<&Profile> = self
                .profiles
                .iter()
                .filter(|(r, p)| *r == role && p.auth_id == auth_id)
                .map(|(_, p)| p)
                .collect();
            match matches.as_slice() {
                [profile] => Ok((*profile).clone()),
                other => Err(BackendError::RowCount(other.len())),
            }
        }
    }

    fn ann() -> Profile {
        Profile {
            auth_id: "U1".to_string(),
            full_name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            phone: Some("555".to_string()),
            guardian_phone: None,
        }
    }

    fn accepted(id: &str) -> FakeSignIn {
        FakeSignIn::Accepted {
            user: Some(AuthUser {
                id: id.to_string(),
                email: Some("a@x.com".to_string()),
            }),
        }
    }

    #[actix_web::test]
    async fn student_login_resolves_profile_and_session() {
        let api = FakeApi::new(accepted("U1")).with_profile(Role::Student, ann());

        let response = login_user(&api, Role::Student, "a@x.com", "pw1")
            .await
            .unwrap();
        assert_eq!(response.user.id, "U1");
        assert_eq!(response.user.role, Role::Student);
        assert_eq!(response.user.full_name, "Ann");
        assert_eq!(response.user.email, "a@x.com");
        assert_eq!(response.user.phone.as_deref(), Some("555"));
        assert_eq!(response.session["access_token"], "tok-1");
    }

    #[actix_web::test]
    async fn phone_falls_back_to_guardian_phone_then_none() {
        let mut profile = ann();
        profile.phone = None;
        profile.guardian_phone = Some("777".to_string());
        let api = FakeApi::new(accepted("U1")).with_profile(Role::Student, profile);
        let response = login_user(&api, Role::Student, "a@x.com", "pw1")
            .await
            .unwrap();
        assert_eq!(response.user.phone.as_deref(), Some("777"));

        let mut profile = ann();
        profile.phone = None;
        let api = FakeApi::new(accepted("U1")).with_profile(Role::Student, profile);
        let response = login_user(&api, Role::Student, "a@x.com", "pw1")
            .await
            .unwrap();
        assert_eq!(response.user.phone, None);
    }

    #[actix_web::test]
    async fn rejected_credentials_keep_the_service_message_and_skip_lookup() {
        let api = FakeApi::new(FakeSignIn::Rejected("Invalid login credentials".to_string()))
            .with_profile(Role::Student, ann());

        let err = login_user(&api, Role::Student, "a@x.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert_eq!(api.lookups.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn missing_auth_user_is_reported_verbatim() {
        let api = FakeApi::new(FakeSignIn::Accepted { user: None });
        let err = login_user(&api, Role::Student, "a@x.com", "pw1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No auth user returned");
        assert_eq!(api.lookups.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn driver_without_a_profile_row_is_not_found() {
        let api = FakeApi::new(accepted("U1")).with_profile(Role::Student, ann());
        let err = login_user(&api, Role::Driver, "a@x.com", "pw1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile not found");
    }

    #[actix_web::test]
    async fn duplicate_profile_rows_are_not_found() {
        let api = FakeApi::new(accepted("U1"))
            .with_profile(Role::Student, ann())
            .with_profile(Role::Student, ann());
        let err = login_user(&api, Role::Student, "a@x.com", "pw1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile not found");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[actix_web::test]
    async fn transport_failures_collapse_to_login_failed_with_cause() {
        let api = FakeApi::new(FakeSignIn::Broken);
        let err = login_user(&api, Role::Admin, "a@x.com", "pw1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Login failed");
        let source = std::error::Error::source(&err).expect("cause should be chained");
        assert!(source.to_string().contains("status 500"));
    }
}
