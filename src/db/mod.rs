pub mod remote;

pub use remote::{BackendError, RemoteBackend};

use crate::models::{Profile, Role, SignIn};

/// The two identity-service operations the login flow depends on. The
/// concrete implementation is [`RemoteBackend`]; tests substitute an
/// in-memory fake.
#[async_trait::async_trait]
pub trait AuthApi {
    /// Password sign-in against the identity service.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn, BackendError>;

    /// Look up the single profile row for this role whose foreign key equals
    /// the authenticated identity's id.
    async fn find_profile(&self, role: Role, auth_id: &str) -> Result<Profile, BackendError>;
}
