//! Client seam for the GreedyBear authentication endpoints. The session store
//! only talks to the backend through [`AuthApi`], so tests and alternative
//! transports can stand in for the `reqwest` client.

pub mod client;
pub mod errors;
pub mod types;

use std::future::Future;

pub use client::HttpAuthApi;
pub use errors::ApiError;
pub use types::{
    AuthenticationCheck, Credentials, LoginReceipt, PasswordChange, Registration, UserAccess,
    UserProfile,
};

pub trait AuthApi: Send + Sync + 'static {
    /// GET the "am I authenticated" endpoint.
    fn check_authentication(
        &self,
    ) -> impl Future<Output = Result<AuthenticationCheck, ApiError>> + Send;

    /// POST credentials; the server sets the session cookie on success.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginReceipt, ApiError>> + Send;

    /// POST to the logout endpoint with an empty body.
    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// GET the current user's profile.
    fn fetch_user_access(&self) -> impl Future<Output = Result<UserAccess, ApiError>> + Send;

    fn change_password(
        &self,
        change: &PasswordChange,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// POST a new account. The server emails a verification link.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn resend_verification(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn request_password_reset(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
