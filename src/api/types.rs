//! Request and response bodies for the authentication endpoints.

use crate::drafts::RegistrationDraft;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Profile returned by `/api/me/access`. The default value is the empty record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of a successful authentication check.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct AuthenticationCheck {
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserAccess {
    #[serde(default)]
    pub user: UserProfile,
}

/// Login credentials. The password is exposed only while serializing the body.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        }
    }
}

/// Successful login response. The body is whatever JSON the server returned,
/// or `Value::Null` for an empty body.
#[derive(Clone, Debug)]
pub struct LoginReceipt {
    pub status: u16,
    pub body: Value,
}

#[derive(Clone, Debug)]
pub struct PasswordChange {
    pub old_password: SecretString,
    pub new_password: SecretString,
}

impl PasswordChange {
    pub fn new(old_password: impl Into<String>, new_password: impl Into<String>) -> Self {
        Self {
            old_password: SecretString::from(old_password.into()),
            new_password: SecretString::from(new_password.into()),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct PasswordChangeRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

impl<'a> From<&'a PasswordChange> for PasswordChangeRequest<'a> {
    fn from(change: &'a PasswordChange) -> Self {
        Self {
            old_password: change.old_password.expose_secret(),
            new_password: change.new_password.expose_secret(),
        }
    }
}

/// Signup form: the persisted draft fields plus the password, which only
/// lives in memory.
#[derive(Clone, Debug)]
pub struct Registration {
    pub draft: RegistrationDraft,
    pub password: SecretString,
}

impl Registration {
    pub fn new(draft: RegistrationDraft, password: impl Into<String>) -> Self {
        Self {
            draft,
            password: SecretString::from(password.into()),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct RegistrationRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
    username: &'a str,
    email: &'a str,
    password: &'a str,
    profile: RegistrationProfile<'a>,
}

#[derive(Serialize)]
struct RegistrationProfile<'a> {
    company_name: &'a str,
    company_role: &'a str,
    twitter_handle: &'a str,
    discover_from: &'a str,
}

impl<'a> From<&'a Registration> for RegistrationRequest<'a> {
    fn from(registration: &'a Registration) -> Self {
        let draft = &registration.draft;
        Self {
            first_name: &draft.first_name,
            last_name: &draft.last_name,
            username: &draft.username,
            email: &draft.email,
            password: registration.password.expose_secret(),
            profile: RegistrationProfile {
                company_name: &draft.company_name,
                company_role: &draft.company_role,
                twitter_handle: &draft.twitter_handle,
                discover_from: &draft.discover_from,
            },
        }
    }
}

/// Body of the verification resend and password reset requests.
#[derive(Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub(crate) email: &'a str,
}
