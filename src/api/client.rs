//! `reqwest` implementation of [`AuthApi`]. One client per store keeps the
//! session cookie in its cookie store; request bodies are JSON and error bodies
//! are reduced to a server message before they reach the UI.

use super::{
    errors::ApiError,
    types::{
        AuthenticationCheck, Credentials, EmailRequest, LoginReceipt, LoginRequest,
        PasswordChange, PasswordChangeRequest, Registration, RegistrationRequest, UserAccess,
    },
    AuthApi,
};
use crate::{config::ClientConfig, APP_USER_AGENT};
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

const APPLICATION_JSON: &str = "application/json";

#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    client: Client,
    config: ClientConfig,
}

impl HttpAuthApi {
    /// Builds a cookie-aware client. A timeout is applied only when configured.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true);

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = self.config.url_for(path);
        let builder = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, APPLICATION_JSON);
        (url, builder)
    }

    async fn get_json<T: DeserializeOwned>(&self, name: &'static str, path: &str) -> Result<T, ApiError> {
        let (url, builder) = self.request(Method::GET, path);
        let span = info_span!("greedybear.api", op = name, http.method = "GET", url = %url);
        let response = builder.send().instrument(span).await?;

        handle_json_response(response).await
    }

    async fn post<B: Serialize>(
        &self,
        name: &'static str,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let (url, mut builder) = self.request(Method::POST, path);
        builder = match body {
            Some(body) => builder.json(body),
            None => builder.body(""),
        };
        let span = info_span!("greedybear.api", op = name, http.method = "POST", url = %url);
        let response = builder.send().instrument(span).await?;

        debug!(op = name, status = response.status().as_u16(), "response received");

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

impl AuthApi for HttpAuthApi {
    async fn check_authentication(&self) -> Result<AuthenticationCheck, ApiError> {
        self.get_json("check_authentication", &self.config.endpoints.check_authentication)
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginReceipt, ApiError> {
        let body = LoginRequest::from(credentials);
        let response = self
            .post("login", &self.config.endpoints.login, Some(&body))
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(LoginReceipt {
            status,
            body: parse_optional_body(&text),
        })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post::<Value>("logout", &self.config.endpoints.logout, None)
            .await
            .map(|_| ())
    }

    async fn fetch_user_access(&self) -> Result<UserAccess, ApiError> {
        self.get_json("fetch_user_access", &self.config.endpoints.user_access)
            .await
    }

    async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        let body = PasswordChangeRequest::from(change);
        self.post(
            "change_password",
            &self.config.endpoints.change_password,
            Some(&body),
        )
        .await
        .map(|_| ())
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let body = RegistrationRequest::from(registration);
        self.post("register", &self.config.endpoints.register, Some(&body))
            .await
            .map(|_| ())
    }

    async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        self.post(
            "resend_verification",
            &self.config.endpoints.resend_verification,
            Some(&EmailRequest { email }),
        )
        .await
        .map(|_| ())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        self.post(
            "request_password_reset",
            &self.config.endpoints.request_password_reset,
            Some(&EmailRequest { email }),
        )
        .await
        .map(|_| ())
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    ApiError::from_response(status, &text)
}

fn parse_optional_body(text: &str) -> Value {
    if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
    }
}
