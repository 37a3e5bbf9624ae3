use bazaar_core::types::{AuthUser, Envelope, LoginData, LoginRequest, RegisterRequest};
use bazaar_core::validation;
use serde_json::Value;

use crate::error::ClientError;
use crate::pipeline::ApiClient;
use crate::request::ApiRequest;

/// Registration, login and logout.
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/register`. Validated locally before sending.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError> {
        validation::validate_registration(request)?;

        let response = self
            .client
            .fetch(
                ApiRequest::post(&["auth", "register"])
                    .public()
                    .json(serde_json::to_value(request)?),
            )
            .await?;
        tracing::info!(email = %request.email, "Registered account");
        Ok(response)
    }

    /// `POST /auth/login`.
    ///
    /// When the response carries an access token, the access token, refresh
    /// token and `{ email, roles }` are stored together. A response without
    /// one leaves the store untouched and is returned for the caller to
    /// report its `message`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Envelope<LoginData>, ClientError> {
        let request = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        validation::validate_login(&request)?;

        let envelope: Envelope<LoginData> = self
            .client
            .fetch(
                ApiRequest::post(&["auth", "login"])
                    .public()
                    .json(serde_json::to_value(&request)?),
            )
            .await?;

        match &envelope.data {
            Some(LoginData {
                access_token: Some(access_token),
                refresh_token,
                email: returned_email,
                roles,
            }) => {
                let user = AuthUser {
                    email: returned_email.clone().unwrap_or(request.email),
                    roles: roles.clone(),
                };
                self.client
                    .store()
                    .set_login(access_token, refresh_token.as_deref(), &user);
                tracing::info!(email = %user.email, roles = ?user.roles, "Logged in");
            }
            _ => {
                tracing::warn!(
                    message = envelope.message.as_deref().unwrap_or("<none>"),
                    "Login response carried no access token",
                );
            }
        }

        Ok(envelope)
    }

    /// Drop the local session. The backend keeps no logout state.
    pub fn logout(&self) {
        self.client.store().clear_session();
        tracing::info!("Logged out");
    }

    /// The identity cached at login, if any.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.client.store().user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}
