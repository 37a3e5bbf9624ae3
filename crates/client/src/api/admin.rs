use bazaar_core::types::{Envelope, Item, ListPayload, UserAccount};
use serde_json::Value;

use crate::error::ClientError;
use crate::pipeline::ApiClient;
use crate::request::ApiRequest;

/// Moderation panel endpoints. The backend enforces the admin roles; these
/// calls fail with 403 for ordinary users.
pub struct AdminApi {
    client: ApiClient,
}

impl AdminApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /admin/items`: every listing regardless of status.
    pub async fn get_all_items(&self) -> Result<Vec<Item>, ClientError> {
        let payload: ListPayload<Item> = self.client.fetch(ApiRequest::get(&["admin", "items"])).await?;
        Ok(payload.into_items())
    }

    /// `GET /admin/users`
    pub async fn get_all_users(&self) -> Result<Vec<UserAccount>, ClientError> {
        let payload: ListPayload<UserAccount> =
            self.client.fetch(ApiRequest::get(&["admin", "users"])).await?;
        Ok(payload.into_items())
    }

    /// `PUT /admin/make-admin/{id}`
    pub async fn make_admin(&self, user_id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::put(&["admin", "make-admin", user_id]))
            .await
    }

    /// `PUT /admin/remove-admin/{id}`
    pub async fn remove_admin(&self, user_id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::put(&["admin", "remove-admin", user_id]))
            .await
    }

    /// `DELETE /admin/delete-user/{id}`
    pub async fn delete_user(&self, user_id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::delete(&["admin", "delete-user", user_id]))
            .await
    }
}
