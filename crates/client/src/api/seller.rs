use bazaar_core::types::{Envelope, Item, ListPayload};
use serde_json::Value;

use crate::error::ClientError;
use crate::pipeline::ApiClient;
use crate::request::ApiRequest;

/// The signed-in seller's own listings and favorites.
pub struct SellerApi {
    client: ApiClient,
}

impl SellerApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /seller/my-items`
    pub async fn get_my_items(&self) -> Result<Vec<Item>, ClientError> {
        let payload: ListPayload<Item> = self
            .client
            .fetch(ApiRequest::get(&["seller", "my-items"]))
            .await?;
        Ok(payload.into_items())
    }

    /// `GET /seller/favorite-items`
    pub async fn get_favorites(&self) -> Result<Vec<Item>, ClientError> {
        let payload: ListPayload<Item> = self
            .client
            .fetch(ApiRequest::get(&["seller", "favorite-items"]))
            .await?;
        Ok(payload.into_items())
    }

    /// `POST /seller/favorite-item/{id}`
    pub async fn add_favorite(&self, item_id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::post(&["seller", "favorite-item", item_id]))
            .await
    }

    /// `DELETE /seller/favorite-item/{id}`
    pub async fn remove_favorite(&self, item_id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::delete(&["seller", "favorite-item", item_id]))
            .await
    }

    /// Whether `item_id` is among the seller's favorites.
    pub async fn is_favorite(&self, item_id: &str) -> Result<bool, ClientError> {
        Ok(self
            .get_favorites()
            .await?
            .iter()
            .any(|item| item.id == item_id))
    }
}
