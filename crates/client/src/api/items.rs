use bazaar_core::filters::ItemFilters;
use bazaar_core::types::{Envelope, Item, ListPayload, ListingForm, SinglePayload};
use bazaar_core::validation;
use serde_json::Value;

use crate::error::ClientError;
use crate::pipeline::ApiClient;
use crate::request::{ApiRequest, FormPart};

/// Multipart field name the backend reads listing images from.
const IMAGES_FIELD: &str = "images";

/// An image attached to a new or edited listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Listing browse, search, CRUD and moderation endpoints.
pub struct ItemApi {
    client: ApiClient,
}

impl ItemApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /item/all` with the filter query string.
    pub async fn get_all(&self, filters: &ItemFilters) -> Result<ListPayload<Item>, ClientError> {
        self.client
            .fetch(ApiRequest::get(&["item", "all"]).query_pairs(filters.to_query_pairs()))
            .await
    }

    /// `GET /item/{id}`
    pub async fn get_by_id(&self, id: &str) -> Result<Item, ClientError> {
        let payload: SinglePayload<Item> = self.client.fetch(ApiRequest::get(&["item", id])).await?;
        Ok(payload.into_inner())
    }

    /// `GET /item?q=`
    pub async fn search(&self, q: &str) -> Result<ListPayload<Item>, ClientError> {
        self.client
            .fetch(ApiRequest::get(&["item"]).query("q", q))
            .await
    }

    /// `GET /item/{category}/{subCategory}`, or `GET /item/all?category=`
    /// when no sub-category is given.
    pub async fn get_by_category(
        &self,
        category: &str,
        sub_category: Option<&str>,
    ) -> Result<ListPayload<Item>, ClientError> {
        let request = match sub_category {
            Some(sub) => ApiRequest::get(&["item", category, sub]),
            None => ApiRequest::get(&["item", "all"]).query("category", category),
        };
        self.client.fetch(request).await
    }

    /// `GET /item/categories`. Public.
    pub async fn get_categories(&self) -> Result<Value, ClientError> {
        self.client
            .fetch(ApiRequest::get(&["item", "categories"]).public())
            .await
    }

    /// `POST /item/add` as multipart. The form is validated locally first.
    pub async fn add(&self, form: &ListingForm, images: &[ImageUpload]) -> Result<Value, ClientError> {
        validation::validate_listing(form)?;

        let parts = listing_parts(form, None, images);
        let response = self
            .client
            .fetch(ApiRequest::post(&["item", "add"]).multipart(parts))
            .await?;
        tracing::info!(item = %form.item_name, images = images.len(), "Listing posted");
        Ok(response)
    }

    /// `PUT /item/update/{id}` as multipart.
    ///
    /// `existing_images` lists the image URLs to keep; `new_images` are
    /// uploaded alongside.
    pub async fn update(
        &self,
        id: &str,
        form: &ListingForm,
        existing_images: &[String],
        new_images: &[ImageUpload],
    ) -> Result<Value, ClientError> {
        validation::validate_listing(form)?;

        let parts = listing_parts(form, Some(existing_images), new_images);
        let response = self
            .client
            .fetch(ApiRequest::put(&["item", "update", id]).multipart(parts))
            .await?;
        tracing::info!(item_id = id, "Listing updated");
        Ok(response)
    }

    /// `DELETE /item/delete/{id}`
    pub async fn delete(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::delete(&["item", "delete", id]))
            .await
    }

    /// `PUT /item/approve/{id}`
    pub async fn approve(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::put(&["item", "approve", id]))
            .await
    }

    /// `PUT /item/reject/{id}`
    pub async fn reject(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::put(&["item", "reject", id]))
            .await
    }

    /// `PUT /item/sold/{id}`
    pub async fn mark_sold(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.client
            .fetch(ApiRequest::put(&["item", "sold", id]))
            .await
    }
}

fn listing_parts(
    form: &ListingForm,
    existing_images: Option<&[String]>,
    images: &[ImageUpload],
) -> Vec<FormPart> {
    let mut parts: Vec<FormPart> = form
        .fields()
        .into_iter()
        .map(|(name, value)| FormPart::text(name, value))
        .collect();

    if let Some(existing) = existing_images {
        // Serializing a slice of strings cannot fail.
        let encoded = serde_json::to_string(existing).unwrap_or_else(|_| "[]".into());
        parts.push(FormPart::text("existingImages", encoded));
    }

    parts.extend(images.iter().map(|image| {
        FormPart::file(
            IMAGES_FIELD,
            image.file_name.clone(),
            image.content_type.clone(),
            image.bytes.clone(),
        )
    }));

    parts
}
