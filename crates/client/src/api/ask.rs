use bazaar_core::types::AskResponse;
use serde_json::json;

use crate::error::ClientError;
use crate::pipeline::ApiClient;
use crate::request::ApiRequest;

/// Natural-language listing search.
pub struct AskApi {
    client: ApiClient,
}

impl AskApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /ask/search`. Results carry a relevance `score`.
    pub async fn search(&self, query: &str) -> Result<AskResponse, ClientError> {
        self.client
            .fetch(ApiRequest::post(&["ask", "search"]).json(json!({ "query": query })))
            .await
    }
}
