//! Integration tests for the typed domain clients.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;

use bazaar_client::api::ImageUpload;
use bazaar_client::{ClientError, MemoryTokenStore, TokenStore};
use bazaar_core::error::CoreError;
use bazaar_core::filters::ItemFilters;
use bazaar_core::types::{ListingForm, RegisterRequest};
use common::{client_for, store_with, Backend, CountingNavigator, TestServer};

#[tokio::test]
async fn login_stores_tokens_and_identity_together() {
    let server = TestServer::start(Backend::default()).await;
    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(server.config(), store.clone(), Arc::new(CountingNavigator::default()));

    let envelope = client
        .auth()
        .login("buyer@example.lk", "correct-horse")
        .await
        .unwrap();

    assert_eq!(envelope.success, Some(true));
    assert_eq!(store.access_token().as_deref(), Some("new-token-123"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-xyz"));
    let user = store.user().unwrap();
    assert_eq!(user.email, "buyer@example.lk");
    assert_eq!(user.roles, vec!["USER".to_string()]);
    assert!(client.auth().is_authenticated());
}

#[tokio::test]
async fn failed_login_leaves_store_untouched() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("old-token", Some("old-refresh"));
    let client = client_for(server.config(), store.clone(), Arc::new(CountingNavigator::default()));

    let envelope = client
        .auth()
        .login("buyer@example.lk", "wrong-password")
        .await
        .unwrap();

    assert_eq!(envelope.success, Some(false));
    assert_eq!(envelope.message.as_deref(), Some("Invalid credentials"));
    assert_eq!(store.access_token().as_deref(), Some("old-token"));
    assert_eq!(store.refresh_token().as_deref(), Some("old-refresh"));
}

#[tokio::test]
async fn logout_clears_everything() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("new-token-123", Some("refresh-xyz"));
    let client = client_for(server.config(), store.clone(), Arc::new(CountingNavigator::default()));

    client.auth().logout();

    assert!(store.load().is_empty());
    assert!(!client.auth().is_authenticated());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_sending() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("new-token-123", Some("refresh-xyz"));
    let client = client_for(server.config(), store, Arc::new(CountingNavigator::default()));

    let err = client.auth().login("not-an-email", "pw").await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Validation(_)));

    let err = client
        .auth()
        .register(&RegisterRequest {
            email: "a@b.lk".into(),
            firstname: "A".into(),
            lastname: "Perera".into(),
            password: "secret".into(),
            phone: "0771234567".into(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Validation(ref msg)) if msg.contains("firstname"));

    let form = ListingForm {
        item_name: "Sofa".into(),
        item_price: "20000".into(),
        item_category: "Vehicles".into(),
        item_sub_category: "Furniture".into(),
        ..Default::default()
    };
    let err = client.items().add(&form, &[]).await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Validation(_)));

    assert!(server.backend.seen().is_empty());
}

#[tokio::test]
async fn filters_reach_the_query_string() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("new-token-123", Some("refresh-xyz"));
    let client = client_for(server.config(), store, Arc::new(CountingNavigator::default()));

    let filters = ItemFilters::default()
        .page(2)
        .limit(12)
        .sub_category("Cars")
        .price_range(Some(0), Some(500000));
    let payload = client.items().get_all(&filters).await.unwrap();

    assert_eq!(payload.total(), 37);
    let items = payload.into_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_name, "Bike");

    let seen = server.backend.seen_at("/item/all");
    assert_eq!(
        seen[0].query.as_deref(),
        Some("page=2&limit=12&subCategory=Cars&minPrice=0&maxPrice=500000")
    );
}

#[tokio::test]
async fn single_item_is_unwrapped() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("new-token-123", None);
    let client = client_for(server.config(), store, Arc::new(CountingNavigator::default()));

    let item = client.items().get_by_id("abc123").await.unwrap();

    assert_eq!(item.id, "abc123");
    assert_eq!(item.item_name, "Lamp");
}

#[tokio::test]
async fn search_and_category_browse_encode_parameters() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("new-token-123", None);
    let client = client_for(server.config(), store, Arc::new(CountingNavigator::default()));

    let found = client.items().search("red bike").await.unwrap();
    assert!(found.into_items().is_empty());

    client.items().get_by_category("Electronics", None).await.unwrap();

    let seen = server.backend.seen();
    assert_eq!(seen[0].path, "/api/v1/item");
    assert_eq!(seen[0].query.as_deref(), Some("q=red+bike"));
    assert_eq!(seen[1].path, "/api/v1/item/all");
    assert_eq!(seen[1].query.as_deref(), Some("category=Electronics"));
}

#[tokio::test]
async fn moderation_calls_use_their_routes() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("new-token-123", None);
    let client = client_for(server.config(), store, Arc::new(CountingNavigator::default()));

    client.items().approve("i1").await.unwrap();
    client.items().reject("i2").await.unwrap();
    client.items().mark_sold("i3").await.unwrap();
    client.items().delete("i4").await.unwrap();
    client.admin().make_admin("u1").await.unwrap();
    client.admin().remove_admin("u1").await.unwrap();
    client.admin().delete_user("u2").await.unwrap();
    client.seller().add_favorite("i5").await.unwrap();
    client.seller().remove_favorite("i5").await.unwrap();

    let routes: Vec<String> = server
        .backend
        .seen()
        .into_iter()
        .map(|s| format!("{} {}", s.method, s.path.trim_start_matches("/api/v1")))
        .collect();
    assert_eq!(
        routes,
        vec![
            "PUT /item/approve/i1",
            "PUT /item/reject/i2",
            "PUT /item/sold/i3",
            "DELETE /item/delete/i4",
            "PUT /admin/make-admin/u1",
            "PUT /admin/remove-admin/u1",
            "DELETE /admin/delete-user/u2",
            "POST /seller/favorite-item/i5",
            "DELETE /seller/favorite-item/i5",
        ]
    );
    for seen in server.backend.seen() {
        assert_eq!(seen.authorization.as_deref(), Some("Bearer new-token-123"));
    }
}

#[tokio::test]
async fn ask_search_posts_the_query_and_keeps_scores() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("new-token-123", None);
    let client = client_for(server.config(), store, Arc::new(CountingNavigator::default()));

    let response = client.ask().search("cheap road bike").await.unwrap();

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].id, "i7");
    assert_eq!(response.results[0].score, Some(0.92));
    assert_eq!(response.results[1].item_name, "Bike rack");

    let seen = server.backend.seen_at("/ask/search");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer new-token-123"));
    assert_eq!(
        server.backend.ask_queries.lock().unwrap().as_slice(),
        &[serde_json::json!({ "query": "cheap road bike" })]
    );
}

/// Editing a listing sends the kept image URLs as a JSON array next to the
/// text fields and the new uploads.
#[tokio::test]
async fn update_sends_kept_images_with_new_uploads() {
    let server = TestServer::start(Backend::default()).await;
    let store = store_with("new-token-123", None);
    let client = client_for(server.config(), store, Arc::new(CountingNavigator::default()));

    let form = ListingForm {
        item_name: "Road bike".into(),
        item_price: "42000".into(),
        item_category: "Vehicles".into(),
        item_sub_category: "Bicycles".into(),
        ..Default::default()
    };
    let kept = vec![
        "https://cdn.example.lk/bike-1.jpg".to_string(),
        "https://cdn.example.lk/bike-2.jpg".to_string(),
    ];
    let upload = ImageUpload {
        file_name: "bike-3.jpg".into(),
        content_type: Some("image/jpeg".into()),
        bytes: vec![0xff, 0xd8, 0xff],
    };

    client.items().update("i1", &form, &kept, &[upload]).await.unwrap();

    let seen = server.backend.seen_at("/item/update/i1");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "PUT");

    let fields = server.backend.multipart_fields.lock().unwrap().clone();
    assert_eq!(fields.len(), 1);
    assert!(fields[0].contains(&"existingImages".to_string()), "{fields:?}");
    assert_eq!(fields[0].last().map(String::as_str), Some("images"));

    let text = server.backend.multipart_text.lock().unwrap().clone();
    let existing = text
        .iter()
        .find(|(name, _)| name == "existingImages")
        .map(|(_, value)| value.as_str());
    assert_eq!(
        existing,
        Some(r#"["https://cdn.example.lk/bike-1.jpg","https://cdn.example.lk/bike-2.jpg"]"#)
    );
    assert!(text.contains(&("itemPrice".to_string(), "42000".to_string())), "{text:?}");
}
