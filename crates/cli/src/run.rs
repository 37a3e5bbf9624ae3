//! Dispatch of parsed commands to the domain clients.

use std::path::Path;

use anyhow::Context;
use serde_json::{json, Value};

use bazaar_client::api::ImageUpload;
use bazaar_client::ApiClient;
use bazaar_core::filters::ItemFilters;
use bazaar_core::types::{ListingForm, RegisterRequest};

use crate::command::Command;

/// Run `command` and return what should be printed.
pub async fn run(client: &ApiClient, command: Command) -> anyhow::Result<Value> {
    let output = match command {
        Command::Login { email, password } => {
            let envelope = client.auth().login(&email, &password).await?;
            let user = client
                .auth()
                .current_user()
                .filter(|_| envelope.data.as_ref().is_some_and(|d| d.access_token.is_some()));
            match user {
                Some(user) => json!({ "message": envelope.message, "user": user }),
                None => anyhow::bail!(
                    "login failed: {}",
                    envelope.message.as_deref().unwrap_or("no access token returned")
                ),
            }
        }
        Command::Logout => {
            client.auth().logout();
            json!({ "message": "logged out" })
        }
        Command::WhoAmI => match client.auth().current_user() {
            Some(user) => serde_json::to_value(user)?,
            None => anyhow::bail!("not logged in"),
        },
        Command::Register {
            email,
            firstname,
            lastname,
            password,
            phone,
        } => {
            let request = RegisterRequest {
                email,
                firstname,
                lastname,
                password,
                phone,
            };
            client.auth().register(&request).await?
        }
        Command::Items { page, limit } => {
            let filters = ItemFilters {
                page,
                limit,
                ..Default::default()
            };
            let payload = client.items().get_all(&filters).await?;
            let total = payload.total();
            json!({ "total": total, "items": payload.into_items() })
        }
        Command::Item { id } => serde_json::to_value(client.items().get_by_id(&id).await?)?,
        Command::Search { query } => {
            let query = query.join(" ");
            serde_json::to_value(client.items().search(&query).await?.into_items())?
        }
        Command::Ask { query } => {
            let query = query.join(" ");
            serde_json::to_value(client.ask().search(&query).await?)?
        }
        Command::Categories => client.items().get_categories().await?,
        Command::MyItems => serde_json::to_value(client.seller().get_my_items().await?)?,
        Command::Favorites => serde_json::to_value(client.seller().get_favorites().await?)?,
        Command::Favorite { id } => serde_json::to_value(client.seller().add_favorite(&id).await?)?,
        Command::Unfavorite { id } => {
            serde_json::to_value(client.seller().remove_favorite(&id).await?)?
        }
        Command::Post {
            name,
            price,
            category,
            sub_category,
            images,
        } => {
            let form = ListingForm {
                item_name: name,
                item_price: price,
                item_category: category,
                item_sub_category: sub_category,
                ..Default::default()
            };
            let mut uploads = Vec::with_capacity(images.len());
            for path in &images {
                uploads.push(read_image(path).await?);
            }
            client.items().add(&form, &uploads).await?
        }
        Command::Sold { id } => serde_json::to_value(client.items().mark_sold(&id).await?)?,
        Command::Delete { id } => serde_json::to_value(client.items().delete(&id).await?)?,
        Command::AdminItems => serde_json::to_value(client.admin().get_all_items().await?)?,
        Command::AdminUsers => serde_json::to_value(client.admin().get_all_users().await?)?,
        Command::Approve { id } => serde_json::to_value(client.items().approve(&id).await?)?,
        Command::Reject { id } => serde_json::to_value(client.items().reject(&id).await?)?,
        Command::MakeAdmin { id } => serde_json::to_value(client.admin().make_admin(&id).await?)?,
        Command::RemoveAdmin { id } => {
            serde_json::to_value(client.admin().remove_admin(&id).await?)?
        }
        Command::DeleteUser { id } => serde_json::to_value(client.admin().delete_user(&id).await?)?,
    };
    Ok(output)
}

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".into());

    Ok(ImageUpload {
        content_type: image_content_type(path).map(str::to_owned),
        file_name,
        bytes,
    })
}

/// MIME type for common image extensions.
pub fn image_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
