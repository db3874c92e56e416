//! Operações de headlines

use crate::connection::Connection;
use crate::error::Result;
use crate::response::{handle_response, handle_response_ok};
use crate::transform::{dig, transform_collection, transform_record, NormalizedCollection, NormalizedRecord};
use crate::users::reshape_all;
use crate::validation::{validate_id, validate_title};
use serde_json::{json, Value};

/// Operações sobre headlines
#[derive(Clone)]
pub struct Headlines {
    conn: Connection,
    user_id: i64,
}

impl Headlines {
    pub fn new(conn: Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    /// Cria uma headline em uma reunião; o endpoint ecoa o recurso criado
    pub async fn create(
        &self,
        meeting_id: i64,
        title: &str,
        owner_id: Option<i64>,
        notes: Option<&str>,
    ) -> Result<NormalizedRecord> {
        validate_title(Some(title), "title")?;
        validate_id(meeting_id, "meeting_id")?;
        let owner_id = owner_id.unwrap_or(self.user_id);
        validate_id(owner_id, "owner_id")?;

        let payload = json!({
            "title": title,
            "ownerId": owner_id,
            "notes": notes,
        });
        let response = self.conn.post(&format!("L10/{meeting_id}/headlines"), &payload).await?;
        let body = handle_response(response, "create headline")?;

        let record = json!({
            "id": dig(&body, &["Id"]),
            "title": dig(&body, &["Title"]),
            "owner_id": dig(&body, &["OwnerId"]),
            "notes_url": dig(&body, &["DetailsUrl"]),
        });
        Ok(transform_record(&record).unwrap_or_default())
    }

    /// Atualiza o título de uma headline
    pub async fn update(&self, headline_id: i64, title: &str) -> Result<bool> {
        validate_id(headline_id, "headline_id")?;
        validate_title(Some(title), "title")?;

        let payload = json!({"title": title});
        let response = self.conn.put(&format!("headline/{headline_id}"), &payload).await?;
        handle_response_ok(response, "update headline")
    }

    /// Detalhes de uma headline, incluindo a reunião de origem
    pub async fn details(&self, headline_id: i64) -> Result<NormalizedRecord> {
        validate_id(headline_id, "headline_id")?;

        let response = self
            .conn
            .get(&format!("headline/{headline_id}?Include_Origin=true"))
            .await?;
        let body = handle_response(response, "get headline details")?;

        Ok(transform_record(&reshape_headline(&body)).unwrap_or_default())
    }

    /// Headlines de um usuário
    pub async fn list(&self, user_id: Option<i64>) -> Result<NormalizedCollection> {
        let user_id = user_id.unwrap_or(self.user_id);
        validate_id(user_id, "user_id")?;

        let response = self.conn.get(&format!("headline/users/{user_id}")).await?;
        let body = handle_response(response, "list headlines")?;

        Ok(transform_collection(&reshape_all(&body, reshape_headline)))
    }

    /// Remove uma headline de uma reunião
    pub async fn delete(&self, meeting_id: i64, headline_id: i64) -> Result<bool> {
        validate_id(meeting_id, "meeting_id")?;
        validate_id(headline_id, "headline_id")?;

        let response = self
            .conn
            .delete(&format!("L10/{meeting_id}/headlines/{headline_id}"))
            .await?;
        handle_response_ok(response, "delete headline")
    }
}

fn reshape_headline(headline: &Value) -> Value {
    json!({
        "id": dig(headline, &["Id"]),
        "title": dig(headline, &["Name"]),
        "notes_url": dig(headline, &["DetailsUrl"]),
        "meeting_details": {
            "id": dig(headline, &["OriginId"]),
            "name": dig(headline, &["Origin"]),
        },
        "owner_details": {
            "id": dig(headline, &["Owner", "Id"]),
            "name": dig(headline, &["Owner", "Name"]),
        },
        "archived": dig(headline, &["Archived"]),
        "created_at": dig(headline, &["CreateTime"]),
        "closed_at": dig(headline, &["CloseTime"]),
    })
}
