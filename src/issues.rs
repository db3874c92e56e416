//! Operações de issues

use crate::connection::Connection;
use crate::error::{BloomyError, Result};
use crate::response::{handle_response, handle_response_ok};
use crate::transform::{dig, transform_collection, transform_record, NormalizedCollection, NormalizedRecord};
use crate::users::reshape_all;
use crate::validation::{validate_id, validate_title};
use serde_json::json;

/// Operações sobre issues
#[derive(Clone)]
pub struct Issues {
    conn: Connection,
    user_id: i64,
}

impl Issues {
    pub fn new(conn: Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    /// Detalhes de uma issue, com reunião e dono como registros aninhados
    pub async fn details(&self, issue_id: i64) -> Result<NormalizedRecord> {
        validate_id(issue_id, "issue_id")?;

        let response = self.conn.get(&format!("issues/{issue_id}")).await?;
        let body = handle_response(response, "get issue details")?;

        let record = json!({
            "id": dig(&body, &["Id"]),
            "title": dig(&body, &["Name"]),
            "notes_url": dig(&body, &["DetailsUrl"]),
            "created_at": dig(&body, &["CreateTime"]),
            "completed_at": dig(&body, &["CloseTime"]),
            "meeting_details": {
                "id": dig(&body, &["OriginId"]),
                "name": dig(&body, &["Origin"]),
            },
            "owner_details": {
                "id": dig(&body, &["Owner", "Id"]),
                "name": dig(&body, &["Owner", "Name"]),
            },
        });
        Ok(transform_record(&record).unwrap_or_default())
    }

    /// Lista issues por usuário ou por reunião (filtros mutuamente exclusivos)
    pub async fn list(
        &self,
        user_id: Option<i64>,
        meeting_id: Option<i64>,
    ) -> Result<NormalizedCollection> {
        if user_id.is_some() && meeting_id.is_some() {
            return Err(BloomyError::Validation(
                "Please provide either `user_id` or `meeting_id`, not both.".to_string(),
            ));
        }

        let endpoint = if let Some(meeting_id) = meeting_id {
            validate_id(meeting_id, "meeting_id")?;
            format!("L10/{meeting_id}/issues")
        } else {
            let user_id = user_id.unwrap_or(self.user_id);
            validate_id(user_id, "user_id")?;
            format!("issues/users/{user_id}")
        };

        let response = self.conn.get(&endpoint).await?;
        let body = handle_response(response, "list issues")?;

        Ok(transform_collection(&reshape_all(&body, |issue| {
            json!({
                "id": dig(issue, &["Id"]),
                "title": dig(issue, &["Name"]),
                "notes_url": dig(issue, &["DetailsUrl"]),
                "created_at": dig(issue, &["CreateTime"]),
                "meeting_id": dig(issue, &["OriginId"]),
                "meeting_name": dig(issue, &["Origin"]),
            })
        })))
    }

    /// Cria uma issue; o endpoint ecoa o recurso criado
    pub async fn create(
        &self,
        meeting_id: i64,
        title: &str,
        user_id: Option<i64>,
        notes: Option<&str>,
    ) -> Result<NormalizedRecord> {
        validate_title(Some(title), "title")?;
        validate_id(meeting_id, "meeting_id")?;
        let user_id = user_id.unwrap_or(self.user_id);
        validate_id(user_id, "user_id")?;

        let payload = json!({
            "title": title,
            "meetingid": meeting_id,
            "ownerid": user_id,
            "notes": notes,
        });
        let response = self.conn.post("issues/create", &payload).await?;
        let body = handle_response(response, "create issue")?;

        let record = json!({
            "id": dig(&body, &["Id"]),
            "title": dig(&body, &["Name"]),
            "meeting_id": dig(&body, &["OriginId"]),
            "meeting_name": dig(&body, &["Origin"]),
            "user_id": dig(&body, &["Owner", "Id"]),
            "notes_url": dig(&body, &["DetailsUrl"]),
        });
        Ok(transform_record(&record).unwrap_or_default())
    }

    /// Marca uma issue como resolvida
    pub async fn solve(&self, issue_id: i64) -> Result<bool> {
        validate_id(issue_id, "issue_id")?;

        let payload = json!({"complete": true});
        let response = self.conn.post(&format!("issues/{issue_id}/complete"), &payload).await?;
        handle_response_ok(response, "solve issue")
    }
}
