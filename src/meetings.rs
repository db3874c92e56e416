//! Operações de reuniões (Level 10)
//!
//! `details` é a única operação composta de leitura: agrega listagem,
//! participantes, issues, todos e métricas em um [`MeetingDetails`] tipado.
//! `create` é a única operação composta de escrita: cria a reunião e então
//! adiciona cada participante, na ordem, pois os POSTs dependem do id
//! devolvido pela criação.

use crate::connection::Connection;
use crate::error::{BloomyError, Result};
use crate::response::{handle_response, handle_response_ok};
use crate::transform::{dig, transform_collection, transform_record, NormalizedCollection, NormalizedRecord};
use crate::users::reshape_all;
use crate::validation::{validate_id, validate_title};
use serde_json::json;

/// Visão composta de uma reunião
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDetails {
    pub id: i64,
    pub title: String,
    pub attendees: NormalizedCollection,
    pub issues: NormalizedCollection,
    pub todos: NormalizedCollection,
    pub metrics: NormalizedCollection,
}

/// Operações sobre reuniões
#[derive(Clone)]
pub struct Meetings {
    conn: Connection,
    user_id: i64,
}

impl Meetings {
    pub fn new(conn: Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    /// Lista as reuniões visíveis para um usuário
    pub async fn list(&self, user_id: Option<i64>) -> Result<NormalizedCollection> {
        let user_id = user_id.unwrap_or(self.user_id);
        validate_id(user_id, "user_id")?;

        let response = self.conn.get(&format!("L10/{user_id}/list")).await?;
        let body = handle_response(response, "list meetings")?;

        Ok(transform_collection(&reshape_all(&body, |meeting| {
            json!({
                "id": dig(meeting, &["Id"]),
                "title": dig(meeting, &["Name"]),
            })
        })))
    }

    /// Participantes de uma reunião
    pub async fn attendees(&self, meeting_id: i64) -> Result<NormalizedCollection> {
        validate_id(meeting_id, "meeting_id")?;

        let response = self.conn.get(&format!("L10/{meeting_id}/attendees")).await?;
        let body = handle_response(response, "list meeting attendees")?;

        Ok(transform_collection(&reshape_all(&body, |attendee| {
            json!({
                "id": dig(attendee, &["Id"]),
                "name": dig(attendee, &["Name"]),
            })
        })))
    }

    /// Issues de uma reunião
    pub async fn issues(&self, meeting_id: i64, include_closed: bool) -> Result<NormalizedCollection> {
        validate_id(meeting_id, "meeting_id")?;

        let response = self
            .conn
            .get(&format!("L10/{meeting_id}/issues?include_resolved={include_closed}"))
            .await?;
        let body = handle_response(response, "list meeting issues")?;

        Ok(transform_collection(&reshape_all(&body, |issue| {
            json!({
                "id": dig(issue, &["Id"]),
                "title": dig(issue, &["Name"]),
                "created_at": dig(issue, &["CreateTime"]),
                "closed_at": dig(issue, &["CloseTime"]),
                "notes_url": dig(issue, &["DetailsUrl"]),
                "user_id": dig(issue, &["Owner", "Id"]),
                "user_name": dig(issue, &["Owner", "Name"]),
            })
        })))
    }

    /// Todos de uma reunião
    pub async fn todos(&self, meeting_id: i64, include_closed: bool) -> Result<NormalizedCollection> {
        validate_id(meeting_id, "meeting_id")?;

        let response = self
            .conn
            .get(&format!("L10/{meeting_id}/todos?INCLUDE_CLOSED={include_closed}"))
            .await?;
        let body = handle_response(response, "list meeting todos")?;

        Ok(transform_collection(&reshape_all(&body, |todo| {
            json!({
                "id": dig(todo, &["Id"]),
                "title": dig(todo, &["Name"]),
                "due_date": dig(todo, &["DueDate"]),
                "notes_url": dig(todo, &["DetailsUrl"]),
                "completed_at": dig(todo, &["CompleteTime"]),
                "user_id": dig(todo, &["Owner", "Id"]),
                "user_name": dig(todo, &["Owner", "Name"]),
            })
        })))
    }

    /// Métricas (measurables) de uma reunião
    pub async fn metrics(&self, meeting_id: i64) -> Result<NormalizedCollection> {
        validate_id(meeting_id, "meeting_id")?;

        let response = self.conn.get(&format!("L10/{meeting_id}/measurables")).await?;
        let body = handle_response(response, "list meeting measurables")?;

        Ok(transform_collection(&reshape_all(&body, |measurable| {
            let title = dig(measurable, &["Name"])
                .as_str()
                .map(|name| json!(name.trim()))
                .unwrap_or(serde_json::Value::Null);
            json!({
                "id": dig(measurable, &["Id"]),
                "title": title,
                "target": dig(measurable, &["Target"]),
                "operator": dig(measurable, &["Direction"]),
                "format": dig(measurable, &["Modifiers"]),
                "user_id": dig(measurable, &["Owner", "Id"]),
                "user_name": dig(measurable, &["Owner", "Name"]),
                "admin_id": dig(measurable, &["Admin", "Id"]),
                "admin_name": dig(measurable, &["Admin", "Name"]),
            })
        })))
    }

    /// Visão composta: listagem + participantes + issues + todos + métricas
    pub async fn details(&self, meeting_id: i64, include_closed: bool) -> Result<MeetingDetails> {
        validate_id(meeting_id, "meeting_id")?;

        let meetings = self.list(None).await?;
        let meeting = meetings
            .iter()
            .find(|meeting| meeting.id() == Some(meeting_id))
            .ok_or_else(|| BloomyError::NotFound {
                message: "Not found: get meeting details".to_string(),
                status: 404,
                body: String::new(),
            })?;
        let title = meeting.title().unwrap_or_default().to_string();

        Ok(MeetingDetails {
            id: meeting_id,
            title,
            attendees: self.attendees(meeting_id).await?,
            issues: self.issues(meeting_id, include_closed).await?,
            todos: self.todos(meeting_id, include_closed).await?,
            metrics: self.metrics(meeting_id).await?,
        })
    }

    /// Cria uma reunião e adiciona os participantes informados, em ordem
    pub async fn create(
        &self,
        title: &str,
        add_self: bool,
        attendees: &[i64],
    ) -> Result<NormalizedRecord> {
        validate_title(Some(title), "title")?;
        for attendee in attendees {
            validate_id(*attendee, "attendee_id")?;
        }

        let payload = json!({"title": title, "addSelf": add_self});
        let response = self.conn.post("L10/create", &payload).await?;
        let body = handle_response(response, "create meeting")?;

        let meeting_id = dig(&body, &["meetingId"]);
        tracing::debug!("meeting created: {}", meeting_id);

        if let Some(meeting_id) = meeting_id.as_i64() {
            for attendee in attendees {
                let response = self
                    .conn
                    .post_empty(&format!("L10/{meeting_id}/attendees/{attendee}"))
                    .await?;
                handle_response_ok(response, "add meeting attendee")?;
            }
        }

        let record = json!({
            "meeting_id": meeting_id,
            "title": title,
            "attendees": attendees,
        });
        Ok(transform_record(&record).unwrap_or_default())
    }

    /// Remove uma reunião
    pub async fn delete(&self, meeting_id: i64) -> Result<bool> {
        validate_id(meeting_id, "meeting_id")?;

        let response = self.conn.delete(&format!("L10/{meeting_id}")).await?;
        handle_response_ok(response, "delete meeting")
    }
}
