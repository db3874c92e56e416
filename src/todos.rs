//! Operações de todos (itens de ação)

use crate::connection::Connection;
use crate::error::{BloomyError, Result};
use crate::response::{handle_response, handle_response_ok};
use crate::transform::{dig, transform_collection, transform_record, NormalizedCollection, NormalizedRecord};
use crate::users::reshape_all;
use crate::validation::{validate_id, validate_title};
use serde_json::{json, Value};

/// Operações sobre todos
#[derive(Clone)]
pub struct Todos {
    conn: Connection,
    user_id: i64,
}

impl Todos {
    pub fn new(conn: Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    /// Lista todos por usuário ou por reunião
    ///
    /// Os filtros são mutuamente exclusivos; fornecer ambos é erro de
    /// validação e nenhuma chamada de rede acontece. Sem filtro, usa o
    /// usuário padrão da sessão.
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
            format!("L10/{meeting_id}/todos")
        } else {
            let user_id = user_id.unwrap_or(self.user_id);
            validate_id(user_id, "user_id")?;
            format!("todo/user/{user_id}")
        };

        let response = self.conn.get(&endpoint).await?;
        let body = handle_response(response, "list todos")?;

        Ok(transform_collection(&reshape_all(&body, reshape_todo)))
    }

    /// Detalhes de um todo
    pub async fn details(&self, todo_id: i64) -> Result<NormalizedRecord> {
        validate_id(todo_id, "todo_id")?;

        let response = self.conn.get(&format!("todo/{todo_id}")).await?;
        let body = handle_response(response, "get todo details")?;

        Ok(transform_record(&reshape_todo(&body)).unwrap_or_default())
    }

    /// Cria um todo em uma reunião; o endpoint ecoa o recurso criado
    pub async fn create(
        &self,
        meeting_id: i64,
        title: &str,
        due_date: Option<&str>,
        user_id: Option<i64>,
        notes: Option<&str>,
    ) -> Result<NormalizedRecord> {
        validate_title(Some(title), "title")?;
        validate_id(meeting_id, "meeting_id")?;
        let user_id = user_id.unwrap_or(self.user_id);
        validate_id(user_id, "user_id")?;

        let mut payload = json!({
            "title": title,
            "accountableUserId": user_id,
        });
        if let Some(due_date) = due_date {
            payload["dueDate"] = json!(due_date);
        }
        if let Some(notes) = notes {
            payload["notes"] = json!(notes);
        }

        let response = self.conn.post(&format!("L10/{meeting_id}/todos"), &payload).await?;
        let body = handle_response(response, "create todo")?;

        let record = json!({
            "id": dig(&body, &["Id"]),
            "title": dig(&body, &["Name"]),
            "meeting_name": dig(&body, &["Origin"]),
            "meeting_id": dig(&body, &["OriginId"]),
            "due_date": dig(&body, &["DueDate"]),
            "notes_url": dig(&body, &["DetailsUrl"]),
        });
        Ok(transform_record(&record).unwrap_or_default())
    }

    /// Atualização parcial: apenas os campos fornecidos entram no corpo
    pub async fn update(
        &self,
        todo_id: i64,
        title: Option<&str>,
        due_date: Option<&str>,
    ) -> Result<bool> {
        validate_id(todo_id, "todo_id")?;
        if title.is_none() && due_date.is_none() {
            return Err(BloomyError::Validation(
                "At least one field must be provided".to_string(),
            ));
        }

        let mut payload = json!({});
        if let Some(title) = title {
            validate_title(Some(title), "title")?;
            payload["title"] = json!(title);
        }
        if let Some(due_date) = due_date {
            payload["dueDate"] = json!(due_date);
        }

        let response = self.conn.put(&format!("todo/{todo_id}"), &payload).await?;
        handle_response_ok(response, "update todo")
    }

    /// Marca um todo como concluído
    pub async fn complete(&self, todo_id: i64) -> Result<bool> {
        validate_id(todo_id, "todo_id")?;

        let response = self
            .conn
            .post_empty(&format!("todo/{todo_id}/complete?status=true"))
            .await?;
        handle_response_ok(response, "complete todo")
    }
}

fn reshape_todo(todo: &Value) -> Value {
    let status = match dig(todo, &["Complete"]).as_bool() {
        Some(true) => json!("Complete"),
        Some(false) => json!("Incomplete"),
        None => Value::Null,
    };
    json!({
        "id": dig(todo, &["Id"]),
        "title": dig(todo, &["Name"]),
        "notes_url": dig(todo, &["DetailsUrl"]),
        "due_date": dig(todo, &["DueDate"]),
        "created_at": dig(todo, &["CreateTime"]),
        "completed_at": dig(todo, &["CompleteTime"]),
        "status": status,
        "user_id": dig(todo, &["Owner", "Id"]),
        "user_name": dig(todo, &["Owner", "Name"]),
    })
}
