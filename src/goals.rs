//! Operações de goals (rocks)

use crate::connection::Connection;
use crate::error::Result;
use crate::response::{handle_response, handle_response_ok};
use crate::transform::{dig, transform_collection, transform_record, NormalizedCollection, NormalizedRecord};
use crate::users::reshape_all;
use crate::validation::{validate_id, validate_title};
use serde_json::{json, Value};

/// Resultado de [`Goals::list`]
///
/// A forma só varia aqui: com `archived` a listagem faz um segundo GET e
/// devolve os dois conjuntos separados.
#[derive(Debug, Clone, PartialEq)]
pub enum GoalList {
    Active(NormalizedCollection),
    All {
        active: NormalizedCollection,
        archived: NormalizedCollection,
    },
}

/// Operações sobre goals
#[derive(Clone)]
pub struct Goals {
    conn: Connection,
    user_id: i64,
}

impl Goals {
    pub fn new(conn: Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    /// Lista os goals ativos de um usuário, opcionalmente com os arquivados
    pub async fn list(&self, user_id: Option<i64>, archived: bool) -> Result<GoalList> {
        let user_id = user_id.unwrap_or(self.user_id);
        validate_id(user_id, "user_id")?;

        let response = self
            .conn
            .get(&format!("rocks/user/{user_id}?include_origin=true"))
            .await?;
        let body = handle_response(response, "list goals")?;
        let active = transform_collection(&reshape_all(&body, reshape_goal));

        if archived {
            let archived = self.archived_goals(user_id).await?;
            Ok(GoalList::All { active, archived })
        } else {
            Ok(GoalList::Active(active))
        }
    }

    /// Cria um goal em uma reunião; o endpoint ecoa o recurso criado
    pub async fn create(
        &self,
        meeting_id: i64,
        title: &str,
        user_id: Option<i64>,
    ) -> Result<NormalizedRecord> {
        validate_title(Some(title), "title")?;
        validate_id(meeting_id, "meeting_id")?;
        let user_id = user_id.unwrap_or(self.user_id);
        validate_id(user_id, "user_id")?;

        let payload = json!({"title": title, "accountableUserId": user_id});
        let response = self.conn.post(&format!("L10/{meeting_id}/rocks"), &payload).await?;
        let body = handle_response(response, "create goal")?;

        let record = json!({
            "id": dig(&body, &["Id"]),
            "title": dig(&body, &["Name"]),
            "meeting_id": meeting_id,
            "meeting_name": dig(&body, &["Origins", "0", "Name"]),
            "user_id": user_id,
            "user_name": dig(&body, &["Owner", "Name"]),
            "created_at": dig(&body, &["CreateTime"]),
        });
        Ok(transform_record(&record).unwrap_or_default())
    }

    /// Atualiza título e responsável de um goal
    pub async fn update(
        &self,
        goal_id: i64,
        title: &str,
        accountable_user: Option<i64>,
    ) -> Result<bool> {
        validate_id(goal_id, "goal_id")?;
        validate_title(Some(title), "title")?;
        let accountable_user = accountable_user.unwrap_or(self.user_id);
        validate_id(accountable_user, "accountable_user")?;

        let payload = json!({"title": title, "accountableUserId": accountable_user});
        let response = self.conn.put(&format!("rocks/{goal_id}"), &payload).await?;
        handle_response_ok(response, "update goal")
    }

    /// Remove um goal
    pub async fn delete(&self, goal_id: i64) -> Result<bool> {
        validate_id(goal_id, "goal_id")?;

        let response = self.conn.delete(&format!("rocks/{goal_id}")).await?;
        handle_response_ok(response, "delete goal")
    }

    /// Arquiva um goal
    pub async fn archive(&self, goal_id: i64) -> Result<bool> {
        validate_id(goal_id, "goal_id")?;

        let response = self.conn.put_empty(&format!("rocks/{goal_id}/archive")).await?;
        handle_response_ok(response, "archive goal")
    }

    /// Restaura um goal arquivado
    pub async fn restore(&self, goal_id: i64) -> Result<bool> {
        validate_id(goal_id, "goal_id")?;

        let response = self.conn.put_empty(&format!("rocks/{goal_id}/restore")).await?;
        handle_response_ok(response, "restore goal")
    }

    async fn archived_goals(&self, user_id: i64) -> Result<NormalizedCollection> {
        let response = self.conn.get(&format!("archivedrocks/user/{user_id}")).await?;
        let body = handle_response(response, "list archived goals")?;

        Ok(transform_collection(&reshape_all(&body, |goal| {
            json!({
                "id": dig(goal, &["Id"]),
                "title": dig(goal, &["Name"]),
                "created_at": dig(goal, &["CreateTime"]),
                "due_date": dig(goal, &["DueDate"]),
                "status": completion_status(goal),
            })
        })))
    }
}

fn reshape_goal(goal: &Value) -> Value {
    json!({
        "id": dig(goal, &["Id"]),
        "title": dig(goal, &["Name"]),
        "created_at": dig(goal, &["CreateTime"]),
        "due_date": dig(goal, &["DueDate"]),
        "status": completion_status(goal),
        "meeting_id": dig(goal, &["Origins", "0", "Id"]),
        "meeting_name": dig(goal, &["Origins", "0", "Name"]),
    })
}

fn completion_status(goal: &Value) -> Value {
    match dig(goal, &["Complete"]).as_bool() {
        Some(true) => json!("Completed"),
        Some(false) => json!("Incomplete"),
        None => Value::Null,
    }
}
