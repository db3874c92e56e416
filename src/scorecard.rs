//! Operações de scorecard (métricas semanais)

use crate::connection::Connection;
use crate::error::{BloomyError, Result};
use crate::response::{handle_response, handle_response_ok};
use crate::transform::{dig, transform_collection, transform_record, FieldValue, NormalizedCollection, NormalizedRecord};
use crate::users::reshape_all;
use crate::validation::validate_id;
use serde_json::json;

/// Operações sobre scorecards
#[derive(Clone)]
pub struct Scorecards {
    conn: Connection,
    user_id: i64,
}

impl Scorecards {
    pub fn new(conn: Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    /// Semana corrente do calendário da organização
    pub async fn current_week(&self) -> Result<NormalizedRecord> {
        let response = self.conn.get("weeks/current").await?;
        let body = handle_response(response, "get current week")?;

        let record = json!({
            "id": dig(&body, &["Id"]),
            "week_number": dig(&body, &["ForWeekNumber"]),
            "week_start": dig(&body, &["LocalDate", "Date"]),
            "week_end": dig(&body, &["ForWeek"]),
        });
        Ok(transform_record(&record).unwrap_or_default())
    }

    /// Scorecards por usuário ou por reunião (filtros mutuamente exclusivos)
    ///
    /// `week_offset` filtra para a semana corrente menos o offset;
    /// `show_empty` controla se scores sem valor medido aparecem. Ambos os
    /// filtros são locais, aplicados após a normalização, preservando a
    /// ordem do servidor.
    pub async fn list(
        &self,
        user_id: Option<i64>,
        meeting_id: Option<i64>,
        show_empty: bool,
        week_offset: Option<i64>,
    ) -> Result<NormalizedCollection> {
        if user_id.is_some() && meeting_id.is_some() {
            return Err(BloomyError::Validation(
                "Please provide either `user_id` or `meeting_id`, not both.".to_string(),
            ));
        }

        let endpoint = if let Some(meeting_id) = meeting_id {
            validate_id(meeting_id, "meeting_id")?;
            format!("scorecard/meeting/{meeting_id}")
        } else {
            let user_id = user_id.unwrap_or(self.user_id);
            validate_id(user_id, "user_id")?;
            format!("scorecard/user/{user_id}")
        };

        let response = self.conn.get(&endpoint).await?;
        let body = handle_response(response, "list scorecards")?;

        let scores = dig(&body, &["Scores"]);
        let mut scorecards = transform_collection(&reshape_all(&scores, |score| {
            json!({
                "id": dig(score, &["Id"]),
                "measurable_id": dig(score, &["MeasurableId"]),
                "accountable_user_id": dig(score, &["AccountableUserId"]),
                "title": dig(score, &["MeasurableName"]),
                "target": dig(score, &["Target"]),
                "value": dig(score, &["Measured"]),
                "week": dig(score, &["Week"]),
                "updated_at": dig(score, &["DateEntered"]),
            })
        }));

        if let Some(offset) = week_offset {
            let current = self.current_week().await?;
            let week_number = current
                .get("week_number")
                .and_then(FieldValue::as_i64)
                .unwrap_or_default();
            let wanted = week_number - offset;
            scorecards.retain(|score| {
                score.get("week").and_then(FieldValue::as_i64) == Some(wanted)
            });
        }

        if !show_empty {
            scorecards.retain(|score| {
                score.get("value").map(|value| !value.is_null()).unwrap_or(false)
            });
        }

        Ok(scorecards)
    }

    /// Registra um novo valor medido para um score
    pub async fn update(&self, scorecard_id: i64, measured: f64) -> Result<bool> {
        validate_id(scorecard_id, "scorecard_id")?;

        let payload = json!({"value": measured});
        let response = self.conn.put(&format!("scores/{scorecard_id}"), &payload).await?;
        handle_response_ok(response, "update scorecard")
    }
}
