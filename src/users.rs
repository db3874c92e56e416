//! Operações de usuários
//!
//! Além do CRUD de leitura, este módulo resolve o usuário padrão da sessão:
//! o primeiro acesso a [`Users::user_id`] consulta `users/mine` e memoiza o
//! resultado, que as demais operações usam como escopo default.

use crate::connection::Connection;
use crate::error::{BloomyError, Result};
use crate::response::handle_response;
use crate::transform::{dig, transform_collection, transform_record, NormalizedCollection, NormalizedRecord};
use crate::validation::validate_id;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Operações sobre usuários
#[derive(Clone)]
pub struct Users {
    conn: Connection,
    default_user_id: Arc<OnceCell<i64>>,
}

impl Users {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            default_user_id: Arc::new(OnceCell::new()),
        }
    }

    /// ID do usuário autenticado, memoizado após a primeira consulta
    pub async fn user_id(&self) -> Result<i64> {
        self.default_user_id
            .get_or_try_init(|| self.current_user_id())
            .await
            .copied()
    }

    /// Consulta o ID do usuário autenticado (`users/mine`)
    pub async fn current_user_id(&self) -> Result<i64> {
        let response = self.conn.get("users/mine").await?;
        let body = handle_response(response, "get current user")?;
        dig(&body, &["Id"]).as_i64().ok_or_else(|| {
            BloomyError::Config("Current user response did not include an Id".to_string())
        })
    }

    /// Detalhes de um usuário, com sub-listas opcionais
    ///
    /// `direct_reports`/`positions` disparam uma chamada adicional cada;
    /// `all` inclui ambas. As sub-listas entram no registro como arrays JSON.
    pub async fn details(
        &self,
        user_id: Option<i64>,
        direct_reports: bool,
        positions: bool,
        all: bool,
    ) -> Result<NormalizedRecord> {
        let user_id = self.resolve(user_id).await?;
        let response = self.conn.get(&format!("users/{user_id}")).await?;
        let body = handle_response(response, "get user details")?;

        let mut record = json!({
            "id": dig(&body, &["Id"]),
            "name": dig(&body, &["Name"]),
            "image_url": dig(&body, &["ImageUrl"]),
        });

        if direct_reports || all {
            let reports = self.direct_reports(Some(user_id)).await?;
            record["direct_reports"] = collection_to_json(&reports);
        }
        if positions || all {
            let seats = self.positions(Some(user_id)).await?;
            record["positions"] = collection_to_json(&seats);
        }

        Ok(transform_record(&record).unwrap_or_default())
    }

    /// Subordinados diretos de um usuário
    pub async fn direct_reports(&self, user_id: Option<i64>) -> Result<NormalizedCollection> {
        let user_id = self.resolve(user_id).await?;
        let response = self.conn.get(&format!("users/{user_id}/directreports")).await?;
        let body = handle_response(response, "list direct reports")?;

        Ok(transform_collection(&reshape_all(&body, |report| {
            json!({
                "id": dig(report, &["Id"]),
                "name": dig(report, &["Name"]),
                "image_url": dig(report, &["ImageUrl"]),
            })
        })))
    }

    /// Posições (assentos) de um usuário
    pub async fn positions(&self, user_id: Option<i64>) -> Result<NormalizedCollection> {
        let user_id = self.resolve(user_id).await?;
        let response = self.conn.get(&format!("users/{user_id}/seats")).await?;
        let body = handle_response(response, "list user positions")?;

        Ok(transform_collection(&reshape_all(&body, |seat| {
            json!({
                "id": dig(seat, &["Group", "Position", "Id"]),
                "name": dig(seat, &["Group", "Position", "Name"]),
            })
        })))
    }

    /// Busca usuários por termo
    pub async fn search(&self, term: &str) -> Result<NormalizedCollection> {
        let endpoint = format!("search/user?term={}", urlencoding::encode(term));
        let response = self.conn.get(&endpoint).await?;
        let body = handle_response(response, "search users")?;

        Ok(transform_collection(&reshape_all(&body, |user| {
            json!({
                "id": dig(user, &["Id"]),
                "name": dig(user, &["Name"]),
                "description": dig(user, &["Description"]),
                "email": dig(user, &["Email"]),
                "organization_id": dig(user, &["OrganizationId"]),
                "image_url": dig(user, &["ImageUrl"]),
            })
        })))
    }

    async fn resolve(&self, user_id: Option<i64>) -> Result<i64> {
        match user_id {
            Some(id) => {
                validate_id(id, "user_id")?;
                Ok(id)
            }
            None => self.user_id().await,
        }
    }
}

/// Aplica um reshape a cada elemento de um array bruto
pub(crate) fn reshape_all(body: &Value, reshape: impl Fn(&Value) -> Value) -> Value {
    match body.as_array() {
        Some(items) => Value::Array(items.iter().map(reshape).collect()),
        None => Value::Null,
    }
}

/// Converte uma coleção normalizada de volta para um array JSON simples
///
/// Usado apenas para embutir sub-listas em registros compostos; campos
/// temporais já coercidos voltam como string RFC 3339.
fn collection_to_json(collection: &NormalizedCollection) -> Value {
    Value::Array(collection.iter().map(record_to_json).collect())
}

fn record_to_json(record: &NormalizedRecord) -> Value {
    use crate::transform::FieldValue;

    let mut map = serde_json::Map::new();
    for (key, value) in record.iter() {
        let json = match value {
            FieldValue::Json(v) => v.clone(),
            FieldValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            FieldValue::Record(nested) => record_to_json(nested),
        };
        map.insert(key.to_string(), json);
    }
    Value::Object(map)
}
