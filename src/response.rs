//! Tratamento uniforme de respostas HTTP
//!
//! Este módulo é o único ponto do crate onde status HTTP é interpretado.
//! Toda operação de recurso passa o desfecho da chamada por
//! [`handle_response`] (quando o corpo interessa) ou por
//! [`handle_response_ok`] (quando a API sinaliza apenas sucesso/falha), e os
//! dois compartilham o mesmo classificador de status → erro.

use crate::error::{BloomyError, Result};
use serde_json::Value;

/// Fotografia de uma resposta HTTP já decodificada
///
/// Construída pela [`Connection`](crate::connection::Connection) a partir da
/// resposta do reqwest: status, corpo decodificado como JSON, corpo bruto
/// para diagnóstico e o valor do header `Retry-After` quando presente.
/// Por ser um valor simples, é construível diretamente em testes sem
/// servidor.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: Value,
    raw_body: String,
    retry_after: Option<String>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value, raw_body: impl Into<String>) -> Self {
        Self {
            status,
            body,
            raw_body: raw_body.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }

    /// Constrói a partir de uma resposta do reqwest, consumindo o corpo
    ///
    /// Corpo não-JSON (ou vazio) decodifica para `Value::Null`; o texto bruto
    /// é preservado de qualquer forma.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let raw_body = response.text().await?;
        let body = serde_json::from_str(&raw_body).unwrap_or(Value::Null);

        Ok(Self {
            status,
            body,
            raw_body,
            retry_after,
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Predicado de sucesso (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }
}

/// Retorna o corpo decodificado em 2xx, ou o erro tipado do classificador
///
/// `context` é uma descrição curta da operação tentada (ex.: `"list goals"`),
/// usada somente nas mensagens de erro.
pub fn handle_response(response: ApiResponse, context: &str) -> Result<Value> {
    if response.is_success() {
        return Ok(response.body);
    }

    Err(error_for_status(response, context))
}

/// Variante para operações cujo endpoint só sinaliza sucesso/falha
///
/// Em 2xx retorna `true` (o corpo é descartado); caso contrário aplica o
/// mesmo classificador de [`handle_response`].
pub fn handle_response_ok(response: ApiResponse, context: &str) -> Result<bool> {
    if response.is_success() {
        return Ok(true);
    }

    Err(error_for_status(response, context))
}

/// Classificador status → erro, em ordem de prioridade
fn error_for_status(response: ApiResponse, context: &str) -> BloomyError {
    let status = response.status;
    let body = response.raw_body;

    match status {
        401 | 403 => {
            BloomyError::Authentication(format!("Authentication failed: {context} ({status})"))
        }
        404 => BloomyError::NotFound {
            message: format!("Not found: {context}"),
            status,
            body,
        },
        429 => {
            let retry_after = response
                .retry_after
                .as_deref()
                .and_then(|v| v.trim().parse::<u64>().ok());
            BloomyError::RateLimited {
                message: format!("Rate limited: {context}"),
                status,
                body,
                retry_after,
            }
        }
        _ => BloomyError::Api {
            message: format!("Failed to {context}: {status}"),
            status,
            body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> ApiResponse {
        let raw = body.to_string();
        ApiResponse::new(status, body, raw)
    }

    #[test]
    fn test_success_returns_body_verbatim() {
        let body = json!({"Id": 1, "Name": "Ship v1"});
        let result = handle_response(response(200, body.clone()), "list todos").unwrap();
        assert_eq!(result, body);
    }

    #[test]
    fn test_success_ok_returns_sentinel() {
        for status in [200, 201, 204, 299] {
            let result = handle_response_ok(response(status, Value::Null), "delete goal");
            assert!(matches!(result, Ok(true)));
        }
    }

    #[test]
    fn test_unauthorized_and_forbidden_raise_authentication() {
        for status in [401, 403] {
            let err = handle_response(response(status, Value::Null), "list goals").unwrap_err();
            match err {
                BloomyError::Authentication(message) => {
                    assert_eq!(message, format!("Authentication failed: list goals ({status})"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_not_found_preserves_status_and_body() {
        let err = handle_response(
            response(404, json!({"Message": "not found"})),
            "get issue details",
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Not found: get issue details");
        assert_eq!(err.status(), Some(404));
        assert!(err.response_body().unwrap().contains("\"Message\":\"not found\""));
    }

    #[test]
    fn test_rate_limited_parses_retry_after() {
        let err = handle_response(
            response(429, Value::Null).with_retry_after("30"),
            "list todos",
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Rate limited: list todos");
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.retry_after(), Some(30));
    }

    #[test]
    fn test_rate_limited_without_parseable_header() {
        let err = handle_response_ok(
            response(429, Value::Null).with_retry_after("soon"),
            "update score",
        )
        .unwrap_err();
        assert_eq!(err.retry_after(), None);

        let err = handle_response_ok(response(429, Value::Null), "update score").unwrap_err();
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_other_statuses_raise_api_error() {
        for status in [400, 422, 500, 503] {
            let err = handle_response(
                response(status, json!({"err": "boom"})),
                "create todo",
            )
            .unwrap_err();
            match &err {
                BloomyError::Api { message, .. } => {
                    assert_eq!(message, &format!("Failed to create todo: {status}"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(err.status(), Some(status));
            assert_eq!(err.response_body(), Some(r#"{"err":"boom"}"#));
        }
    }

    #[test]
    fn test_both_entry_points_share_the_classifier() {
        let from_body = handle_response(response(404, Value::Null), "x").unwrap_err();
        let from_ok = handle_response_ok(response(404, Value::Null), "x").unwrap_err();
        assert_eq!(from_body.to_string(), from_ok.to_string());
        assert_eq!(from_body.status(), from_ok.status());
    }
}
