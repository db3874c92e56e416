//! Tipos de erro para o crate bloomy

use thiserror::Error;

/// Erros do cliente Bloom Growth
///
/// A hierarquia segue os desfechos HTTP da API: `Authentication` (401/403),
/// `NotFound` (404) e `RateLimited` (429) são especializações de `Api`, que
/// cobre qualquer outro status não-2xx. `Validation` é sempre levantado
/// localmente, antes de qualquer chamada de rede.
#[derive(Debug, Error)]
pub enum BloomyError {
    /// Erro de requisição HTTP (conexão, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Falha de autenticação (401/403)
    #[error("{0}")]
    Authentication(String),

    /// Erro genérico da API (status não-2xx sem classificação mais específica)
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        body: String,
    },

    /// Recurso não encontrado (404)
    #[error("{message}")]
    NotFound {
        message: String,
        status: u16,
        body: String,
    },

    /// Limite de requisições excedido (429)
    #[error("{message}")]
    RateLimited {
        message: String,
        status: u16,
        body: String,
        /// Segundos sugeridos pelo header `Retry-After`, quando parseável
        retry_after: Option<u64>,
    },

    /// Argumento inválido, detectado antes de qualquer chamada de rede
    #[error("{0}")]
    Validation(String),

    /// Erro de configuração (API key ausente, cliente HTTP inválido)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BloomyError {
    /// Status HTTP que originou o erro, quando houver
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. }
            | Self::NotFound { status, .. }
            | Self::RateLimited { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Corpo bruto (não parseado) da resposta que originou o erro
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. }
            | Self::NotFound { body, .. }
            | Self::RateLimited { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Segundos do header `Retry-After`, apenas para `RateLimited`
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, BloomyError>;
