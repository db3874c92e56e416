//! Transporte HTTP para a API do Bloom Growth
//!
//! A `Connection` concentra toda a política de transporte: URL base, header
//! de autenticação Bearer, content-type, timeouts e retry/backoff em falhas
//! transientes. Nenhuma interpretação de status acontece aqui além da tabela
//! de retry; a classificação de erro fica em [`crate::response`].

use crate::error::{BloomyError, Result};
use crate::response::ApiResponse;
use reqwest::{Client as HttpClient, Method};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://app.bloomgrowth.com/api/v1";

/// Política de retry para falhas transientes
///
/// Statuses 429/502/503/504 e erros de conexão/timeout são retentados com
/// backoff exponencial. Esgotadas as tentativas, a última resposta segue o
/// fluxo normal de classificação.
#[derive(Debug, Clone)]
pub struct RetryOptions {
    pub max_retries: u32,
    pub interval: Duration,
    pub backoff_factor: u32,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            interval: Duration::from_millis(500),
            backoff_factor: 2,
            retry_statuses: vec![429, 502, 503, 504],
        }
    }
}

/// Conexão autenticada com a API
///
/// Implementa `Clone` e pode ser compartilhada entre grupos de operações.
#[derive(Clone)]
pub struct Connection {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
    retry: RetryOptions,
}

impl Connection {
    /// Cria uma conexão com os timeouts padrão (total 30s, connect 5s)
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key, DEFAULT_BASE_URL, 30, 5, RetryOptions::default())
    }

    /// Cria uma conexão com URL base customizada (útil em testes)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::builder(api_key, base_url, 30, 5, RetryOptions::default())
    }

    /// Cria uma conexão com timeouts e política de retry customizados
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        total_timeout_secs: u64,
        connect_timeout_secs: u64,
        retry: RetryOptions,
    ) -> Result<Self> {
        Self::builder(api_key, base_url, total_timeout_secs, connect_timeout_secs, retry)
    }

    fn builder(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        total_timeout_secs: u64,
        connect_timeout_secs: u64,
        retry: RetryOptions,
    ) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(total_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()
            .map_err(|e| BloomyError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Executa uma requisição GET
    pub(crate) async fn get(&self, endpoint: &str) -> Result<ApiResponse> {
        self.send(Method::GET, endpoint, None).await
    }

    /// Executa uma requisição POST com corpo JSON
    pub(crate) async fn post(&self, endpoint: &str, body: &Value) -> Result<ApiResponse> {
        self.send(Method::POST, endpoint, Some(body)).await
    }

    /// Executa uma requisição POST sem corpo
    pub(crate) async fn post_empty(&self, endpoint: &str) -> Result<ApiResponse> {
        self.send(Method::POST, endpoint, None).await
    }

    /// Executa uma requisição PUT com corpo JSON
    pub(crate) async fn put(&self, endpoint: &str, body: &Value) -> Result<ApiResponse> {
        self.send(Method::PUT, endpoint, Some(body)).await
    }

    /// Executa uma requisição PUT sem corpo (transições de estado)
    pub(crate) async fn put_empty(&self, endpoint: &str) -> Result<ApiResponse> {
        self.send(Method::PUT, endpoint, None).await
    }

    /// Executa uma requisição DELETE
    pub(crate) async fn delete(&self, endpoint: &str) -> Result<ApiResponse> {
        self.send(Method::DELETE, endpoint, None).await
    }

    async fn send(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        let mut attempt = 0u32;
        loop {
            tracing::debug!("{} {}", method, url);

            let mut request = self
                .http_client
                .request(method.clone(), &url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Accept", "*/*")
                .header("Content-Type", "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if self.retry.retry_statuses.contains(&status) && attempt < self.retry.max_retries {
                        tracing::debug!("transient status {}, retrying {}", status, url);
                        self.backoff(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return ApiResponse::from_reqwest(response).await;
                }
                Err(err) => {
                    if (err.is_timeout() || err.is_connect()) && attempt < self.retry.max_retries {
                        tracing::debug!("transient error ({}), retrying {}", err, url);
                        self.backoff(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }

    async fn backoff(&self, attempt: u32) {
        let factor = self.retry.backoff_factor.saturating_pow(attempt);
        tokio::time::sleep(self.retry.interval * factor).await;
    }
}
