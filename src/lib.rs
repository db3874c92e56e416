//! Cliente completo da API Bloom Growth (EOS/Level 10)
//!
//! Este crate fornece uma interface tipo-segura para a API do Bloom Growth,
//! cobrindo usuários, reuniões, goals (rocks), todos, issues, scorecards e
//! headlines.
//!
//! # Arquitetura
//!
//! O núcleo do crate é a camada de normalização e erros:
//!
//! - [`response`]: único ponto onde status HTTP vira erro tipado
//!   ([`handle_response`] / [`handle_response_ok`] e o classificador).
//! - [`transform`]: converte o JSON bruto e inconsistente da API em
//!   [`NormalizedRecord`]/[`NormalizedCollection`] — chaves snake_case
//!   canônicas, lookup insensível à representação e datas coercidas.
//! - [`validation`]: rejeita argumentos inválidos antes de qualquer chamada
//!   de rede.
//!
//! Cada módulo de recurso compõe esses três ao redor de uma chamada HTTP
//! feita pela [`Connection`], que concentra URL base, autenticação Bearer,
//! timeouts e retry/backoff em falhas transientes.
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use bloomy::Client;
//!
//! #[tokio::main]
//! async fn main() -> bloomy::Result<()> {
//!     // IMPORTANTE: Ler de variáveis de ambiente (NUNCA hardcode!)
//!     let api_key = std::env::var("BLOOMY_API_KEY")
//!         .expect("BLOOMY_API_KEY não configurado");
//!
//!     let client = Client::new(api_key).await?;
//!
//!     let goals = client.goal.list(None, false).await?;
//!     let week = client.scorecard.current_week().await?;
//!
//!     Ok(())
//! }
//! ```

// Módulos públicos
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod goals;
pub mod headlines;
pub mod issues;
pub mod meetings;
pub mod response;
pub mod scorecard;
pub mod todos;
pub mod transform;
pub mod users;
pub mod validation;

// Re-exports principais
pub use client::Client;
pub use config::Configuration;
pub use connection::{Connection, RetryOptions};
pub use error::{BloomyError, Result};
pub use goals::{GoalList, Goals};
pub use headlines::Headlines;
pub use issues::Issues;
pub use meetings::{MeetingDetails, Meetings};
pub use response::{handle_response, handle_response_ok, ApiResponse};
pub use scorecard::Scorecards;
pub use todos::Todos;
pub use transform::{
    transform_collection, transform_record, FieldValue, NormalizedCollection, NormalizedRecord,
};
pub use users::Users;
