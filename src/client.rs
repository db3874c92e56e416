//! Fachada principal do cliente
//!
//! O [`Client`] amarra a conexão autenticada aos grupos de operações. A
//! construção resolve o usuário autenticado uma única vez (`users/mine`) e
//! repassa o id como escopo default de cada grupo; depois disso o estado é
//! somente leitura e o cliente pode ser clonado e compartilhado livremente.

use crate::config::Configuration;
use crate::connection::Connection;
use crate::error::{BloomyError, Result};
use crate::goals::Goals;
use crate::headlines::Headlines;
use crate::issues::Issues;
use crate::meetings::Meetings;
use crate::scorecard::Scorecards;
use crate::todos::Todos;
use crate::users::Users;

/// Ponto de entrada para a API do Bloom Growth
///
/// # Exemplo
///
/// ```rust,ignore
/// use bloomy::Client;
///
/// #[tokio::main]
/// async fn main() -> bloomy::Result<()> {
///     let client = Client::from_env().await?;
///     let todos = client.todo.list(None, None).await?;
///     for todo in &todos {
///         println!("{:?} {:?}", todo.id(), todo.title());
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    user_id: i64,
    pub user: Users,
    pub todo: Todos,
    pub goal: Goals,
    pub meeting: Meetings,
    pub scorecard: Scorecards,
    pub issue: Issues,
    pub headline: Headlines,
}

impl Client {
    /// Cria um cliente a partir de uma API key
    pub async fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_connection(Connection::new(api_key)?).await
    }

    /// Cria um cliente lendo a API key do ambiente
    ///
    /// Falha com [`BloomyError::Config`] quando nenhuma chave está
    /// configurada.
    pub async fn from_env() -> Result<Self> {
        let configuration = Configuration::new();
        let api_key = configuration.api_key.ok_or_else(|| {
            BloomyError::Config(
                "No API key provided. Set it in configuration or pass it directly.".to_string(),
            )
        })?;
        Self::new(api_key).await
    }

    /// Cria um cliente sobre uma conexão já configurada
    ///
    /// Útil para apontar para outra URL base ou ajustar timeouts/retry.
    pub async fn from_connection(conn: Connection) -> Result<Self> {
        let user = Users::new(conn.clone());
        let user_id = user.user_id().await?;

        Ok(Self {
            user_id,
            user,
            todo: Todos::new(conn.clone(), user_id),
            goal: Goals::new(conn.clone(), user_id),
            meeting: Meetings::new(conn.clone(), user_id),
            scorecard: Scorecards::new(conn.clone(), user_id),
            issue: Issues::new(conn.clone(), user_id),
            headline: Headlines::new(conn, user_id),
        })
    }

    /// ID do usuário autenticado, resolvido na construção
    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}
