//! Configuração de credenciais
//!
//! A API key pode vir da variável de ambiente `BLOOMY_API_KEY` (com fallback
//! para `API_KEY`), ser obtida via password grant contra `/Token`, ou ambos.
//! Opcionalmente a chave é persistida em `~/.bloomy/config.yaml`:
//!
//! ```yaml
//! version: 1
//! api_key: <api_key>
//! ```

use crate::error::{BloomyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

const TOKEN_URL: &str = "https://app.bloomgrowth.com/Token";

#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    version: u32,
    api_key: String,
}

/// Origem e armazenamento da API key
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    pub api_key: Option<String>,
}

impl Configuration {
    /// Lê a API key do ambiente, quando presente
    pub fn new() -> Self {
        let api_key = std::env::var("BLOOMY_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok();
        Self { api_key }
    }

    /// Troca usuário/senha por uma API key (resource owner password grant)
    ///
    /// Sem efeito quando uma chave já está configurada. Com `store_key`, a
    /// chave obtida é gravada em disco via [`store_api_key`](Self::store_api_key).
    pub async fn configure_api_key(
        &mut self,
        username: &str,
        password: &str,
        store_key: bool,
    ) -> Result<&str> {
        if self.api_key.is_none() {
            let client = reqwest::Client::new();
            let response = client
                .post(TOKEN_URL)
                .form(&[
                    ("grant_type", "password"),
                    ("userName", username),
                    ("password", password),
                ])
                .send()
                .await?;

            let body: Value = response.json().await?;
            let token = body
                .get("access_token")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    BloomyError::Config("Token exchange did not return an access_token".to_string())
                })?;
            self.api_key = Some(token.to_string());

            if store_key {
                self.store_api_key()?;
            }
        }

        Ok(self.api_key.as_deref().unwrap_or_default())
    }

    /// Persiste a API key em `~/.bloomy/config.yaml`
    pub fn store_api_key(&self) -> Result<()> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| BloomyError::Config("API key is nil".to_string()))?;

        let dir = config_dir()?;
        std::fs::create_dir_all(&dir)
            .map_err(|e| BloomyError::Config(format!("Failed to create {}: {e}", dir.display())))?;

        let file = ConfigFile {
            version: 1,
            api_key: api_key.clone(),
        };
        let yaml = serde_yaml::to_string(&file)
            .map_err(|e| BloomyError::Config(format!("Failed to serialize config: {e}")))?;

        let path = dir.join("config.yaml");
        std::fs::write(&path, yaml)
            .map_err(|e| BloomyError::Config(format!("Failed to write {}: {e}", path.display())))?;
        Ok(())
    }

    /// Carrega a API key previamente armazenada, quando existir
    pub fn load_stored_api_key(&mut self) -> Result<Option<&str>> {
        let path = config_dir()?.join("config.yaml");
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| BloomyError::Config(format!("Failed to read {}: {e}", path.display())))?;
        let file: ConfigFile = serde_yaml::from_str(&contents)
            .map_err(|e| BloomyError::Config(format!("Failed to parse {}: {e}", path.display())))?;

        self.api_key = Some(file.api_key);
        Ok(self.api_key.as_deref())
    }
}

fn config_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| BloomyError::Config("HOME is not set".to_string()))?;
    Ok(PathBuf::from(home).join(".bloomy"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_without_key_fails() {
        let config = Configuration { api_key: None };
        let err = config.store_api_key().unwrap_err();
        assert!(matches!(err, BloomyError::Config(_)));
    }

    #[test]
    fn test_config_file_round_trip() {
        let file = ConfigFile {
            version: 1,
            api_key: "secret".to_string(),
        };
        let yaml = serde_yaml::to_string(&file).unwrap();
        let parsed: ConfigFile = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.api_key, "secret");
    }
}
