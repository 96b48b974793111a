//! Configuração do servidor (variáveis de ambiente, opcionalmente via `.env`).
//!
//! - `NER_HOST` (padrão `0.0.0.0`)
//! - `NER_PORT` (padrão `3000`)
//! - `NER_LOG` (padrão `info`; `RUST_LOG` tem precedência)
//! - `NER_STATIC_DIR` (padrão `<crate>/static`)
//!
//! As variáveis do pipeline (`NER_ENGINE`, `NER_MODEL`...) são lidas por
//! [`ner_spans::NerConfig`].

use std::net::SocketAddr;
use std::path::PathBuf;

use ner_spans::{NerConfig, NerError, NerResult};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub static_dir: PathBuf,
    pub ner: NerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            static_dir: default_static_dir(),
            ner: NerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> NerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> NerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            ner: NerConfig::from_lookup(&lookup)?,
            ..Self::default()
        };

        if let Some(host) = lookup("NER_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("NER_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| NerError::Configuration(format!("NER_PORT inválida: {port:?}")))?;
        }
        if let Some(level) = lookup("NER_LOG") {
            config.log_level = level;
        }
        if let Some(dir) = lookup("NER_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> NerResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| NerError::Configuration(format!("endereço inválido: {}:{}", self.host, self.port)))
    }
}

/// Pasta `static/` ao lado do Cargo.toml deste crate.
pub fn default_static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_server_overrides() {
        let env: HashMap<&str, &str> = [("NER_PORT", "8088"), ("NER_HOST", "127.0.0.1"), ("NER_ENGINE", "hosted")]
            .into_iter()
            .collect();
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8088");
        assert_eq!(config.ner.engine, ner_spans::EngineKind::Hosted);
    }

    #[test]
    fn test_bad_port() {
        let err = ServerConfig::from_lookup(|k| (k == "NER_PORT").then(|| "http".to_string())).unwrap_err();
        assert!(matches!(err, NerError::Configuration(_)));
    }
}
