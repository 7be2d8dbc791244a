use std::{fmt, str::FromStr};

use async_trait::async_trait;

use crate::client::{HostedClient, OllamaClient};
use crate::model::{ModelCatalog, ModelId, DEFAULT_HOSTED_MODEL, DEFAULT_OLLAMA_MODEL};
use crate::traits::{GenerationParams, LLMError, TextGenerator};

/// Which kind of server suggestions are requested from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Hosted,
    Ollama,
}

impl BackendKind {
    pub fn default_url(&self) -> &'static str {
        match self {
            BackendKind::Hosted => "https://api.mistral.ai",
            BackendKind::Ollama => "http://localhost:11434",
        }
    }

    /// The model requested when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::Hosted => DEFAULT_HOSTED_MODEL,
            BackendKind::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }

    /// Hosted models are a fixed list; an Ollama server serves whatever has
    /// been pulled.
    pub fn catalog(&self) -> ModelCatalog {
        match self {
            BackendKind::Hosted => ModelCatalog::hosted(),
            BackendKind::Ollama => ModelCatalog::open(),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Hosted => "hosted",
            BackendKind::Ollama => "ollama",
        })
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosted" => Ok(BackendKind::Hosted),
            "ollama" => Ok(BackendKind::Ollama),
            other => Err(format!("unknown backend '{other}', expected hosted or ollama")),
        }
    }
}

/// One of the HTTP backends, chosen at runtime.
#[derive(Clone, Debug)]
pub enum HttpBackend {
    Hosted(HostedClient),
    Ollama(OllamaClient),
}

impl HttpBackend {
    /// Build the backend for `kind`, falling back to its default URL.
    pub fn connect(kind: BackendKind, url: Option<&str>, api_key: Option<&str>) -> Self {
        let url = url.unwrap_or(kind.default_url());
        match kind {
            BackendKind::Hosted => {
                let client = HostedClient::new(url);
                HttpBackend::Hosted(match api_key {
                    Some(key) => client.with_api_key(key),
                    None => client,
                })
            }
            BackendKind::Ollama => HttpBackend::Ollama(OllamaClient::new(url)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            HttpBackend::Hosted(_) => BackendKind::Hosted,
            HttpBackend::Ollama(_) => BackendKind::Ollama,
        }
    }
}

#[async_trait]
impl TextGenerator for HttpBackend {
    async fn complete(
        &self,
        model: &ModelId,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LLMError> {
        match self {
            HttpBackend::Hosted(client) => client.complete(model, prompt, params).await,
            HttpBackend::Ollama(client) => client.complete(model, prompt, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("Ollama".parse::<BackendKind>(), Ok(BackendKind::Ollama));
        assert_eq!("hosted".parse::<BackendKind>(), Ok(BackendKind::Hosted));
        assert!("cloud".parse::<BackendKind>().is_err());
    }

    #[test]
    fn connect_uses_default_url() {
        match HttpBackend::connect(BackendKind::Ollama, None, None) {
            HttpBackend::Ollama(client) => assert_eq!(client.base_url, "http://localhost:11434"),
            other => panic!("unexpected backend {other:?}"),
        }
        let hosted = HttpBackend::connect(BackendKind::Hosted, Some("http://x/"), Some("k"));
        assert_eq!(hosted.kind(), BackendKind::Hosted);
    }

    #[test]
    fn default_models_pass_their_catalog() {
        for kind in [BackendKind::Hosted, BackendKind::Ollama] {
            let model: ModelId = kind.default_model().parse().unwrap();
            assert!(kind.catalog().check(&model).is_ok(), "{kind}");
        }
        let hosted = BackendKind::Hosted.catalog();
        assert!(hosted.contains(&"mistral-small-latest".parse().unwrap()));
    }
}
