//! Provider configuration and service construction

use super::openai::OpenAIService;
use super::{LlmError, LlmService, LoggingService};
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the LLM provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible gateway base URL. Authentication is implicit.
    pub gateway: Option<String>,
    pub model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            gateway: get("LLM_GATEWAY"),
            model: get("HUDDLE_MODEL"),
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Create the logging-wrapped service, or `None` without credentials
    pub fn connect(&self) -> Result<Option<Arc<dyn LlmService>>, LlmError> {
        // In gateway mode the gateway handles the actual authentication
        let api_key = match (&self.gateway, &self.openai_api_key) {
            (Some(_), _) => "implicit".to_string(),
            (None, Some(key)) => key.clone(),
            (None, None) => return Ok(None),
        };

        let service = OpenAIService::new(api_key, self.model().to_string(), self.gateway.as_deref())?;
        Ok(Some(Arc::new(LoggingService::new(Arc::new(service)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> LlmConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        LlmConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_no_keys_no_service() {
        let config = config(&[]);
        assert!(config.connect().unwrap().is_none());
        assert_eq!(config.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = config(&[("OPENAI_API_KEY", "  ")]);
        assert_eq!(config.openai_api_key, None);
        assert!(config.connect().unwrap().is_none());
    }

    #[test]
    fn test_key_enables_service() {
        let config = config(&[("OPENAI_API_KEY", "sk-test"), ("HUDDLE_MODEL", "gpt-4o")]);
        let service = config.connect().unwrap().unwrap();
        assert_eq!(service.model_id(), "gpt-4o");
    }

    #[test]
    fn test_gateway_without_key() {
        let config = config(&[("LLM_GATEWAY", "http://169.254.169.254/gateway/llm")]);
        assert_eq!(config.openai_api_key, None);
        assert!(config.connect().unwrap().is_some());
    }
}
