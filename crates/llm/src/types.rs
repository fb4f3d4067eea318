//! Provider identification.

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAI,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    /// Whether the provider refuses to start without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI)
    }

    /// Endpoint used when the configuration does not name one.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com",
            Self::Ollama => "http://localhost:11434",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("openai"), Some(ProviderType::OpenAI));
        assert_eq!(ProviderType::parse(" Ollama "), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("claude"), None);
    }

    #[test]
    fn test_key_requirement() {
        assert!(ProviderType::OpenAI.requires_api_key());
        assert!(!ProviderType::Ollama.requires_api_key());
        assert_eq!(ProviderType::Ollama.as_str(), "ollama");
    }
}
