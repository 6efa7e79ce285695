use url::Url;

use crate::error::ConfigError;

pub const API_URL_ENV: &str = "QUIZ_API_URL";
pub const API_TOKEN_ENV: &str = "QUIZ_API_TOKEN";
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Where the quiz service lives and how to authenticate against it.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
    pub token: Option<String>,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) url.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url.trim()).map_err(|err| ConfigError::InvalidUrl {
            raw: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        let token = token.filter(|t| !t.trim().is_empty());
        Ok(Self {
            base_url: parsed,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_urls_and_drops_blank_tokens() {
        let config = ApiConfig::new("https://quiz.example.com/api", Some("  ".into())).unwrap();
        assert_eq!(config.base_url.host_str(), Some("quiz.example.com"));
        assert!(config.token.is_none());
    }

    #[test]
    fn rejects_other_schemes() {
        let err = ApiConfig::new("ftp://quiz.example.com", None).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(scheme) if scheme == "ftp"));
    }

    #[test]
    fn rejects_relative_urls() {
        assert!(matches!(
            ApiConfig::new("/api", None),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
