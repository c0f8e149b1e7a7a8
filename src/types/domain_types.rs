use super::ValidationError;
use serde::{Deserialize, Serialize};
use url::Url;

/// API key for the public Notion API.
///
/// Validated at construction so a typo'd key fails at configuration time
/// instead of as a 401 halfway through a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if !key.starts_with("secret_") && !key.starts_with("ntn_") {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must start with 'secret_' or 'ntn_'".to_string(),
            });
        }

        if key.len() < 20 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keys never appear in logs or error messages.
impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(****)")
    }
}

/// Credentials for the unofficial search endpoint: the `token_v2` cookie
/// and the active-user header of a logged-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    pub token_v2: String,
    pub active_user: String,
}

impl SearchCredentials {
    pub fn new(
        token_v2: impl Into<String>,
        active_user: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let token_v2 = token_v2.into();
        let active_user = active_user.into();
        if token_v2.is_empty() {
            return Err(ValidationError::EmptyField("token_v2"));
        }
        if active_user.is_empty() {
            return Err(ValidationError::EmptyField("active_user"));
        }
        Ok(Self {
            token_v2,
            active_user,
        })
    }
}

/// A URL validated to be http(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        match Url::parse(url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(ValidationError::InvalidUrl {
                        url: url.to_string(),
                        reason: "Only HTTP and HTTPS URLs are supported".to_string(),
                    });
                }
                Ok(Self(parsed))
            }
            Err(e) => Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for ValidatedUrl {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ValidatedUrl> for String {
    fn from(url: ValidatedUrl) -> Self {
        url.0.into()
    }
}

impl std::fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_validation() {
        assert!(ApiKey::new("secret_abcdefghijklmnop").is_ok());
        assert!(ApiKey::new("ntn_abcdefghijklmnopqrs").is_ok());
        assert!(ApiKey::new("").is_err());
        assert!(ApiKey::new("plaintext-key-long-enough").is_err());
        assert!(ApiKey::new("secret_short").is_err());
    }

    #[test]
    fn api_key_display_is_redacted() {
        let key = ApiKey::new("secret_abcdefghijklmnop").unwrap();
        assert_eq!(key.to_string(), "ApiKey(****)");
    }

    #[test]
    fn validated_url_rejects_non_http() {
        assert!(ValidatedUrl::parse("https://example.com/a").is_ok());
        assert!(ValidatedUrl::parse("ftp://example.com").is_err());
        assert!(ValidatedUrl::parse("not a url").is_err());
    }
}
