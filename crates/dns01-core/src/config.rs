//! Configuration types for DNS-01 challenge handling
//!
//! Credentials are resolved once into a [`Credentials`] variant. Endpoint
//! overrides stay optional here; the provider crate owns the defaults and
//! applies the overrides on top of them.

use serde::Deserialize;

/// Main configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Dns01Config {
    /// Provider credentials
    pub credentials: Credentials,

    /// Optional API endpoint overrides
    #[serde(default)]
    pub endpoints: EndpointOverrides,

    /// Challenge record settings
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

impl Dns01Config {
    /// Create a configuration with default endpoints and challenge settings
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoints: EndpointOverrides::default(),
            challenge: ChallengeConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.credentials.validate()?;
        self.endpoints.validate()?;
        Ok(())
    }
}

/// Provider credentials
///
/// Exactly one authentication mode is carried. The `Debug` implementation
/// never prints the secret parts.
#[derive(Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Credentials {
    /// Static API token, sent as `Authorization: APIKey <token>`
    Token {
        /// API token
        token: String,
    },

    /// Login and password, exchanged for a bearer token before any DNS call
    Basic {
        /// Account login (email)
        login: String,
        /// Account password
        password: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<REDACTED>")
                .finish(),
            Credentials::Basic { login, .. } => f
                .debug_struct("Basic")
                .field("login", login)
                .field("password", &"<REDACTED>")
                .finish(),
        }
    }
}

impl Credentials {
    /// Static token credentials
    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token {
            token: token.into(),
        }
    }

    /// Login/password credentials
    pub fn basic(login: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Resolve credentials from optional parts
    ///
    /// Empty strings count as absent. Supplying a token together with a login
    /// or password, only one of login/password, or nothing at all is a
    /// configuration error.
    pub fn from_parts(
        token: Option<String>,
        login: Option<String>,
        password: Option<String>,
    ) -> Result<Self, crate::Error> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        let (token, login, password) = (present(token), present(login), present(password));

        match (token, login, password) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(crate::Error::config(
                "login and password are not needed when using an API token",
            )),
            (Some(token), None, None) => Ok(Credentials::Token { token }),
            (None, Some(login), Some(password)) => Ok(Credentials::Basic { login, password }),
            (None, None, Some(_)) => Err(crate::Error::config(
                "login is required when using password authentication",
            )),
            (None, Some(_), None) => Err(crate::Error::config(
                "password is required when using password authentication",
            )),
            (None, None, None) => Err(crate::Error::config(
                "either an API token, or login and password are required",
            )),
        }
    }

    /// Validate that no required part is empty
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            Credentials::Token { token } if token.is_empty() => {
                Err(crate::Error::config("API token cannot be empty"))
            }
            Credentials::Basic { login, password } if login.is_empty() || password.is_empty() => {
                Err(crate::Error::config("login and password cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Authentication mode name (for logging)
    pub fn mode(&self) -> &'static str {
        match self {
            Credentials::Token { .. } => "token",
            Credentials::Basic { .. } => "basic",
        }
    }
}

/// Optional API endpoint overrides
///
/// `api_url` is the generic root; `auth_url` and `dns_api_url` are more
/// specific and win over it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointOverrides {
    /// Generic API root (auth and DNS APIs are derived from it)
    #[serde(default)]
    pub api_url: Option<String>,

    /// Auth API root
    #[serde(default)]
    pub auth_url: Option<String>,

    /// DNS API root
    #[serde(default)]
    pub dns_api_url: Option<String>,
}

impl EndpointOverrides {
    /// Set the generic API root
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the auth API root
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Set the DNS API root
    pub fn with_dns_api_url(mut self, url: impl Into<String>) -> Self {
        self.dns_api_url = Some(url.into());
        self
    }

    /// Validate that every override uses an http or https scheme
    pub fn validate(&self) -> Result<(), crate::Error> {
        let all = [
            ("api_url", &self.api_url),
            ("auth_url", &self.auth_url),
            ("dns_api_url", &self.dns_api_url),
        ];

        for (name, value) in all {
            let Some(value) = value else { continue };
            let url = url::Url::parse(value).map_err(|e| {
                crate::Error::config(format!("{} is not a valid URL \"{}\": {}", name, value, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(crate::Error::config(format!(
                    "{} must use an http or https scheme, got: {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Challenge record settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeConfig {
    /// TTL of the challenge TXT record (seconds)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Seconds the host waits for propagation after creating the record
    ///
    /// Only the hook uses this; the reconciler never sleeps.
    #[serde(default = "default_propagation_seconds")]
    pub propagation_seconds: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            propagation_seconds: default_propagation_seconds(),
        }
    }
}

fn default_ttl() -> u32 {
    300
}

fn default_propagation_seconds() -> u64 {
    10
}
