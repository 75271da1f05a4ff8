// # G-Core DNS Provider
//
// This crate provides the G-Core DNS API client used by the DNS-01 challenge
// reconciler.
//
// ## Behaviour
//
// - ✅ Static API token (`Authorization: APIKey <token>`) or login/password
//   exchanged once for a JWT (`Authorization: Bearer <jwt>`)
// - ✅ HTTP timeout configured (10 seconds)
// - ✅ Status classification: 400/500 → Api, 404 → NotFound, 409 → Conflict,
//   anything else → Transport
// - ✅ Base URLs validated (http/https) before any request is built
// - ❌ NO retry logic (a failed operation is reported to the host agent)
// - ❌ NO caching of zones or records
//
// ## Security Requirements
//
// - Token, password and JWT NEVER appear in logs or `Debug` output
//
// ## API Reference
//
// - Login: POST `{auth}/auth/jwt/login` `{username, password}` → `{access}`
// - List Zones: GET `{dns}/v2/zones?name=...&limit=...`
// - Get Zone: GET `{dns}/v2/zones/:zone`
// - RRSet: GET | POST | PUT | DELETE `{dns}/v2/zones/:zone/:name/:type`

use async_trait::async_trait;
use dns01_core::config::{Credentials, Dns01Config, EndpointOverrides};
use dns01_core::traits::{RRSet, RecordType, Zone, ZoneApi, ZoneFilter, ZoneSummary};
use dns01_core::{Error, Result};
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default G-Core DNS API root
pub const DEFAULT_DNS_API_URL: &str = "https://api.gcorelabs.com/dns";

/// Default G-Core IAM (auth) API root
pub const DEFAULT_AUTH_URL: &str = "https://api.gcorelabs.com/iam";

/// Default HTTP timeout for API requests (10 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the zones collection below the DNS API root
const ZONES_ROOT: [&str; 2] = ["v2", "zones"];

/// Resolved API roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Auth API root
    pub auth_url: String,
    /// DNS API root
    pub dns_api_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            dns_api_url: DEFAULT_DNS_API_URL.to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Apply overrides on top of the defaults
    ///
    /// Precedence, later wins: defaults, then the generic `api_url`
    /// (`<api_url>/iam` and `<api_url>/dns`), then `dns_api_url`, then
    /// `auth_url`. Both resolved roots must be http(s) URLs.
    pub fn resolve(overrides: &EndpointOverrides) -> Result<Self> {
        let mut endpoints = Self::default();

        if let Some(ref api_url) = overrides.api_url {
            endpoints.auth_url = build_url(api_url, &["iam"])?.to_string();
            endpoints.dns_api_url = build_url(api_url, &["dns"])?.to_string();
        }
        if let Some(ref dns_api_url) = overrides.dns_api_url {
            endpoints.dns_api_url = dns_api_url.clone();
        }
        if let Some(ref auth_url) = overrides.auth_url {
            endpoints.auth_url = auth_url.clone();
        }

        build_url(&endpoints.auth_url, &[])?;
        build_url(&endpoints.dns_api_url, &[])?;

        Ok(endpoints)
    }
}

/// Join path segments onto an http(s) base URL
///
/// Each segment is percent-encoded as a single path component; a trailing
/// slash on `base` is ignored.
pub fn build_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| Error::config(format!("Invalid URL \"{}\": {}", base, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Invalid URL scheme, please check schema in url: \"{}\"",
            base
        )));
    }

    url.path_segments_mut()
        .map_err(|_| Error::config(format!("URL cannot be used as a base: \"{}\"", base)))?
        .pop_if_empty()
        .extend(segments.iter().map(|s| s.trim_matches('/')));

    Ok(url)
}

/// Authorization header derived from the credentials
///
/// Created once per client; immutable afterwards.
#[derive(Clone)]
pub struct Session {
    authorization: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("scheme", &self.scheme())
            .field("authorization", &"<REDACTED>")
            .finish()
    }
}

impl Session {
    /// Authorization scheme ("APIKey" or "Bearer")
    pub fn scheme(&self) -> &str {
        self.authorization
            .split_once(' ')
            .map(|(scheme, _)| scheme)
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    access: Option<String>,
}

#[derive(Deserialize)]
struct ZonesResponse {
    zones: Vec<ZoneSummary>,
}

/// Build a session from credentials
///
/// Token credentials need no network call. Login/password credentials are
/// exchanged at `{auth_url}/auth/jwt/login` for an access token.
///
/// # Errors
///
/// - `Error::Auth` on a non-2xx login response or a missing access token
/// - `Error::Transport` if the login request cannot be sent or its response
///   body cannot be read
pub async fn authenticate(
    http: &reqwest::Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<Session> {
    let (login, password) = match credentials {
        Credentials::Token { token } => {
            return Ok(Session {
                authorization: format!("APIKey {}", token),
            });
        }
        Credentials::Basic { login, password } => (login, password),
    };

    let url = build_url(auth_url, &["auth", "jwt", "login"])?;
    tracing::debug!("Requesting G-Core access token for {} at {}", login, url);

    let response = http
        .post(url.clone())
        .json(&serde_json::json!({ "username": login, "password": password }))
        .send()
        .await
        .map_err(|e| Error::transport(format!("POST {} failed: {}", url, e)))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| Error::transport(format!("Failed to read login response: {}", e)))?;

    if !status.is_success() {
        return Err(Error::auth(format!(
            "login at {} returned {}: {}",
            url, status, text
        )));
    }

    let token = serde_json::from_str::<LoginResponse>(&text)
        .ok()
        .and_then(|r| r.access)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::auth("login response did not contain an access token"))?;

    Ok(Session {
        authorization: format!("Bearer {}", token),
    })
}

/// G-Core DNS API client
///
/// Holds only the immutable session and a pooled HTTP client, so one
/// instance can serve concurrent operations on different records.
pub struct GcoreClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
    session: Session,
}

impl std::fmt::Debug for GcoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcoreClient")
            .field("endpoints", &self.endpoints)
            .field("session", &self.session)
            .finish()
    }
}

impl GcoreClient {
    /// Create an authenticated client
    ///
    /// Endpoints are resolved and validated before any network call. With
    /// login/password credentials the token exchange happens here.
    pub async fn connect(
        credentials: &Credentials,
        overrides: &EndpointOverrides,
    ) -> Result<Self> {
        credentials.validate()?;
        let endpoints = ApiEndpoints::resolve(overrides)?;

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        let session = authenticate(&http, &endpoints.auth_url, credentials).await?;

        tracing::debug!(
            "G-Core client ready (auth mode: {}, dns api: {})",
            credentials.mode(),
            endpoints.dns_api_url
        );

        Ok(Self {
            http,
            endpoints,
            session,
        })
    }

    /// Create an authenticated client from the full configuration
    pub async fn from_config(config: &Dns01Config) -> Result<Self> {
        config.validate()?;
        Self::connect(&config.credentials, &config.endpoints).await
    }

    /// Resolved API roots
    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Authenticated session
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn zones_url(&self, items: &[&str]) -> Result<Url> {
        let segments: Vec<&str> = ZONES_ROOT.iter().chain(items).copied().collect();
        build_url(&self.endpoints.dns_api_url, &segments)
    }

    fn rrset_url(&self, zone: &str, name: &str, record_type: RecordType) -> Result<Url> {
        self.zones_url(&[zone, name, record_type.as_str()])
    }

    /// Send an authenticated request and classify the response status
    ///
    /// Returns the response body on 2xx.
    async fn execute(&self, method: Method, url: Url, body: Option<&RRSet>) -> Result<String> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, self.session.authorization.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        if status.is_success() {
            return Ok(text);
        }

        let payload = match body {
            Some(body) => serde_json::to_string(body)?,
            None => String::new(),
        };
        let context = format!(
            "Error {}. {}: {}, data: \"{}\", response: {}",
            status.as_u16(),
            method,
            url,
            payload,
            text
        );

        match status.as_u16() {
            400 | 500 => {
                tracing::error!("{}", context);
                Err(Error::api(context))
            }
            404 => Err(Error::not_found(context)),
            409 => Err(Error::conflict(context)),
            _ => Err(Error::transport(context)),
        }
    }
}

#[async_trait]
impl ZoneApi for GcoreClient {
    async fn list_zones(&self, filter: &ZoneFilter) -> Result<Vec<ZoneSummary>> {
        let mut url = self.zones_url(&[])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(ref name) = filter.name {
                query.append_pair("name", name);
            }
            if let Some(limit) = filter.limit {
                query.append_pair("limit", &limit.to_string());
            }
        }

        let text = self.execute(Method::GET, url, None).await?;
        let zones: ZonesResponse = serde_json::from_str(&text)?;

        tracing::debug!("Listed {} zones", zones.zones.len());
        Ok(zones.zones)
    }

    async fn get_zone(&self, name: &str) -> Result<Zone> {
        let url = self.zones_url(&[name])?;
        let text = self.execute(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn get_rrset(&self, zone: &str, name: &str, record_type: RecordType) -> Result<RRSet> {
        let url = self.rrset_url(zone, name, record_type)?;
        let text = self.execute(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn create_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        rrset: &RRSet,
    ) -> Result<()> {
        let url = self.rrset_url(zone, name, record_type)?;
        self.execute(Method::POST, url, Some(rrset)).await?;
        Ok(())
    }

    async fn update_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        rrset: &RRSet,
    ) -> Result<()> {
        let url = self.rrset_url(zone, name, record_type)?;
        self.execute(Method::PUT, url, Some(rrset)).await?;
        Ok(())
    }

    async fn delete_rrset(&self, zone: &str, name: &str, record_type: RecordType) -> Result<()> {
        let url = self.rrset_url(zone, name, record_type)?;
        self.execute(Method::DELETE, url, None).await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "gcore"
    }
}
