// # dns01-hook - ACME DNS-01 hook for G-Core DNS
//
// Thin integration layer between an ACME client's manual hooks and the
// `dns01-core` reconciler. No DNS logic lives here.
//
// The hook is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Connecting the G-Core client
// 4. Running present (`auth`) or cleanup (`cleanup`) once
//
// ## Configuration
//
// ### Challenge (set by the ACME client)
// - `CERTBOT_DOMAIN`: Domain being validated
// - `CERTBOT_VALIDATION`: Validation value (`auth` only)
//
// ### Credentials (token, or email and password)
// - `GCORE_API_TOKEN`: API token (recommended)
// - `GCORE_EMAIL`: Account login
// - `GCORE_PASSWORD`: Account password
//
// ### Endpoints (optional)
// - `GCORE_API_URL`: Generic API root (`/iam` and `/dns` are derived from it)
// - `GCORE_AUTH_URL`: Auth API root
// - `GCORE_DNS_API_URL`: DNS API root
//
// ### Challenge settings
// - `DNS01_TTL`: TXT record TTL in seconds (default 300)
// - `DNS01_PROPAGATION_SECONDS`: Wait after `auth` (default 10)
// - `DNS01_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export GCORE_API_TOKEN=0123456789abcdef0123456789abcdef01234567
//
// certbot certonly --manual --preferred-challenges dns \
//   --manual-auth-hook "dns01-hook auth" \
//   --manual-cleanup-hook "dns01-hook cleanup" \
//   -d example.com
// ```

use anyhow::{Context, Result};
use dns01_core::{
    ChallengeConfig, ChallengeReconciler, CleanupOutcome, Credentials, Dns01Config,
    EndpointOverrides, PresentOutcome,
};
use dns01_provider_gcore::GcoreClient;
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Label prepended to the validated domain
const CHALLENGE_LABEL: &str = "_acme-challenge";

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum HookExitCode {
    /// Operation completed
    Success = 0,
    /// Configuration error or bad invocation
    ConfigError = 1,
    /// The DNS operation failed
    RuntimeError = 2,
}

impl From<HookExitCode> for ExitCode {
    fn from(code: HookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Hook action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Publish the validation value
    Auth,
    /// Remove the challenge record
    Cleanup,
}

impl Action {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            Some("auth") | Some("present") => Ok(Action::Auth),
            Some("cleanup") => Ok(Action::Cleanup),
            Some(other) => anyhow::bail!(
                "Unknown action '{}'. Usage: dns01-hook <auth|cleanup>",
                other
            ),
            None => anyhow::bail!("Missing action. Usage: dns01-hook <auth|cleanup>"),
        }
    }
}

/// Hook configuration
struct Config {
    action: Action,
    domain: String,
    validation: Option<String>,
    dns01: Dns01Config,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env(action: Action) -> Result<Self> {
        Self::from_lookup(action, |key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(action: Action, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let domain = lookup("CERTBOT_DOMAIN")
            .filter(|d| !d.is_empty())
            .context("CERTBOT_DOMAIN is required")?;

        let validation = lookup("CERTBOT_VALIDATION").filter(|v| !v.is_empty());
        if action == Action::Auth && validation.is_none() {
            anyhow::bail!("CERTBOT_VALIDATION is required for auth");
        }

        let credentials = Credentials::from_parts(
            lookup("GCORE_API_TOKEN"),
            lookup("GCORE_EMAIL"),
            lookup("GCORE_PASSWORD"),
        )?;

        let endpoints = EndpointOverrides {
            api_url: lookup("GCORE_API_URL").filter(|u| !u.is_empty()),
            auth_url: lookup("GCORE_AUTH_URL").filter(|u| !u.is_empty()),
            dns_api_url: lookup("GCORE_DNS_API_URL").filter(|u| !u.is_empty()),
        };

        let mut challenge = ChallengeConfig::default();
        if let Some(ttl) = lookup("DNS01_TTL") {
            challenge.ttl = ttl.parse().with_context(|| {
                format!("DNS01_TTL must be a number of seconds. Got: {}", ttl)
            })?;
        }
        if let Some(seconds) = lookup("DNS01_PROPAGATION_SECONDS") {
            challenge.propagation_seconds = seconds.parse().with_context(|| {
                format!(
                    "DNS01_PROPAGATION_SECONDS must be a number of seconds. Got: {}",
                    seconds
                )
            })?;
        }

        let dns01 = Dns01Config {
            credentials,
            endpoints,
            challenge,
        };
        dns01.validate()?;

        Ok(Self {
            action,
            domain,
            validation,
            dns01,
            log_level: lookup("DNS01_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Name of the challenge TXT record for `domain`
///
/// Wildcard certificates validate on the base name.
fn challenge_record_name(domain: &str) -> String {
    let domain = domain.trim_start_matches("*.").trim_end_matches('.');
    format!("{}.{}", CHALLENGE_LABEL, domain)
}

fn main() -> ExitCode {
    let action = match Action::parse(env::args().nth(1).as_deref()) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    let config = match Config::from_env(action) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_hook(config).await {
            Ok(()) => HookExitCode::Success,
            Err(e) => {
                error!("DNS-01 {:?} failed: {:#}", action, e);
                HookExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run one hook action
async fn run_hook(config: Config) -> Result<()> {
    let record_name = challenge_record_name(&config.domain);

    info!(
        "Running {:?} for {} (record: {}, auth mode: {})",
        config.action,
        config.domain,
        record_name,
        config.dns01.credentials.mode()
    );

    let client = GcoreClient::from_config(&config.dns01)
        .await
        .context("Failed to connect to the G-Core API")?;
    info!("Connected to G-Core DNS API at {}", client.endpoints().dns_api_url);
    let reconciler = ChallengeReconciler::new(Box::new(client));

    // Zone lookup starts from the record name so the certificate domain
    // itself is a candidate apex
    match config.action {
        Action::Auth => {
            let validation = config
                .validation
                .as_deref()
                .context("CERTBOT_VALIDATION is required for auth")?;

            let outcome = reconciler
                .present(&record_name, &record_name, validation, config.dns01.challenge.ttl)
                .await?;
            match outcome {
                PresentOutcome::Created { zone } => {
                    info!("Challenge record created in {}", zone)
                }
                PresentOutcome::Merged { zone, existing, .. } => info!(
                    "Challenge record merged in {} ({} existing values)",
                    zone, existing
                ),
            }

            let wait = Duration::from_secs(config.dns01.challenge.propagation_seconds);
            if !wait.is_zero() {
                info!("Waiting {:?} for DNS propagation", wait);
                tokio::time::sleep(wait).await;
            }
        }
        Action::Cleanup => match reconciler.cleanup(&record_name, &record_name).await? {
            CleanupOutcome::Removed { zone } => info!("Challenge record removed from {}", zone),
            CleanupOutcome::AlreadyAbsent => info!("Challenge record already absent"),
        },
    }

    Ok(())
}
