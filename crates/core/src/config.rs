use std::collections::HashMap;
use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_S3_DLAKE: &str = "globalphidelist.tech";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_WORKGROUP: &str = "primary";
pub const DEFAULT_S3_DATA: &str = "undefined";
pub const DEFAULT_ATHENA_DB: &str = "athena_db";
pub const DEFAULT_ATHENA_OUTPUT: &str = "undefined";

/// Glue catalog every Athena account ships with.
pub const DEFAULT_CATALOG: &str = "AwsDataCatalog";
pub const DEFAULT_DAG_ID: &str = "athena-create";
/// 0 means no limit: table statements are polled until they finish.
const DEFAULT_TIMEOUT_SECONDS: u32 = 0;

/// Names accepted as pipeline parameters (environment or `--var name=value`).
pub const PARAM_NAMES: &[&str] = &[
    "s3_dlake",
    "region",
    "workgroup",
    "s3_data",
    "athena_db",
    "athena_output",
];

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Map a pipeline parameter name onto its environment key(s).
fn param_from_env(profile: &str, name: &str) -> Option<String> {
    match name {
        "s3_dlake" => profiled_env_opt(profile, "S3_DLAKE"),
        "region" => profiled_env_opt(profile, "ATHENA_REGION")
            .or_else(|| profiled_env_opt(profile, "AWS_REGION")),
        "workgroup" => profiled_env_opt(profile, "ATHENA_WORKGROUP"),
        "s3_data" => profiled_env_opt(profile, "S3_DATA"),
        "athena_db" => profiled_env_opt(profile, "ATHENA_DB"),
        "athena_output" => profiled_env_opt(profile, "ATHENA_OUTPUT"),
        _ => None,
    }
}

fn reject_unknown(vars: &HashMap<String, String>) -> Result<(), ConfigError> {
    match vars.keys().find(|k| !PARAM_NAMES.contains(&k.as_str())) {
        Some(unknown) => Err(ConfigError::UnknownParameter(unknown.clone())),
        None => Ok(()),
    }
}

/// Strip an `s3://` scheme and trailing slashes so paths can be joined uniformly.
fn normalize_dlake(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("s3://")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

// ── Pipeline parameters ───────────────────────────────────────

/// The six named parameters the provisioning DAG is driven by.
///
/// Every parameter has a documented default; resolution never fails for a
/// missing value, only for a value that cannot be used (see [`ProvisionParams::validate`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionParams {
    /// Data-lake root (bucket plus optional prefix, no scheme).
    pub s3_dlake: String,
    pub region: String,
    pub workgroup: String,
    /// Raw-data location inside the lake. Informational only.
    pub s3_data: String,
    /// Target Athena database.
    pub athena_db: String,
    /// Prefix prepended to each step's result output name.
    pub athena_output: String,
}

impl Default for ProvisionParams {
    fn default() -> Self {
        Self {
            s3_dlake: DEFAULT_S3_DLAKE.to_string(),
            region: DEFAULT_REGION.to_string(),
            workgroup: DEFAULT_WORKGROUP.to_string(),
            s3_data: DEFAULT_S3_DATA.to_string(),
            athena_db: DEFAULT_ATHENA_DB.to_string(),
            athena_output: DEFAULT_ATHENA_OUTPUT.to_string(),
        }
    }
}

impl ProvisionParams {
    /// Resolve every parameter through `lookup`, falling back to the defaults
    /// for anything absent or blank.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let params = Self {
            s3_dlake: normalize_dlake(&get("s3_dlake", DEFAULT_S3_DLAKE)),
            region: get("region", DEFAULT_REGION),
            workgroup: get("workgroup", DEFAULT_WORKGROUP),
            s3_data: get("s3_data", DEFAULT_S3_DATA),
            athena_db: get("athena_db", DEFAULT_ATHENA_DB),
            athena_output: get("athena_output", DEFAULT_ATHENA_OUTPUT),
        };
        params.validate()?;
        Ok(params)
    }

    /// Resolve from an explicit name → value mapping only.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        reject_unknown(vars)?;
        Self::resolve(|name| vars.get(name).cloned())
    }

    /// Resolve from the environment, with `overrides` taking precedence.
    pub fn from_env_profiled(
        profile: &str,
        overrides: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        reject_unknown(overrides)?;
        Self::resolve(|name| {
            overrides
                .get(name)
                .cloned()
                .or_else(|| param_from_env(profile, name))
        })
    }

    /// The database name is spliced into DDL text, so it is restricted to a
    /// plain identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.athena_db.is_empty()
            || !self
                .athena_db
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidParameter {
                name: "athena_db".into(),
                reason: format!(
                    "'{}' is not a valid database identifier (letters, digits, '_')",
                    self.athena_db
                ),
            });
        }
        if self.s3_dlake.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "s3_dlake".into(),
                reason: "data lake location is empty".into(),
            });
        }
        Ok(())
    }

    /// `s3://<s3_dlake>`
    pub fn data_lake_uri(&self) -> String {
        format!("s3://{}", self.s3_dlake)
    }

    /// Storage location of a raw movielens table: `s3://<s3_dlake>/movielens/<table>/`.
    pub fn table_location(&self, table: &str) -> String {
        format!("s3://{}/movielens/{}/", self.s3_dlake, table)
    }

    /// Result location for a named step: `s3://<s3_dlake>/<athena_output><name>`.
    pub fn step_output_location(&self, name: &str) -> String {
        format!("s3://{}/{}{}", self.s3_dlake, self.athena_output, name)
    }

    /// Result location for ad-hoc statements such as `CREATE DATABASE`.
    pub fn query_output_location(&self) -> String {
        format!("s3://{}/queries/", self.s3_dlake)
    }
}

// ── Credentials ───────────────────────────────────────────────

/// Static AWS key pair resolved from the active connection profile.
///
/// `Debug` never prints any of the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl AwsCredentials {
    /// Returns `Ok(None)` when no key pair is configured, which means the AWS
    /// default provider chain should be used instead.
    pub fn from_env_profiled(profile: &str) -> Result<Option<Self>, ConfigError> {
        let access_key_id = profiled_env_opt(profile, "AWS_ACCESS_KEY_ID");
        let secret_access_key = profiled_env_opt(profile, "AWS_SECRET_ACCESS_KEY");

        match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Ok(Some(Self {
                access_key_id,
                secret_access_key,
                session_token: profiled_env_opt(profile, "AWS_SESSION_TOKEN"),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::IncompleteCredentials(
                "AWS_ACCESS_KEY_ID is set but AWS_SECRET_ACCESS_KEY is not".into(),
            )),
            (None, Some(_)) => Err(ConfigError::IncompleteCredentials(
                "AWS_SECRET_ACCESS_KEY is set but AWS_ACCESS_KEY_ID is not".into(),
            )),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Label attached to every run report.
    pub dag_id: String,
    pub params: ProvisionParams,
    /// Data catalog queried by the existence check.
    pub catalog: String,
    /// Completion wait for table statements, in seconds; 0 = unbounded.
    pub timeout_seconds: u32,
    pub endpoint_url: Option<String>,
    #[serde(skip)]
    pub credentials: Option<AwsCredentials>,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SCIFI_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env(overrides: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let profile = env_opt("SCIFI_PROFILE").unwrap_or_default();
        Self::for_profile(&profile, overrides)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(
        profile: &str,
        overrides: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Ok(Self {
            profile: p.to_string(),
            dag_id: profiled_env_or(p, "DAG_ID", DEFAULT_DAG_ID),
            params: ProvisionParams::from_env_profiled(p, overrides)?,
            catalog: profiled_env_or(p, "ATHENA_CATALOG", DEFAULT_CATALOG),
            timeout_seconds: profiled_env_u32(p, "ATHENA_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS),
            endpoint_url: profiled_env_opt(p, "AWS_ENDPOINT_URL"),
            credentials: AwsCredentials::from_env_profiled(p)?,
        })
    }

    /// Config built purely from a parameter mapping, no environment access.
    pub fn from_params(params: ProvisionParams) -> Self {
        Self {
            profile: String::new(),
            dag_id: DEFAULT_DAG_ID.to_string(),
            params,
            catalog: DEFAULT_CATALOG.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            endpoint_url: None,
            credentials: None,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  dag:         {}", self.dag_id);
        tracing::info!("  athena:      region={}, workgroup={}, catalog={}", self.params.region, self.params.workgroup, self.catalog);
        tracing::info!("  database:    {}", self.params.athena_db);
        tracing::info!("  data lake:   {}", self.params.data_lake_uri());
        tracing::info!("  credentials: {}", if self.credentials.is_some() { "static key pair" } else { "default provider chain" });
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "dag_id": self.dag_id,
            "params": self.params,
            "catalog": self.catalog,
            "timeout_seconds": self.timeout_seconds,
            "endpoint_url": self.endpoint_url,
            "credentials": {
                "static": self.credentials.is_some(),
            },
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────
