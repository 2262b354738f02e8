use std::env;
use std::time::Duration;

pub const ENV_REGION: &str = "TENCENTCLOUD_REGION";
pub const ENV_SECRET_ID: &str = "TENCENTCLOUD_SECRETID";
pub const ENV_SECRET_KEY: &str = "TENCENTCLOUD_SECRETKEY";
pub const ENV_SESSION_TOKEN: &str = "TENCENTCLOUD_SESSIONTOKEN";
pub const ENV_RUN_ENV: &str = "TENCENTCLOUD_RUNENV";

pub const DEFAULT_REGION: &str = "ap-guangzhou";
pub const PUBLIC_ENDPOINT: &str = "scf.tencentcloudapi.com";
pub const INTERNAL_ENDPOINT: &str = "scf.internal.tencentcloudapi.com";

/// Value of `TENCENTCLOUD_RUNENV` inside the provider's own compute environment.
const SCF_RUN_ENV: &str = "SCF";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Values supplied by the caller when building a client. Anything left unset
/// is looked up from the environment on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub region: Option<String>,
    pub secret_id: Option<String>,
    pub secret_key: Option<String>,
    pub token: Option<String>,
}

impl ClientOptions {
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn secret_id(mut self, secret_id: impl Into<String>) -> Self {
        self.secret_id = Some(secret_id.into());
        self
    }

    #[must_use]
    pub fn secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Resolve against the process environment.
    #[must_use]
    pub fn resolve(&self) -> ResolvedConfig {
        self.resolve_with(|key| env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    ///
    /// Explicit values win; empty strings on either side count as unset.
    pub fn resolve_with<F>(&self, lookup: F) -> ResolvedConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: &Option<String>, key: &str| {
            non_empty(explicit.clone()).or_else(|| non_empty(lookup(key)))
        };

        ResolvedConfig {
            region: pick(&self.region, ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            credential: Credential {
                secret_id: pick(&self.secret_id, ENV_SECRET_ID),
                secret_key: pick(&self.secret_key, ENV_SECRET_KEY),
                token: pick(&self.token, ENV_SESSION_TOKEN),
            },
            profile: HttpProfile::new(Endpoint::from_run_env(lookup(ENV_RUN_ENV).as_deref())),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Credentials handed to the API client for one call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub secret_id: Option<String>,
    pub secret_key: Option<String>,
    pub token: Option<String>,
}

impl Credential {
    #[must_use]
    pub fn new(secret_id: Option<String>, secret_key: Option<String>, token: Option<String>) -> Self {
        Self {
            secret_id,
            secret_key,
            token,
        }
    }
}

// Keep secrets out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Public,
    Internal,
}

impl Endpoint {
    #[must_use]
    pub fn from_run_env(run_env: Option<&str>) -> Self {
        if run_env == Some(SCF_RUN_ENV) {
            Endpoint::Internal
        } else {
            Endpoint::Public
        }
    }

    #[must_use]
    pub fn host(self) -> &'static str {
        match self {
            Endpoint::Public => PUBLIC_ENDPOINT,
            Endpoint::Internal => INTERNAL_ENDPOINT,
        }
    }
}

/// Connection settings for the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProfile {
    pub endpoint: String,
    pub req_timeout: Duration,
    pub keep_alive: bool,
}

impl HttpProfile {
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint: endpoint.host().to_string(),
            req_timeout: REQUEST_TIMEOUT,
            keep_alive: true,
        }
    }
}

/// Everything one invocation needs, fixed at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub region: String,
    pub credential: Credential,
    pub profile: HttpProfile,
}
