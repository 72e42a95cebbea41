//! System-under-test configuration profiles.
//!
//! A profile is selected once at process start ([`SutSelection::select`]) and
//! then passed by reference to whatever needs it. Nothing here is global or
//! mutated after construction; switching to OAuth produces a new value.

use crate::errors::{CompareError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ehrtest_core_types::Sensitive;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const BASE_URL: &str = "http://localhost:8080/ehrbase/rest/openehr/v1";
const HEARTBEAT_URL: &str = "http://localhost:8080/ehrbase/";
const NODE_NAME: &str = "local.ehrbase.org";
const KEYCLOAK_URL: &str = "http://localhost:8081/auth";
const KEYCLOAK_REALM_PATH: &str = "/realms/ehrbase";
const DEFAULT_USER: &str = "ehrbase-user";
const DEFAULT_PASSWORD: &str = "SuperSecretPassword";

/// Which server deployment the tests target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SutKind {
    /// Local development server started by hand
    Dev,
    /// CI server whose lifecycle the test run controls
    Test,
}

impl fmt::Display for SutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SutKind::Dev => f.write_str("DEV"),
            SutKind::Test => f.write_str("TEST"),
        }
    }
}

impl FromStr for SutKind {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEV" => Ok(SutKind::Dev),
            "TEST" => Ok(SutKind::Test),
            other => Err(CompareError::configuration(
                "sut",
                format!("unknown SUT `{}` (DEV|TEST)", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthType {
    Basic,
    OAuth,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::Basic => f.write_str("BASIC"),
            AuthType::OAuth => f.write_str("OAUTH"),
        }
    }
}

impl FromStr for AuthType {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASIC" => Ok(AuthType::Basic),
            "OAUTH" => Ok(AuthType::OAuth),
            other => Err(CompareError::configuration(
                "auth_type",
                format!("unknown auth type `{}` (BASIC|OAUTH)", other),
            )),
        }
    }
}

/// Who starts and stops the server and its database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    Manual,
    Docker,
}

/// Login and password pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(serialize_with = "redacted")]
    pub password: Sensitive<String>,
}

/// Resource-owner password grant sent to the token endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OAuthGrant {
    pub client_id: String,
    pub scope: String,
    pub username: String,
    #[serde(serialize_with = "redacted")]
    pub password: Sensitive<String>,
    pub grant_type: String,
}

/// Keycloak endpoints used by the OAuth flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeycloakUrls {
    pub base_url: String,
    pub auth_url: String,
    pub access_token_url: String,
}

impl KeycloakUrls {
    fn local() -> Self {
        let realm = format!("{}{}", KEYCLOAK_URL, KEYCLOAK_REALM_PATH);
        Self {
            base_url: KEYCLOAK_URL.to_string(),
            auth_url: format!("{}/protocol/openid-connect/auth", realm),
            access_token_url: format!("{}/protocol/openid-connect/token", realm),
        }
    }

    pub fn jwt_issuer_uri(&self) -> String {
        format!("{}{}", self.base_url, KEYCLOAK_REALM_PATH)
    }
}

/// Everything a test run needs to know about its target server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SutConfig {
    pub sut: SutKind,
    pub base_url: String,
    pub heartbeat_url: String,
    pub credentials: Credentials,
    pub auth_type: AuthType,
    /// Value the server stamps as `CREATING_SYSTEM_ID`
    pub node_name: String,
    pub control_mode: ControlMode,
    pub oauth_grant: OAuthGrant,
    pub jwt_issuer_uri: String,
    pub oauth_name: String,
    pub oauth_email: String,
    pub keycloak: KeycloakUrls,
}

impl SutConfig {
    /// Local development server, started manually
    pub fn dev() -> Self {
        Self::base(
            SutKind::Dev,
            ControlMode::Manual,
            OAuthGrant {
                client_id: "ehrbase-client".to_string(),
                scope: "openid".to_string(),
                username: "ehrbase".to_string(),
                password: "ehrbase".into(),
                grant_type: "password".to_string(),
            },
            "Ehr Base",
            "ehrbase@ehrbase.org",
        )
    }

    /// CI server, lifecycle handled by the test run
    pub fn test() -> Self {
        Self::base(
            SutKind::Test,
            ControlMode::Docker,
            OAuthGrant {
                client_id: "ehrbase-robot".to_string(),
                scope: "openid".to_string(),
                username: "robot".to_string(),
                password: "robot".into(),
                grant_type: "password".to_string(),
            },
            "Robot Framework",
            "robot@ehrbase.org",
        )
    }

    fn base(
        sut: SutKind,
        control_mode: ControlMode,
        oauth_grant: OAuthGrant,
        oauth_name: &str,
        oauth_email: &str,
    ) -> Self {
        let keycloak = KeycloakUrls::local();
        Self {
            sut,
            base_url: BASE_URL.to_string(),
            heartbeat_url: HEARTBEAT_URL.to_string(),
            credentials: Credentials {
                username: DEFAULT_USER.to_string(),
                password: DEFAULT_PASSWORD.into(),
            },
            auth_type: AuthType::Basic,
            node_name: NODE_NAME.to_string(),
            control_mode,
            oauth_grant,
            jwt_issuer_uri: keycloak.jwt_issuer_uri(),
            oauth_name: oauth_name.to_string(),
            oauth_email: oauth_email.to_string(),
            keycloak,
        }
    }

    pub fn with_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;
        self
    }

    /// Value for the `Authorization` header.
    ///
    /// Basic auth is derived from the credentials. OAuth needs an access token
    /// obtained by the caller from `keycloak.access_token_url`.
    ///
    /// # Errors
    ///
    /// `CompareError::Configuration` when the profile uses OAuth and no token
    /// was supplied.
    pub fn authorization_header(
        &self,
        token: Option<&Sensitive<String>>,
    ) -> Result<Sensitive<String>> {
        match self.auth_type {
            AuthType::Basic => {
                let pair = format!(
                    "{}:{}",
                    self.credentials.username,
                    self.credentials.password.expose()
                );
                Ok(Sensitive::new(format!("Basic {}", STANDARD.encode(pair))))
            }
            AuthType::OAuth => token
                .map(|t| Sensitive::new(format!("Bearer {}", t.expose())))
                .ok_or_else(|| {
                    CompareError::configuration(
                        "access_token",
                        "OAuth profile requires an access token",
                    )
                }),
        }
    }
}

fn redacted<S: serde::Serializer>(
    value: &Sensitive<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Raw profile choice as given on the command line or in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SutSelection {
    pub sut: SutKind,
    pub auth_type: AuthType,
    /// Server is already running outside of docker
    pub no_docker: bool,
}

impl Default for SutSelection {
    fn default() -> Self {
        Self {
            sut: SutKind::Test,
            auth_type: AuthType::Basic,
            no_docker: false,
        }
    }
}

impl SutSelection {
    /// Read `SUT`, `AUTH_TYPE` and `NODOCKER` from the process environment.
    ///
    /// Unset variables fall back to the defaults. `NODOCKER` counts as set
    /// when it is empty or `true` (any case).
    ///
    /// # Errors
    ///
    /// `CompareError::Configuration` for unknown `SUT` or `AUTH_TYPE` values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SutSelection::from_env`] with an injectable lookup.
    ///
    /// # Errors
    ///
    /// See [`SutSelection::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let sut = match lookup("SUT") {
            Some(v) => v.parse()?,
            None => defaults.sut,
        };
        let auth_type = match lookup("AUTH_TYPE") {
            Some(v) => v.parse()?,
            None => defaults.auth_type,
        };
        let no_docker = lookup("NODOCKER")
            .map(|v| no_docker_flag(&v))
            .unwrap_or(defaults.no_docker);
        Ok(Self {
            sut,
            auth_type,
            no_docker,
        })
    }

    /// Resolve to a concrete profile.
    ///
    /// OAuth against a dev server or a non-docker server uses the dev
    /// profile; OAuth against test uses the test profile. With basic auth a
    /// dev or non-docker selection uses dev, anything else uses test.
    pub fn select(&self) -> SutConfig {
        let config = match (self.auth_type, self.sut, self.no_docker) {
            (AuthType::OAuth, SutKind::Dev, _) | (AuthType::OAuth, _, true) => SutConfig::dev(),
            (AuthType::OAuth, SutKind::Test, false) => SutConfig::test(),
            (AuthType::Basic, SutKind::Dev, _) | (AuthType::Basic, _, true) => SutConfig::dev(),
            (AuthType::Basic, SutKind::Test, false) => SutConfig::test(),
        };
        tracing::debug!(
            requested = %self.sut,
            selected = %config.sut,
            auth_type = %self.auth_type,
            no_docker = self.no_docker,
            "SUT profile selected"
        );
        config.with_auth_type(self.auth_type)
    }
}

fn no_docker_flag(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("true")
}
