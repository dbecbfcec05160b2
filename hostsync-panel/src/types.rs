use serde::{Deserialize, Serialize};

// ============ Resource Kinds ============

/// The kinds of hosting resources a control panel manages per account.
///
/// Serialized as kebab-case strings (`"domain"`, `"database-user"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Web domain (add-on, parked or main domain).
    Domain,
    /// Database.
    Database,
    /// Database login.
    DatabaseUser,
    /// Mailbox.
    Mailbox,
    /// FTP login.
    FtpAccount,
}

impl ResourceKind {
    /// All kinds, in the order reconciliation walks them.
    ///
    /// Databases come before database users so that a user's grants can refer
    /// to a database that was created in the same pass.
    pub const ALL: [Self; 5] = [
        Self::Domain,
        Self::Database,
        Self::DatabaseUser,
        Self::Mailbox,
        Self::FtpAccount,
    ];

    /// Stable string form, also used as the storage discriminator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Database => "database",
            Self::DatabaseUser => "database-user",
            Self::Mailbox => "mailbox",
            Self::FtpAccount => "ftp-account",
        }
    }

    /// Parse the string form produced by [`as_str`](Self::as_str).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ Remote Resource Shapes ============

/// A web domain as the panel reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDomain {
    /// Fully qualified domain name.
    pub domain: String,
    /// Document root relative to the account home.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_root: Option<String>,
    /// PHP handler version, if the panel manages one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_version: Option<String>,
    /// Whether TLS is enabled for the domain.
    #[serde(default)]
    pub ssl_enabled: bool,
}

/// A database as the panel reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDatabase {
    /// Database name, including any panel-enforced account prefix.
    pub name: String,
    /// Default character set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
}

/// A database login as the panel reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDatabaseUser {
    /// Login name.
    pub username: String,
    /// Host the login may connect from (`"localhost"`, `"%"`, ...).
    #[serde(default = "default_db_host")]
    pub host: String,
    /// Databases this login has privileges on.
    #[serde(default)]
    pub databases: Vec<String>,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

/// A mailbox as the panel reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelMailbox {
    /// Full e-mail address.
    pub email: String,
    /// Quota in megabytes; `None` means unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_mb: Option<u64>,
    /// Whether the mailbox is suspended for incoming mail.
    #[serde(default)]
    pub suspended: bool,
}

/// An FTP login as the panel reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelFtpAccount {
    /// Login name.
    pub username: String,
    /// Home directory relative to the account home.
    pub home_dir: String,
    /// Quota in megabytes; `None` means unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_mb: Option<u64>,
}

/// Kind-specific data of a remote resource.
///
/// Serialized with `"kind"` as the tag, e.g.
/// `{ "kind": "mailbox", "email": "a@example.com", "quota_mb": 1024 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RemoteResourceData {
    /// Web domain.
    Domain(PanelDomain),
    /// Database.
    Database(PanelDatabase),
    /// Database login.
    DatabaseUser(PanelDatabaseUser),
    /// Mailbox.
    Mailbox(PanelMailbox),
    /// FTP login.
    FtpAccount(PanelFtpAccount),
}

impl RemoteResourceData {
    /// The [`ResourceKind`] discriminant of this data.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Domain(_) => ResourceKind::Domain,
            Self::Database(_) => ResourceKind::Database,
            Self::DatabaseUser(_) => ResourceKind::DatabaseUser,
            Self::Mailbox(_) => ResourceKind::Mailbox,
            Self::FtpAccount(_) => ResourceKind::FtpAccount,
        }
    }

    /// The natural name of the resource, as displayed by the panel.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Domain(d) => &d.domain,
            Self::Database(d) => &d.name,
            Self::DatabaseUser(u) => &u.username,
            Self::Mailbox(m) => &m.email,
            Self::FtpAccount(f) => &f.username,
        }
    }
}

/// A resource as it currently exists on the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResource {
    /// The identifier the panel addresses this resource by.
    pub external_id: String,
    /// Kind-specific state.
    #[serde(flatten)]
    pub data: RemoteResourceData,
}

impl RemoteResource {
    /// Convenience accessor for `self.data.kind()`.
    pub fn kind(&self) -> ResourceKind {
        self.data.kind()
    }
}

// ============ Credentials ============

/// Validation error for panel credentials.
///
/// Returned when a credential field is missing, empty, or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A credential field is present but empty/whitespace-only.
    EmptyField {
        /// Machine-readable field key.
        field: String,
    },
    /// A credential field has an invalid format.
    InvalidFormat {
        /// Machine-readable field key.
        field: String,
        /// Description of what's wrong with the format.
        reason: String,
    },
}

impl std::fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "Credential field '{field}' is empty"),
            Self::InvalidFormat { field, reason } => {
                write!(f, "Credential field '{field}' is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Connection credentials for a control panel server.
///
/// Serialized as an internally tagged enum so it reads naturally in TOML:
///
/// ```toml
/// type = "api_token"
/// base_url = "https://panel.example.net:2087/api/v1"
/// api_token = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelCredentials {
    /// Bearer token authentication.
    ApiToken {
        /// API root, without a trailing slash.
        base_url: String,
        /// API token.
        api_token: String,
    },
    /// HTTP basic authentication with a reseller login.
    BasicAuth {
        /// API root, without a trailing slash.
        base_url: String,
        /// Reseller login name.
        username: String,
        /// Reseller password.
        password: String,
    },
}

impl PanelCredentials {
    /// API root URL of the panel these credentials target.
    pub fn base_url(&self) -> &str {
        match self {
            Self::ApiToken { base_url, .. } | Self::BasicAuth { base_url, .. } => base_url,
        }
    }

    /// Check that all fields are present and the URL has an HTTP(S) scheme.
    pub fn validate(&self) -> Result<(), CredentialValidationError> {
        let base_url = self.base_url().trim();
        if base_url.is_empty() {
            return Err(CredentialValidationError::EmptyField {
                field: "base_url".to_string(),
            });
        }
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(CredentialValidationError::InvalidFormat {
                field: "base_url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let secrets: &[(&str, &str)] = match self {
            Self::ApiToken { api_token, .. } => &[("api_token", api_token)],
            Self::BasicAuth {
                username, password, ..
            } => &[("username", username), ("password", password)],
        };
        for (field, value) in secrets {
            if value.trim().is_empty() {
                return Err(CredentialValidationError::EmptyField {
                    field: (*field).to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============ Client Options ============

/// Transport options for a panel client.
///
/// `max_retries` defaults to `0`: every remote call is a single attempt and a
/// failure is reported to the caller. Raising it enables exponential-backoff
/// retries for transient failures only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelOptions {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Retries for network errors, timeouts and rate limiting.
    pub max_retries: u32,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 0,
        }
    }
}
