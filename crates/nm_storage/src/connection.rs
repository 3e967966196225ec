use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nm_core::{Error, Result};
use url::Url;

/// How requests to Azure are authorised.
#[derive(Clone, PartialEq, Eq)]
pub enum AzureCredential {
    /// A SAS token appended to every request URL.
    Sas(String),
    /// The storage account key, used to sign each request.
    SharedKey { account: String, key: Vec<u8> },
}

impl fmt::Debug for AzureCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AzureCredential::Sas(_) => f.debug_tuple("Sas").field(&"<redacted>").finish(),
            AzureCredential::SharedKey { account, .. } => f
                .debug_struct("SharedKey")
                .field("account", account)
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

/// Where blobs live, as selected by the connection string.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionString {
    /// `memory://`
    Memory,
    /// `file://<dir>`
    Filesystem(PathBuf),
    /// Azure Blob connection string with a SAS token or an account key.
    Azure { endpoint: Url, credential: AzureCredential },
}

impl ConnectionString {
    pub fn backend_name(&self) -> &'static str {
        match self {
            ConnectionString::Memory => "memory",
            ConnectionString::Filesystem(_) => "filesystem",
            ConnectionString::Azure { .. } => "azure",
        }
    }

    fn parse_azure(s: &str) -> Result<Self> {
        let mut fields = HashMap::new();
        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| Error::Config("unrecognized blob connection string".to_string()))?;
            fields.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        // A SAS wins when both are present.
        let sas = fields
            .get("sharedaccesssignature")
            .map(|sas| sas.trim_start_matches('?'))
            .filter(|sas| !sas.is_empty());
        let credential = match (sas, fields.get("accountname"), fields.get("accountkey")) {
            (Some(sas), _, _) => AzureCredential::Sas(sas.to_string()),
            (None, Some(account), Some(key)) if !account.is_empty() => {
                // The key itself stays out of the error.
                let key = STANDARD
                    .decode(key)
                    .map_err(|_| Error::Config("AccountKey is not valid base64".to_string()))?;
                if key.is_empty() {
                    return Err(Error::Config("AccountKey is empty".to_string()));
                }
                AzureCredential::SharedKey {
                    account: account.clone(),
                    key,
                }
            }
            (None, None, Some(_)) => {
                return Err(Error::Config("AccountKey needs an AccountName to sign with".to_string()))
            }
            _ => {
                return Err(Error::Config(
                    "connection string needs a SharedAccessSignature or AccountName and AccountKey".to_string(),
                ))
            }
        };

        let endpoint = if let Some(endpoint) = fields.get("blobendpoint") {
            Url::parse(endpoint).map_err(|e| Error::Config(format!("invalid BlobEndpoint {}: {}", endpoint, e)))?
        } else if let Some(account) = fields.get("accountname") {
            let protocol = fields.get("defaultendpointsprotocol").map(String::as_str).unwrap_or("https");
            let suffix = fields.get("endpointsuffix").map(String::as_str).unwrap_or("core.windows.net");
            let endpoint = format!("{}://{}.blob.{}", protocol, account, suffix);
            Url::parse(&endpoint).map_err(|e| Error::Config(format!("invalid account endpoint {}: {}", endpoint, e)))?
        } else {
            return Err(Error::Config("connection string needs BlobEndpoint or AccountName".to_string()));
        };

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::Config(format!("unsupported endpoint scheme {}", endpoint.scheme())));
        }

        Ok(ConnectionString::Azure { endpoint, credential })
    }
}

impl FromStr for ConnectionString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Config("blob connection string is empty".to_string()));
        }
        if s == "memory" || s.starts_with("memory://") {
            return Ok(ConnectionString::Memory);
        }
        if let Some(path) = s.strip_prefix("file://") {
            if path.is_empty() {
                return Err(Error::Config("file:// connection string needs a directory".to_string()));
            }
            return Ok(ConnectionString::Filesystem(PathBuf::from(path)));
        }
        Self::parse_azure(s)
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionString::Memory => write!(f, "Memory"),
            ConnectionString::Filesystem(path) => f.debug_tuple("Filesystem").field(path).finish(),
            ConnectionString::Azure { endpoint, credential } => f
                .debug_struct("Azure")
                .field("endpoint", &endpoint.as_str())
                .field("credential", credential)
                .finish(),
        }
    }
}
