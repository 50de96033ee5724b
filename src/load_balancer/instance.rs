//! Upstream instance addresses.
//!
//! # Responsibilities
//! - Parse one configured instance address into a URL
//! - Default the scheme to `http` and the path to `/businesses`

use std::fmt;

use thiserror::Error;
use url::Url;

/// Path used when an instance address carries none.
pub const DEFAULT_PATH: &str = "/businesses";

/// Errors raised while parsing an instance address.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("empty instance address")]
    Empty,

    #[error("invalid instance address '{address}': {source}")]
    Invalid {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme '{scheme}' in instance address '{address}'")]
    UnsupportedScheme { address: String, scheme: String },
}

/// One upstream POS provider. Immutable once the pool is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    url: Url,
}

impl Instance {
    /// Parse an address such as `pos-a:8091`, `:8091` or
    /// `http://pos-a:8091/v2/businesses`.
    pub fn parse(raw: &str) -> Result<Self, InstanceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InstanceError::Empty);
        }

        // ":8091" means the local host
        let address = if trimmed.starts_with(':') {
            format!("http://localhost{}", trimmed)
        } else if trimmed.starts_with("http") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let mut url = Url::parse(&address).map_err(|source| InstanceError::Invalid {
            address: trimmed.to_string(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(InstanceError::UnsupportedScheme {
                address: trimmed.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        if url.path().is_empty() || url.path() == "/" {
            url.set_path(DEFAULT_PATH);
        }

        Ok(Self { url })
    }

    /// Full URL requests are POSTed to.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
