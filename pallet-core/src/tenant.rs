use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

const MAX_LEN: usize = 64;

/// Tenant (warehouse client) identifier, already resolved by the authorization layer.
///
/// Every store read takes one of these as its first argument; there is no
/// ambient tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(raw: impl AsRef<str>) -> CoreResult<Self> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            return Err(CoreError::ValidationError("clientId is required".to_string()));
        }
        if raw.len() > MAX_LEN {
            return Err(CoreError::ValidationError(format!(
                "clientId must be at most {} characters",
                MAX_LEN
            )));
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(CoreError::ValidationError(
                "clientId may only contain letters, digits, '-' and '_'".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
