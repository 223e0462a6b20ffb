use std::fmt;

use crate::error::CoreError;
use crate::types::AddressOrCredential;

/// A Kupo `/matches` query restricted to unspent outputs.
///
/// Every constructor validates the values it interpolates into the path so a
/// caller cannot smuggle extra path segments or query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pattern: String,
    policy_id: Option<String>,
    asset_name: Option<String>,
}

impl MatchQuery {
    /// Outputs at an address, or at any address with the given payment
    /// credential.
    pub fn for_target(target: &AddressOrCredential) -> Result<Self, CoreError> {
        let pattern = match target {
            AddressOrCredential::Address(address) => {
                ensure_address(address)?;
                address.clone()
            }
            AddressOrCredential::Credential(credential) => {
                ensure_hex(&credential.hash, "credential hash")?;
                format!("{}/*", credential.hash)
            }
        };
        Ok(Self::from_pattern(pattern))
    }

    /// Outputs holding any asset of `policy_id`, or exactly `policy_id.asset_name`.
    pub fn for_unit(policy_id: &str, asset_name: Option<&str>) -> Result<Self, CoreError> {
        ensure_hex(policy_id, "policy id")?;
        let name = match asset_name {
            Some(name) => {
                ensure_hex(name, "asset name")?;
                name
            }
            None => "*",
        };
        Ok(Self::from_pattern(format!("{policy_id}.{name}")))
    }

    /// Outputs created by a transaction.
    pub fn for_transaction(tx_hash: &str) -> Result<Self, CoreError> {
        ensure_hex(tx_hash, "transaction hash")?;
        Ok(Self::from_pattern(format!("*@{tx_hash}")))
    }

    /// Narrow the query to outputs holding the given policy, and asset name
    /// when one is given.
    pub fn with_asset_filter(
        mut self,
        policy_id: &str,
        asset_name: Option<&str>,
    ) -> Result<Self, CoreError> {
        ensure_hex(policy_id, "policy id")?;
        if let Some(name) = asset_name {
            ensure_hex(name, "asset name")?;
        }
        self.policy_id = Some(policy_id.to_owned());
        self.asset_name = asset_name.map(str::to_owned);
        Ok(self)
    }

    fn from_pattern(pattern: String) -> Self {
        Self {
            pattern,
            policy_id: None,
            asset_name: None,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Request path relative to the Kupo base URL.
    pub fn path(&self) -> String {
        let mut path = format!("/matches/{}?unspent", self.pattern);
        if let Some(policy_id) = &self.policy_id {
            path.push_str("&policy_id=");
            path.push_str(policy_id);
            if let Some(asset_name) = &self.asset_name {
                path.push_str("&asset_name=");
                path.push_str(asset_name);
            }
        }
        path
    }
}

impl fmt::Display for MatchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub(crate) fn ensure_hex(value: &str, what: &str) -> Result<(), CoreError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidInput(format!(
            "{what} `{value}` must be non-empty hex"
        )));
    }
    Ok(())
}

// Bech32 addresses are lowercase alphanumerics plus the `_` of the `addr_test`
// prefix; Byron base58 addresses are alphanumeric.
fn ensure_address(address: &str) -> Result<(), CoreError> {
    if address.is_empty()
        || !address
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return Err(CoreError::InvalidInput(format!(
            "address `{address}` is not a bech32 or base58 address"
        )));
    }
    Ok(())
}
