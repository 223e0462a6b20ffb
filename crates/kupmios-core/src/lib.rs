pub mod cache;
pub mod cbor;
pub mod decode;
pub mod error;
pub mod kupmios;
pub mod kupo;
pub mod ogmios;
pub mod poll;
pub mod provider;
pub mod resolve;
#[cfg(test)]
mod test_util;
pub mod translate;
mod transport;
pub mod types;

pub use error::{CoreError, ProviderError};
pub use kupmios::{Kupmios, KupmiosConfig};
pub use provider::Provider;
pub use transport::HttpOptions;
pub use types::{
    AddressOrCredential, Assets, Credential, CredentialKind, Delegation, EvalRedeemer, ExUnits,
    OutRef, PlutusVersion, ProtocolParameters, Script, Utxo, LOVELACE,
};
