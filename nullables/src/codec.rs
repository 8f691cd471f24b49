//! Nullable address codec.

use axm_types::{AddressCodec, CollaboratorError};

/// Addresses are their own UTF-8 bytes. With a prefix configured, strings
/// without it are rejected like a bech32 codec rejects a foreign HRP.
#[derive(Default)]
pub struct NullAddressCodec {
    prefix: Option<String>,
}

impl NullAddressCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl AddressCodec for NullAddressCodec {
    fn string_to_bytes(&self, text: &str) -> Result<Vec<u8>, CollaboratorError> {
        if text.is_empty() {
            return Err(CollaboratorError("empty address string is not allowed".into()));
        }
        if let Some(prefix) = &self.prefix {
            if !text.starts_with(prefix.as_str()) {
                return Err(CollaboratorError(format!(
                    "invalid address prefix: expected {prefix}"
                )));
            }
        }
        Ok(text.as_bytes().to_vec())
    }

    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String, CollaboratorError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| CollaboratorError(e.to_string()))
    }
}
