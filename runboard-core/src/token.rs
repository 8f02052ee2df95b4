//! Opaque page tokens.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Continuation token understood only by the search service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces a token for a page when the service has not handed one out.
pub trait PageTokenCodec: fmt::Debug + Send + Sync {
    /// `None` means the request goes out without a token.
    fn seed(&self, page_index: u32, page_size: u32) -> Option<PageToken>;
}

/// Base64 of `{"offset": page_index * page_size}`; page 0 has no token.
#[derive(Debug, Default, Clone, Copy)]
pub struct OffsetTokenCodec;

impl PageTokenCodec for OffsetTokenCodec {
    fn seed(&self, page_index: u32, page_size: u32) -> Option<PageToken> {
        if page_index == 0 {
            return None;
        }
        let offset = u64::from(page_index) * u64::from(page_size);
        let body = serde_json::json!({ "offset": offset }).to_string();
        Some(PageToken(STANDARD.encode(body)))
    }
}
