//! Digest helpers: SHA-256 hex and the canonical encodings used to hash a
//! report's chained fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How the chained fields are laid out before hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashEncoding {
    /// Raw concatenation of the fields. Adjacent fields can trade characters
    /// without changing the digest (`"AB" + "C"` == `"A" + "BC"`).
    Concat,
    /// Every field is preceded by its byte length as a little-endian `u64`.
    #[default]
    LengthPrefixed,
}

impl HashEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            HashEncoding::Concat => "concat",
            HashEncoding::LengthPrefixed => "length-prefixed",
        }
    }

    /// Hash `parts` under this encoding and return lowercase hex.
    pub fn digest(self, parts: &[&[u8]]) -> String {
        match self {
            HashEncoding::Concat => hash_concat(parts),
            HashEncoding::LengthPrefixed => hash_length_prefixed(parts),
        }
    }
}

impl fmt::Display for HashEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concat" => Ok(HashEncoding::Concat),
            "length-prefixed" | "length_prefixed" => Ok(HashEncoding::LengthPrefixed),
            other => Err(format!(
                "unknown hash encoding {other:?}; use `length-prefixed` or `concat`"
            )),
        }
    }
}

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hash inputs (concatenate as bytes, SHA-256) and return lowercase hex.
pub fn hash_concat(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p);
    }
    hex::encode(hasher.finalize())
}

/// Hash inputs with a `u64` little-endian length before each part.
pub fn hash_length_prefixed(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update((p.len() as u64).to_le_bytes());
        hasher.update(p);
    }
    hex::encode(hasher.finalize())
}
