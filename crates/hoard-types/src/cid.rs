//! Content identifiers.
//!
//! A [`Cid`] names a block from outside the storage layer. It pairs the
//! block's [`Key`] with the [`Codec`] used to interpret its bytes, so a
//! reader knows whether the block is an opaque leaf or a node with links.
//! The textual form is `<codec>:<hex key>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::key::Key;

/// How a block's bytes are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Codec {
    /// Opaque bytes with no outgoing links.
    Raw,
    /// JSON-encoded node carrying links to other blocks.
    DagJson,
}

impl Codec {
    /// Textual prefix used in the string form of a [`Cid`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::DagJson => "dag-json",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "dag-json" => Ok(Self::DagJson),
            other => Err(TypeError::UnknownCodec(other.to_string())),
        }
    }
}

/// Content identifier: codec plus content key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cid {
    codec: Codec,
    key: Key,
}

impl Cid {
    /// Create a cid from its parts.
    pub const fn new(codec: Codec, key: Key) -> Self {
        Self { codec, key }
    }

    /// Compute the cid of `data` interpreted with `codec`.
    pub fn for_data(codec: Codec, data: &[u8]) -> Self {
        Self::new(codec, Key::for_data(data))
    }

    /// The codec of the referenced block.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Reduce to the storage key (the hash component).
    pub fn key(&self) -> Key {
        self.key
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({}:{})", self.codec, self.key.short_hex())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.codec, self.key)
    }
}

impl FromStr for Cid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (codec, key) = s
            .split_once(':')
            .ok_or_else(|| TypeError::MalformedCid(s.to_string()))?;
        Ok(Self::new(codec.parse()?, key.parse()?))
    }
}

impl From<Cid> for Key {
    fn from(cid: Cid) -> Self {
        cid.key
    }
}
