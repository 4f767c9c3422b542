use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a pinned cid is retained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinMode {
    /// Retain the block and everything reachable from it.
    Recursive,
    /// Retain only the block itself.
    Direct,
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recursive => write!(f, "recursive"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

impl FromStr for PinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recursive" => Ok(Self::Recursive),
            "direct" => Ok(Self::Direct),
            other => Err(format!("unknown pin mode: {other}")),
        }
    }
}
