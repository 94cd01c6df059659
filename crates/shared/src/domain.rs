use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_ID_HEX_DIGITS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("identifier must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("identifier has no hex digits")]
    Empty,
    #[error("identifier has {0} hex digits, at most 64 allowed")]
    TooLong(usize),
    #[error("identifier contains non-hex character {0:?}")]
    InvalidDigit(char),
}

fn parse_hex_id(raw: &str) -> Result<String, IdParseError> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| IdParseError::MissingPrefix(raw.to_string()))?;

    if digits.is_empty() {
        return Err(IdParseError::Empty);
    }
    if digits.len() > MAX_ID_HEX_DIGITS {
        return Err(IdParseError::TooLong(digits.len()));
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(IdParseError::InvalidDigit(bad));
    }

    Ok(format!("0x{}", digits.to_ascii_lowercase()))
}

macro_rules! hex_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex_id(s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

hex_id_newtype!(PackageId);
hex_id_newtype!(ObjectId);

impl ObjectId {
    /// Short form for display, e.g. `0x1234...cdef`.
    pub fn abbreviated(&self) -> String {
        let id = self.as_str();
        if id.len() <= 10 {
            return id.to_string();
        }
        format!("{}...{}", &id[..6], &id[id.len() - 4..])
    }
}

/// A connected wallet account. Callers only ever check for its presence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Good,
    Neutral,
    Bad,
}

impl Mood {
    pub const COUNT: usize = 3;
    pub const ALL: [Mood; Mood::COUNT] = [Mood::Good, Mood::Neutral, Mood::Bad];

    pub fn index(self) -> u8 {
        match self {
            Mood::Good => 0,
            Mood::Neutral => 1,
            Mood::Bad => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Good => "Good",
            Mood::Neutral => "Neutral",
            Mood::Bad => "Bad",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Mood::Good => "😊",
            Mood::Neutral => "😐",
            Mood::Bad => "😢",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mood {0:?}; expected one of good, neutral, bad or 0-2")]
pub struct MoodParseError(pub String);

impl FromStr for Mood {
    type Err = MoodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return Mood::from_index(index).ok_or_else(|| MoodParseError(s.to_string()));
        }
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| MoodParseError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Testnet,
    #[default]
    Devnet,
    Localnet,
}

impl Network {
    pub fn fullnode_url(self) -> &'static str {
        match self {
            Network::Testnet => "https://api.testnet.iota.cafe",
            Network::Devnet => "https://api.devnet.iota.cafe",
            Network::Localnet => "http://127.0.0.1:9000",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown network {0:?}; expected testnet, devnet or localnet")]
pub struct NetworkParseError(pub String);

impl FromStr for Network {
    type Err = NetworkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "localnet" => Ok(Network::Localnet),
            _ => Err(NetworkParseError(s.to_string())),
        }
    }
}
