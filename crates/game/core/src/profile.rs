//! Candidate profiles ("KOLs") and their attribute schema.
//!
//! A profile's identifier is the Keccak-256 hash of its canonical name. The
//! contract stores only the hash of the round's target, so the client can
//! match a guess against the target without knowing the target's name.

use std::fmt;
use std::str::FromStr;

use sha3::{Digest, Keccak256};
use strum::{Display, EnumString};

/// 32-byte profile identifier: `keccak256(utf8(name))`.
///
/// The default value is the all-zero hash, which the contract uses for an
/// unassigned target slot.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileId(pub [u8; 32]);

impl ProfileId {
    pub const ZERO: ProfileId = ProfileId([0u8; 32]);

    /// Hash a canonical name into its identifier.
    pub fn from_name(name: &str) -> Self {
        let digest = Keccak256::digest(name.as_bytes());
        Self(digest.into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProfileId({})", self.to_hex())
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error returned when parsing a hex identifier fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileIdError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for ProfileId {
    type Err = ProfileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| ProfileIdError::InvalidHex(e.to_string()))?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ProfileIdError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ProfileId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ProfileId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Categorical attributes
// ============================================================================

/// Organisation a profile is primarily associated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Association {
    Base,
    Coinbase,
    Optimism,
    Paradigm,
    #[strum(serialize = "a16z")]
    #[cfg_attr(feature = "serde", serde(rename = "a16z"))]
    A16z,
    Artist,
    Other,
}

/// Chain ecosystem a profile is active in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ecosystem {
    Ethereum,
    Solana,
    Base,
    #[strum(serialize = "Cross-Chain")]
    #[cfg_attr(feature = "serde", serde(rename = "Cross-Chain"))]
    CrossChain,
}

/// Theme of a profile picture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PfpTheme {
    Animal,
    Abstract,
    Human,
    #[strum(serialize = "Pixel Art")]
    #[cfg_attr(feature = "serde", serde(rename = "Pixel Art"))]
    PixelArt,
    #[strum(serialize = "None")]
    #[cfg_attr(feature = "serde", serde(rename = "None"))]
    NoTheme,
}

/// The fixed attribute set compared by the hint engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Attributes {
    pub association: Association,
    pub ecosystem: Ecosystem,
    pub pfp_theme: PfpTheme,
    pub followers: u64,
    pub age: u32,
}

impl Attributes {
    /// Placeholder attributes used for names typed outside the catalog.
    pub const fn placeholder() -> Self {
        Self {
            association: Association::Other,
            ecosystem: Ecosystem::Ethereum,
            pfp_theme: PfpTheme::NoTheme,
            followers: 0,
            age: 0,
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// A candidate or secret-target individual.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub handle: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub image_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub link: Option<String>,
    pub attributes: Attributes,
}

impl Profile {
    /// Create a profile, deriving its identifier from `name`.
    pub fn new(name: impl Into<String>, handle: impl Into<String>, attributes: Attributes) -> Self {
        let name = name.into();
        Self {
            id: ProfileId::from_name(&name),
            name,
            handle: handle.into(),
            image_url: None,
            link: None,
            attributes,
        }
    }

    /// Profile for a name the player typed that is not in the catalog.
    ///
    /// The identifier is still the hash of the typed name, so the contract can
    /// match it; the attributes are placeholders and only drive cosmetic hints.
    pub fn raw_guess(name: impl Into<String>) -> Self {
        Self::new(name, String::new(), Attributes::placeholder())
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// True when the profile came from a free-text guess.
    pub fn is_raw_guess(&self) -> bool {
        self.handle.is_empty() && self.attributes == Attributes::placeholder()
    }
}
