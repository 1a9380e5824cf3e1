//! Deterministic rules of the Cypher guessing game.
//!
//! `game-core` defines the profile schema, the hint engine, the player status
//! projection and token amount arithmetic. Everything here is pure; the
//! catalog, the contract client and the session runtime build on the types
//! re-exported below.
pub mod amount;
pub mod config;
pub mod hint;
pub mod profile;
pub mod status;

pub use amount::{AmountError, TokenAmount};
pub use config::GameConfig;
pub use hint::{AttributeKind, Direction, Hint, HintKind, Hints, generate_hints};
pub use profile::{
    Association, Attributes, Ecosystem, PfpTheme, Profile, ProfileId, ProfileIdError,
};
pub use status::PlayerStatus;
