//! In-memory profile catalog.

use std::collections::HashMap;

use game_core::{Attributes, Profile, ProfileId};
use serde::Deserialize;
use thiserror::Error;

/// Catalog shipped with the client, used when no external file is configured.
const EMBEDDED_CATALOG: &str = include_str!("../data/kols.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog contains no profiles")]
    Empty,

    #[error("duplicate profile name: {0}")]
    DuplicateName(String),

    #[error("profile {name}: declared id {declared} does not match keccak256(name) {computed}")]
    IdMismatch {
        name: String,
        declared: ProfileId,
        computed: ProfileId,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(String),
}

/// On-disk form of a catalog entry.
///
/// The identifier is derived from `name`; an explicit `id` is accepted only to
/// cross-check catalogs exported by other tools.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSpec {
    pub name: String,
    #[serde(alias = "twitterHandle")]
    pub handle: String,
    #[serde(default)]
    pub id: Option<ProfileId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    pub attributes: Attributes,
}

impl ProfileSpec {
    pub fn into_profile(self) -> Result<Profile, CatalogError> {
        let mut profile = Profile::new(self.name, self.handle, self.attributes);
        if let Some(declared) = self.id
            && declared != profile.id
        {
            return Err(CatalogError::IdMismatch {
                name: profile.name,
                declared,
                computed: profile.id,
            });
        }
        profile.image_url = self.image_url;
        profile.link = self.link;
        Ok(profile)
    }
}

/// Ordered, immutable set of candidate profiles.
///
/// Order matters: daily target selection indexes into it.
#[derive(Debug, Clone)]
pub struct Catalog {
    profiles: Vec<Profile>,
    by_id: HashMap<ProfileId, usize>,
}

impl Catalog {
    pub fn from_profiles(profiles: Vec<Profile>) -> Result<Self, CatalogError> {
        if profiles.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_id = HashMap::with_capacity(profiles.len());
        for (index, profile) in profiles.iter().enumerate() {
            if by_id.insert(profile.id, index).is_some() {
                return Err(CatalogError::DuplicateName(profile.name.clone()));
            }
        }

        Ok(Self { profiles, by_id })
    }

    pub fn from_specs(specs: Vec<ProfileSpec>) -> Result<Self, CatalogError> {
        let profiles = specs
            .into_iter()
            .map(ProfileSpec::into_profile)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_profiles(profiles)
    }

    /// Parse a JSON array of [`ProfileSpec`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let specs: Vec<ProfileSpec> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_specs(specs)
    }

    /// The catalog compiled into the client.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn get(&self, id: &ProfileId) -> Option<&Profile> {
        self.by_id.get(id).map(|&index| &self.profiles[index])
    }

    pub fn at(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    /// Case-insensitive exact name match.
    pub fn find_by_name(&self, name: &str) -> Option<&Profile> {
        let name = name.trim();
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive substring search over name, handle and ecosystem.
    ///
    /// A blank term yields no results.
    pub fn search(&self, term: &str) -> Vec<&Profile> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        self.profiles
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&term)
                    || p.handle.to_lowercase().contains(&term)
                    || p.attributes.ecosystem.to_string().to_lowercase().contains(&term)
            })
            .collect()
    }

    /// Resolve typed text into a guess: the catalog entry when the name is
    /// known, otherwise a raw guess carrying the typed name.
    pub fn resolve_guess(&self, text: &str) -> Profile {
        match self.find_by_name(text) {
            Some(profile) => profile.clone(),
            None => Profile::raw_guess(text.trim()),
        }
    }
}
