//! Profile catalog loader.

use std::path::Path;

use serde::Deserialize;

use crate::catalog::{Catalog, ProfileSpec};
use crate::loaders::{LoadResult, read_file};

/// TOML has no top-level arrays, so TOML catalogs use `[[profiles]]` tables.
#[derive(Deserialize)]
struct TomlCatalog {
    profiles: Vec<ProfileSpec>,
}

/// Loader for profile catalogs.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from a `.json` or `.toml` file.
    ///
    /// JSON format: `[ProfileSpec, ...]`
    /// TOML format: `[[profiles]]` tables of `ProfileSpec`
    pub fn load(path: &Path) -> LoadResult<Catalog> {
        let content = read_file(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let catalog = match extension.as_deref() {
            Some("json") => Catalog::from_json(&content)?,
            Some("toml") => {
                let parsed: TomlCatalog = toml::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("Failed to parse catalog TOML: {}", e))?;
                Catalog::from_specs(parsed.profiles)?
            }
            other => anyhow::bail!(
                "Unsupported catalog format {:?} for {} (expected .json or .toml)",
                other,
                path.display()
            ),
        };

        tracing::info!(
            "Loaded catalog with {} profiles from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_json_catalog() {
        let file = write_temp(
            ".json",
            r#"[{"name": "Jesse Pollak", "handle": "@jessepollak", "attributes": {"association": "Base", "ecosystem": "Base", "pfpTheme": "Human", "followers": 250000, "age": 35}}]"#,
        );
        let catalog = CatalogLoader::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.at(0).unwrap().attributes.followers, 250_000);
    }

    #[test]
    fn loads_toml_catalog() {
        let file = write_temp(
            ".toml",
            r#"
[[profiles]]
name = "Balaji Srinivasan"
handle = "@balajis"
link = "https://x.com/balajis"

[profiles.attributes]
association = "a16z"
ecosystem = "Cross-Chain"
pfpTheme = "Pixel Art"
followers = 800000
age = 43
"#,
        );
        let catalog = CatalogLoader::load(file.path()).unwrap();
        let profile = catalog.at(0).unwrap();
        assert_eq!(profile.link.as_deref(), Some("https://x.com/balajis"));
        assert_eq!(profile.attributes.age, 43);
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".yaml", "[]");
        let err = CatalogLoader::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported catalog format"));
    }
}
