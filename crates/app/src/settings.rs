//! Startup settings: site config and room data

use std::path::{Path, PathBuf};

use cazza_core::{Error, Result, RoomCatalog, SiteConfig};
use directories::ProjectDirs;

const CONFIG_FILE: &str = "site.toml";

/// Default config location in the platform config directory
pub fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "cazza", "residence").ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine config directory",
        ))
    })?;

    Ok(dirs.config_dir().join(CONFIG_FILE))
}

/// Load the site config from `explicit`, or from the platform config
/// directory when present, or fall back to defaults
pub fn load_site_config(explicit: Option<&Path>) -> Result<SiteConfig> {
    if let Some(path) = explicit {
        tracing::info!(path = %path.display(), "Loading site config");
        return SiteConfig::load(path);
    }

    match config_path() {
        Ok(path) if path.exists() => {
            tracing::info!(path = %path.display(), "Loading site config");
            SiteConfig::load(&path)
        }
        Ok(path) => {
            tracing::debug!(path = %path.display(), "No site config; using defaults");
            Ok(SiteConfig::default())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Config directory unavailable; using defaults");
            Ok(SiteConfig::default())
        }
    }
}

pub fn load_catalog(config: &SiteConfig) -> Result<RoomCatalog> {
    match &config.rooms_path {
        Some(path) => RoomCatalog::load(path),
        None => Ok(RoomCatalog::fixtures()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config_and_rooms() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("rooms.json"),
            r#"[{ "id": "A1", "type": "studio", "name": "Attic", "price": 4500, "capacity": 2 }]"#,
        )
        .unwrap();
        let config_file = dir.path().join("site.toml");
        fs::write(
            &config_file,
            "base_url = \"https://cazza.test/\"\nrooms_path = \"rooms.json\"\n",
        )
        .unwrap();

        let config = load_site_config(Some(&config_file)).unwrap();
        assert_eq!(config.base_url, "https://cazza.test/");
        let catalog = load_catalog(&config).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("A1").unwrap().name, "Attic");
    }

    #[test]
    fn test_missing_rooms_file_is_an_error() {
        let config = SiteConfig {
            rooms_path: Some(PathBuf::from("/nonexistent/rooms.json")),
            ..SiteConfig::default()
        };
        assert!(matches!(load_catalog(&config), Err(Error::Io(_))));
    }

    #[test]
    fn test_builtin_rooms_without_path() {
        let catalog = load_catalog(&SiteConfig::default()).unwrap();
        assert_eq!(catalog.len(), 4);
    }
}
