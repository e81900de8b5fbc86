use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

/// Gateway location and the fixed routing headers of this deployment
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Upstream ERP instance, sent as `x-odoo-base`
    pub odoo_base: String,
    /// ERP database name, sent as `x-odoo-db`
    pub odoo_db: String,
}

impl ApiConfig {
    /// Headers attached to every gateway request
    pub fn routing_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("x-odoo-base", self.odoo_base.clone()),
            ("x-odoo-db", self.odoo_db.clone()),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding the persisted session id
    pub credentials_path: String,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[api]
base_url = "http://127.0.0.1:3000/api"
odoo_base = "http://127.0.0.1:8069"
odoo_db = "odoo"

[storage]
credentials_path = "target/session/credentials.json"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                return load_config_from(&config_path);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Load configuration from an explicit path
pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading config from: {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

/// Resolve the credentials file path
/// Relative paths are resolved against the executable directory
pub fn get_credentials_path(config: &Config) -> PathBuf {
    let path = Path::new(&config.storage.credentials_path);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(&config.storage.credentials_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:3000/api");
        assert_eq!(config.api.odoo_db, "odoo");
        assert_eq!(
            config.storage.credentials_path,
            "target/session/credentials.json"
        );
    }

    #[test]
    fn test_routing_headers() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let headers = config.api.routing_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0], ("x-odoo-base", "http://127.0.0.1:8069".to_string()));
        assert_eq!(headers[1], ("x-odoo-db", "odoo".to_string()));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://wms.example.com/api"
odoo_base = "https://erp.example.com"
odoo_db = "prod"

[storage]
credentials_path = "/var/lib/wms/credentials.json"
"#
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.api.odoo_db, "prod");
        assert_eq!(
            get_credentials_path(&config),
            PathBuf::from("/var/lib/wms/credentials.json")
        );
    }

    #[test]
    fn test_load_config_from_missing_file_fails() {
        assert!(load_config_from(Path::new("/nonexistent/config.toml")).is_err());
    }
}
