use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};

/// File name of the network descriptor, read from the tool's home directory.
pub const CONFIG_FILE: &str = "configs.json";

/// Network descriptor: which node binary to run and how many nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Absolute path to the node executable.
    #[serde(rename = "corePath")]
    pub core_path: PathBuf,
    /// Network-size tag, e.g. `TESTNET_5V`.
    #[serde(rename = "netMode")]
    pub net_mode: String,
}

impl NetworkConfig {
    /// Reads `configs.json` from `home`.
    ///
    /// Both fields must be present and non-empty. The executable itself is
    /// not checked here; a bad path fails later, at spawn time.
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(CONFIG_FILE);
        let raw = std::fs::read(&path).map_err(|source| NetError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        Self::parse(&path, &raw)
    }

    fn parse(path: &Path, raw: &[u8]) -> Result<Self> {
        let config: NetworkConfig =
            serde_json::from_slice(raw).map_err(|e| NetError::ConfigParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if config.core_path.as_os_str().is_empty() {
            return Err(NetError::ConfigParse {
                path: path.to_path_buf(),
                reason: "corePath is empty".to_string(),
            });
        }
        if config.net_mode.trim().is_empty() {
            return Err(NetError::ConfigParse {
                path: path.to_path_buf(),
                reason: "netMode is empty".to_string(),
            });
        }

        Ok(config)
    }
}

/// Directory containing the running executable.
pub fn tool_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(NetError::ToolDir)?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        NetError::ToolDir(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<NetworkConfig> {
        NetworkConfig::parse(Path::new("configs.json"), json.as_bytes())
    }

    #[test]
    fn parses_both_fields() {
        let config = parse(r#"{"corePath": "/opt/node/core", "netMode": "TESTNET_5V"}"#).unwrap();
        assert_eq!(config.core_path, PathBuf::from("/opt/node/core"));
        assert_eq!(config.net_mode, "TESTNET_5V");
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let err = parse(r#"{"corePath": "/opt/node/core"}"#).unwrap_err();
        match err {
            NetError::ConfigParse { reason, .. } => assert!(reason.contains("netMode")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_values_are_rejected() {
        assert!(matches!(
            parse(r#"{"corePath": "", "netMode": "TESTNET_5V"}"#),
            Err(NetError::ConfigParse { .. })
        ));
        assert!(matches!(
            parse(r#"{"corePath": "/bin/true", "netMode": " "}"#),
            Err(NetError::ConfigParse { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            parse("{corePath: nope"),
            Err(NetError::ConfigParse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            NetworkConfig::load(dir.path()),
            Err(NetError::ConfigRead { .. })
        ));
    }
}
