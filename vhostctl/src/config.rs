//! Configuration: an optional JSON file merged with CLI flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::error::CliError;

/// Connection defaults read from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl FileConfig {
    /// Load the file at `path`, or the default location when `None`.
    ///
    /// A missing file is not an error; an unreadable or unparsable one is.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| CliError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| CliError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vhostctl.json"))
}

/// Connection settings after the merge. Explicit flags win over the file.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn resolve(args: &Args, file: &FileConfig) -> Result<Self, CliError> {
        let host = args
            .host
            .clone()
            .or_else(|| file.host.clone())
            .ok_or(CliError::MissingCredential("host"))?;
        let user = args
            .user
            .clone()
            .or_else(|| file.user.clone())
            .ok_or(CliError::MissingCredential("user"))?;
        let password = args
            .password
            .clone()
            .or_else(|| file.password.clone())
            .ok_or(CliError::MissingCredential("password"))?;

        Ok(Self {
            host,
            user,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Command;
    use std::io::Write;

    fn args(host: Option<&str>, user: Option<&str>, password: Option<&str>) -> Args {
        Args {
            config: None,
            host: host.map(String::from),
            user: user.map(String::from),
            password: password.map(String::from),
            log_level: "warn".to_string(),
            dev: false,
            command: Command::VmList,
        }
    }

    #[test]
    fn test_load_reads_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"host": "esx1.lab", "user": "root", "password": "secret"}}"#
        )
        .unwrap();

        let config = FileConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.host.as_deref(), Some("esx1.lab"));
        assert_eq!(config.user.as_deref(), Some("root"));
    }

    #[test]
    fn test_load_missing_file_is_fine() {
        let config = FileConfig::load(Some(Path::new("/nonexistent/vhostctl.json"))).unwrap();
        assert!(config.host.is_none());
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = FileConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            host: Some("file-host".to_string()),
            user: Some("file-user".to_string()),
            password: Some("file-pass".to_string()),
        };
        let creds = Credentials::resolve(&args(Some("flag-host"), None, None), &file).unwrap();
        assert_eq!(creds.host, "flag-host");
        assert_eq!(creds.user, "file-user");
        assert_eq!(creds.password, "file-pass");
    }

    #[test]
    fn test_missing_setting_is_reported_by_name() {
        let file = FileConfig {
            host: Some("file-host".to_string()),
            user: None,
            password: None,
        };
        let err = Credentials::resolve(&args(None, None, Some("pw")), &file).unwrap_err();
        assert_eq!(err.to_string(), "Missing user setting");
    }
}
