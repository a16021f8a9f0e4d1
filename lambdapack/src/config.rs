//! Configuration management

use lambdapack_core::FunctionSettings;
use lambdapack_deploy::DeployPlan;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot find binary: pass --binary <path>")]
    MissingBinary,

    #[error("Please provide function role with --role <arn>")]
    MissingRole,

    #[error("Cannot derive a function name from {0}; pass --name")]
    NoFunctionName(PathBuf),

    #[error("Cannot locate the bootstrap executable; pass --bootstrap <path>")]
    MissingBootstrap,

    #[error("Invalid configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Values from `lambdapack.toml`, all optional
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub role: Option<String>,
    pub region: Option<String>,
    pub name: Option<String>,
    pub binary: Option<PathBuf>,
    pub bootstrap: Option<PathBuf>,
    pub endpoint_url: Option<String>,
    pub delete: bool,
}

/// Values given on the command line or through `LAMBDAPACK_*`; these win
/// over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub role: Option<String>,
    pub region: Option<String>,
    pub name: Option<String>,
    pub binary: Option<PathBuf>,
    pub bootstrap: Option<PathBuf>,
    pub endpoint_url: Option<String>,
    pub delete: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub role: String,
    pub region: Option<String>,
    pub name: String,
    pub binary: PathBuf,
    pub bootstrap: PathBuf,
    pub endpoint_url: Option<String>,
    pub delete: bool,
}

impl FileConfig {
    /// Load `path`, or `./lambdapack.toml` if it exists
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let source = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("lambdapack").required(false),
        };

        let config = config::Config::builder().add_source(source).build()?;

        Ok(config.try_deserialize::<FileConfig>()?)
    }

    /// Merge with `overrides` and check required values.
    ///
    /// The binary is checked before the role. `default_bootstrap` is used when
    /// neither layer names the bootstrap executable.
    pub fn resolve(
        self,
        overrides: Overrides,
        default_bootstrap: Option<PathBuf>,
    ) -> Result<Settings, ConfigError> {
        let binary = overrides
            .binary
            .or(self.binary)
            .filter(|binary| !binary.as_os_str().is_empty())
            .ok_or(ConfigError::MissingBinary)?;
        let role = overrides
            .role
            .or(self.role)
            .filter(|role| !role.is_empty())
            .ok_or(ConfigError::MissingRole)?;

        let name = match overrides.name.or(self.name) {
            Some(name) => name,
            None => binary
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::NoFunctionName(binary.clone()))?,
        };

        let bootstrap = overrides
            .bootstrap
            .or(self.bootstrap)
            .or(default_bootstrap)
            .ok_or(ConfigError::MissingBootstrap)?;

        Ok(Settings {
            role,
            region: overrides.region.or(self.region),
            name,
            binary,
            bootstrap,
            endpoint_url: overrides.endpoint_url.or(self.endpoint_url),
            delete: overrides.delete || self.delete,
        })
    }
}

impl Settings {
    /// Deployment with the archive written to `work_dir`
    pub fn plan(&self, work_dir: impl Into<PathBuf>) -> DeployPlan {
        DeployPlan {
            settings: FunctionSettings::new(&self.name, &self.role),
            binary: self.binary.clone(),
            bootstrap: self.bootstrap.clone(),
            work_dir: work_dir.into(),
            delete: self.delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(binary: Option<&str>, role: Option<&str>) -> Overrides {
        Overrides {
            binary: binary.map(PathBuf::from),
            role: role.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_binary_reported_first() {
        let err = FileConfig::default()
            .resolve(overrides(None, None), Some("boot".into()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingBinary));
    }

    #[test]
    fn test_empty_binary_is_missing() {
        let err = FileConfig::default()
            .resolve(overrides(Some(""), Some("role")), Some("boot".into()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingBinary));
    }

    #[test]
    fn test_missing_role() {
        let err = FileConfig::default()
            .resolve(overrides(Some("bin/tool"), None), Some("boot".into()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRole));
        assert_eq!(err.to_string(), "Please provide function role with --role <arn>");
    }

    #[test]
    fn test_name_defaults_to_binary_stem() {
        let settings = FileConfig::default()
            .resolve(
                overrides(Some("target/release/resize"), Some("role")),
                Some("boot".into()),
            )
            .unwrap();
        assert_eq!(settings.name, "resize");
        assert!(!settings.delete);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = FileConfig {
            role: Some("file-role".to_string()),
            region: Some("eu-west-1".to_string()),
            name: Some("file-name".to_string()),
            binary: Some(PathBuf::from("file-bin")),
            bootstrap: Some(PathBuf::from("file-boot")),
            endpoint_url: None,
            delete: true,
        };
        let cli = Overrides {
            role: Some("cli-role".to_string()),
            name: Some("foo".to_string()),
            ..Default::default()
        };

        let settings = file.resolve(cli, Some("default-boot".into())).unwrap();

        assert_eq!(settings.role, "cli-role");
        assert_eq!(settings.name, "foo");
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.binary, PathBuf::from("file-bin"));
        assert_eq!(settings.bootstrap, PathBuf::from("file-boot"));
        assert!(settings.delete);
    }

    #[test]
    fn test_missing_bootstrap() {
        let err = FileConfig::default()
            .resolve(overrides(Some("tool"), Some("role")), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingBootstrap));
    }

    #[test]
    fn test_plan_archive_named_after_function() {
        let settings = FileConfig::default()
            .resolve(
                Overrides {
                    name: Some("foo".to_string()),
                    ..overrides(Some("tool"), Some("role"))
                },
                Some("boot".into()),
            )
            .unwrap();

        let plan = settings.plan("/tmp/work");

        assert_eq!(plan.archive_path(), PathBuf::from("/tmp/work/foo.zip"));
        assert_eq!(plan.settings.role, "role");
        assert_eq!(plan.settings.memory_size, 3008);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lambdapack.toml");
        let contents = r#"
role = "arn:aws:iam::000000000000:role/exec"
region = "us-west-2"
delete = true
"#;
        std::fs::write(&path, contents).unwrap();

        let file = FileConfig::load(Some(&path)).unwrap();

        assert_eq!(file.role.as_deref(), Some("arn:aws:iam::000000000000:role/exec"));
        assert_eq!(file.region.as_deref(), Some("us-west-2"));
        assert!(file.delete);
        assert!(file.binary.is_none());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
