use std::path::PathBuf;

use anyhow::Context;
use directories_next::UserDirs;

use crate::security;
use crate::settings::{Settings, SettingsBuilder, SettingsBuildingError, SettingsDecrypter};

/// Environment variable pointing at the Maven installation directory.
/// When set, global settings are read from `$M2_HOME/conf/settings.xml`.
pub const M2_HOME_ENV: &str = "M2_HOME";

/// Loads the effective settings: merged, validated and decrypted.
///
/// The loader holds only file paths and no cross-call state. Every
/// `load_settings` call re-reads the files, so a shared loader can be
/// used from multiple threads and always reflects the current file
/// contents.
pub struct SettingsLoader {
    global_settings_file: Option<PathBuf>,
    user_settings_file: PathBuf,
    security_file: PathBuf,
}

impl SettingsLoader {
    /// Creates a loader with explicit file locations and no environment
    /// access.
    pub fn new(
        global_settings_file: Option<PathBuf>,
        user_settings_file: PathBuf,
        security_file: PathBuf,
    ) -> SettingsLoader {
        SettingsLoader {
            global_settings_file,
            user_settings_file,
            security_file,
        }
    }

    /// Creates a loader with the standard Maven file locations:
    /// `$M2_HOME/conf/settings.xml` for the global settings (skipped
    /// when `M2_HOME` is not set), and `~/.m2/settings.xml` and
    /// `~/.m2/settings-security.xml` for any path not given explicitly.
    pub fn from_environment(
        user_settings_file: Option<PathBuf>,
        security_file: Option<PathBuf>,
    ) -> anyhow::Result<SettingsLoader> {
        let global_settings_file = match std::env::var_os(M2_HOME_ENV) {
            Some(home) => Some(PathBuf::from(home).join("conf").join("settings.xml")),
            None => {
                log::info!("{M2_HOME_ENV} is not set, not reading global settings");
                None
            }
        };

        let user_settings_file = match user_settings_file {
            Some(path) => path,
            None => {
                let dirs = UserDirs::new().context("Could not determine the home directory")?;
                dirs.home_dir().join(".m2").join("settings.xml")
            }
        };
        let security_file = match security_file {
            Some(path) => path,
            None => security::default_security_file()
                .context("Could not determine the home directory")?,
        };

        Ok(SettingsLoader::new(
            global_settings_file,
            user_settings_file,
            security_file,
        ))
    }

    /// Builds the effective settings. Validation problems are logged as
    /// warnings; only unreadable or unparseable files fail the load.
    pub fn load_settings(&self) -> Result<Settings, SettingsBuildingError> {
        let outcome = SettingsBuilder::new(
            self.global_settings_file.clone(),
            Some(self.user_settings_file.clone()),
        )
        .build()?;
        for problem in &outcome.problems {
            log::warn!("{problem}");
        }

        Ok(SettingsDecrypter::new(self.security_file.clone()).decrypt(outcome.settings))
    }
}
