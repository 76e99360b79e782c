use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::merge;
use super::model::Settings;

#[derive(Error, Debug)]
pub enum SettingsBuildingError {
    #[error("Failed to read settings file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: quick_xml::DeError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemSeverity {
    /// The entry is suspect but still usable.
    Warning,
    /// The entry cannot be used as configured.
    Error,
}

impl fmt::Display for ProblemSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemSeverity::Warning => f.write_str("warning"),
            ProblemSeverity::Error => f.write_str("error"),
        }
    }
}

/// A validation finding from one settings file. Problems never abort the
/// build; they are reported alongside the best-effort result.
#[derive(Debug)]
pub struct SettingsProblem {
    pub severity: ProblemSeverity,
    pub message: String,
    pub source: PathBuf,
}

impl fmt::Display for SettingsProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} @ {}",
            self.severity,
            self.message,
            self.source.display()
        )
    }
}

#[derive(Debug)]
pub struct SettingsBuildingOutcome {
    pub settings: Settings,
    pub problems: Vec<SettingsProblem>,
}

/// Reads, validates and merges a global and a user settings file into
/// the effective settings.
pub struct SettingsBuilder {
    global_settings_file: Option<PathBuf>,
    user_settings_file: Option<PathBuf>,
}

impl SettingsBuilder {
    pub fn new(
        global_settings_file: Option<PathBuf>,
        user_settings_file: Option<PathBuf>,
    ) -> SettingsBuilder {
        SettingsBuilder {
            global_settings_file,
            user_settings_file,
        }
    }

    /// Builds the effective settings. Missing files are skipped; a file
    /// that exists but cannot be read or parsed fails the build. All
    /// validation findings are collected into the outcome.
    pub fn build(&self) -> Result<SettingsBuildingOutcome, SettingsBuildingError> {
        let mut problems = Vec::new();

        let global =
            Self::read_settings(self.global_settings_file.as_deref(), "Global", &mut problems)?;
        let user = Self::read_settings(self.user_settings_file.as_deref(), "User", &mut problems)?;

        let settings = match (user, global) {
            (Some(user), Some(global)) => merge::merge(user, global),
            (Some(user), None) => user,
            (None, Some(global)) => global,
            (None, None) => Settings::default(),
        };

        Ok(SettingsBuildingOutcome { settings, problems })
    }

    fn read_settings(
        path: Option<&Path>,
        label: &str,
        problems: &mut Vec<SettingsProblem>,
    ) -> Result<Option<Settings>, SettingsBuildingError> {
        let Some(path) = path else {
            return Ok(None);
        };
        if !path.is_file() {
            log::info!("{label} settings file {} does not exist, skipping", path.display());
            return Ok(None);
        }
        log::info!("{label} settings file {} found", path.display());

        let contents = std::fs::read_to_string(path).map_err(|source| SettingsBuildingError::Io {
            path: path.to_owned(),
            source,
        })?;
        let settings: Settings =
            quick_xml::de::from_str(&contents).map_err(|source| SettingsBuildingError::Parse {
                path: path.to_owned(),
                source,
            })?;

        validate(&settings, path, problems);
        Ok(Some(settings))
    }
}

fn validate(settings: &Settings, source: &Path, problems: &mut Vec<SettingsProblem>) {
    let mut report = |severity: ProblemSeverity, message: String| {
        problems.push(SettingsProblem {
            severity,
            message,
            source: source.to_owned(),
        });
    };

    let mut server_ids = HashSet::new();
    for server in &settings.servers.entries {
        if server.id.is_empty() {
            report(
                ProblemSeverity::Error,
                "'servers.server.id' must not be empty".to_owned(),
            );
        } else if !server_ids.insert(server.id.as_str()) {
            report(
                ProblemSeverity::Warning,
                format!(
                    "'servers.server.id' must be unique but found duplicate server with id {}",
                    server.id
                ),
            );
        }
    }

    let mut mirror_ids = HashSet::new();
    for mirror in &settings.mirrors.entries {
        if mirror.id.is_empty() {
            report(
                ProblemSeverity::Warning,
                "'mirrors.mirror.id' must not be empty".to_owned(),
            );
        } else if !mirror_ids.insert(mirror.id.as_str()) {
            report(
                ProblemSeverity::Warning,
                format!(
                    "'mirrors.mirror.id' must be unique but found duplicate mirror with id {}",
                    mirror.id
                ),
            );
        }
        if mirror.url.as_deref().is_none_or(str::is_empty) {
            report(
                ProblemSeverity::Error,
                format!(
                    "'mirrors.mirror.url' for {} is missing",
                    id_or_placeholder(&mirror.id)
                ),
            );
        }
    }

    let mut proxy_ids = HashSet::new();
    for proxy in &settings.proxies.entries {
        if !proxy.id.is_empty() && !proxy_ids.insert(proxy.id.as_str()) {
            report(
                ProblemSeverity::Warning,
                format!(
                    "'proxies.proxy.id' must be unique but found duplicate proxy with id {}",
                    proxy.id
                ),
            );
        }
        if proxy.host.as_deref().is_none_or(str::is_empty) {
            report(
                ProblemSeverity::Error,
                format!(
                    "'proxies.proxy.host' for {} is missing",
                    id_or_placeholder(&proxy.id)
                ),
            );
        }
    }
}

fn id_or_placeholder(id: &str) -> &str {
    if id.is_empty() { "(unnamed)" } else { id }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_missing_files_build_empty_settings() {
        let dir = TempDir::new().unwrap();
        let builder = SettingsBuilder::new(
            Some(dir.path().join("global.xml")),
            Some(dir.path().join("user.xml")),
        );

        let outcome = builder.build().unwrap();

        assert_eq!(outcome.settings, Settings::default());
        assert!(outcome.problems.is_empty());
    }

    #[test]
    fn test_user_file_alone_is_used_as_is() {
        let dir = TempDir::new().unwrap();
        let user = write(
            dir.path(),
            "user.xml",
            "<settings><servers><server><id>repo</id><username>dev</username></server></servers></settings>",
        );
        let builder = SettingsBuilder::new(None, Some(user));

        let outcome = builder.build().unwrap();

        assert_eq!(outcome.settings.servers.entries.len(), 1);
        assert_eq!(
            outcome.settings.server("repo").unwrap().username.as_deref(),
            Some("dev")
        );
    }

    #[test]
    fn test_user_settings_override_global_settings_by_id() {
        let dir = TempDir::new().unwrap();
        let global = write(
            dir.path(),
            "global.xml",
            "<settings>\
               <localRepository>/srv/maven/repository</localRepository>\
               <servers>\
                 <server><id>shared</id><username>global-level</username></server>\
                 <server><id>global-only</id><username>ops</username></server>\
               </servers>\
             </settings>",
        );
        let user = write(
            dir.path(),
            "user.xml",
            "<settings>\
               <localRepository>/home/dev/.m2/repository</localRepository>\
               <servers>\
                 <server><id>shared</id><username>user-level</username></server>\
               </servers>\
             </settings>",
        );
        let builder = SettingsBuilder::new(Some(global), Some(user));

        let outcome = builder.build().unwrap();
        let settings = outcome.settings;

        assert_eq!(
            settings.local_repository.as_deref(),
            Some("/home/dev/.m2/repository")
        );
        let ids: Vec<&str> = settings.servers.entries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["global-only", "shared"]);
        assert_eq!(
            settings.server("shared").unwrap().username.as_deref(),
            Some("user-level")
        );
    }

    #[test]
    fn test_duplicate_server_id_is_reported_but_not_fatal() {
        let dir = TempDir::new().unwrap();
        let user = write(
            dir.path(),
            "user.xml",
            "<settings><servers>\
               <server><id>repo</id></server>\
               <server><id>repo</id></server>\
             </servers></settings>",
        );
        let builder = SettingsBuilder::new(None, Some(user));

        let outcome = builder.build().unwrap();

        assert_eq!(outcome.settings.servers.entries.len(), 2);
        assert_eq!(outcome.problems.len(), 1);
        let problem = &outcome.problems[0];
        assert_eq!(problem.severity, ProblemSeverity::Warning);
        assert!(problem.message.contains("duplicate server with id repo"));
    }

    #[test]
    fn test_empty_server_id_is_reported() {
        let dir = TempDir::new().unwrap();
        let user = write(
            dir.path(),
            "user.xml",
            "<settings><servers><server><username>dev</username></server></servers></settings>",
        );
        let builder = SettingsBuilder::new(None, Some(user));

        let outcome = builder.build().unwrap();

        assert_eq!(outcome.problems.len(), 1);
        assert_eq!(outcome.problems[0].severity, ProblemSeverity::Error);
        assert!(outcome.problems[0]
            .message
            .contains("'servers.server.id' must not be empty"));
    }

    #[test]
    fn test_mirror_without_url_is_reported() {
        let dir = TempDir::new().unwrap();
        let user = write(
            dir.path(),
            "user.xml",
            "<settings><mirrors><mirror><id>broken</id><mirrorOf>central</mirrorOf></mirror></mirrors></settings>",
        );
        let builder = SettingsBuilder::new(None, Some(user));

        let outcome = builder.build().unwrap();

        assert_eq!(outcome.problems.len(), 1);
        assert!(outcome.problems[0]
            .message
            .contains("'mirrors.mirror.url' for broken is missing"));
    }

    #[test]
    fn test_proxy_without_host_is_reported() {
        let dir = TempDir::new().unwrap();
        let user = write(
            dir.path(),
            "user.xml",
            "<settings><proxies><proxy><id>corp</id><protocol>http</protocol></proxy></proxies></settings>",
        );
        let builder = SettingsBuilder::new(None, Some(user));

        let outcome = builder.build().unwrap();

        assert_eq!(outcome.problems.len(), 1);
        assert!(outcome.problems[0]
            .message
            .contains("'proxies.proxy.host' for corp is missing"));
    }

    #[test]
    fn test_problems_from_both_files_carry_their_source() {
        let dir = TempDir::new().unwrap();
        let global = write(
            dir.path(),
            "global.xml",
            "<settings><proxies><proxy><id>corp</id></proxy></proxies></settings>",
        );
        let user = write(
            dir.path(),
            "user.xml",
            "<settings><servers><server><id>a</id></server><server><id>a</id></server></servers></settings>",
        );
        let builder = SettingsBuilder::new(Some(global.clone()), Some(user.clone()));

        let outcome = builder.build().unwrap();

        assert_eq!(outcome.problems.len(), 2);
        assert_eq!(outcome.problems[0].source, global);
        assert_eq!(outcome.problems[1].source, user);
    }

    #[test]
    fn test_malformed_xml_fails_the_build() {
        let dir = TempDir::new().unwrap();
        let user = write(dir.path(), "user.xml", "<settings><servers>");
        let builder = SettingsBuilder::new(None, Some(user.clone()));

        let res = builder.build();

        assert!(matches!(res, Err(SettingsBuildingError::Parse { path, .. }) if path == user));
    }
}
