use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use directories_next::UserDirs;
use serde::Deserialize;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::cipher::{self, CipherError};

/// Cipher key for the master password itself. Maven keys it with the
/// name of the property that points at the security file, so compatible
/// tokens have to use the same string.
pub const MASTER_PASSWORD_KEY: &str = "settings.security";

const MAX_RELOCATIONS: usize = 5;

#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("Failed to read security file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse security file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: quick_xml::DeError,
    },
    #[error("Security file {} does not contain a master password", .path.display())]
    MissingMaster { path: PathBuf },
    #[error("Security file relocation chain is longer than {MAX_RELOCATIONS} files")]
    TooManyRelocations,
    #[error("Failed to decrypt the master password")]
    MasterDecryption(#[from] CipherError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SettingsSecurity {
    master: Option<String>,
    relocation: Option<String>,
}

/// Decrypted master password, used as the cipher key for all encrypted
/// server credentials of one load.
pub struct MasterPassword(Zeroizing<String>);

impl MasterPassword {
    fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterPassword(***)")
    }
}

/// Default security file location, `~/.m2/settings-security.xml`.
pub fn default_security_file() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    Some(dirs.home_dir().join(".m2").join("settings-security.xml"))
}

/// Reads and decrypts the master password from the security file at
/// `path`.
///
/// A missing file is not an error: `Ok(None)` lets callers continue
/// without decryption. `<relocation>` elements are followed, with `~/`
/// expanded and relative targets resolved against the referring file;
/// a relocation target that does not exist is an error, and chains are
/// cut off after a few hops to reject cycles.
pub fn read_master_password(path: &Path) -> Result<Option<MasterPassword>, SecurityError> {
    if !path.is_file() {
        log::debug!("Security file {} does not exist", path.display());
        return Ok(None);
    }
    read_security_file(path, 0)
}

fn read_security_file(path: &Path, depth: usize) -> Result<Option<MasterPassword>, SecurityError> {
    if depth > MAX_RELOCATIONS {
        return Err(SecurityError::TooManyRelocations);
    }

    let contents = std::fs::read_to_string(path).map_err(|source| SecurityError::Io {
        path: path.to_owned(),
        source,
    })?;
    let security: SettingsSecurity =
        quick_xml::de::from_str(&contents).map_err(|source| SecurityError::Parse {
            path: path.to_owned(),
            source,
        })?;

    if let Some(target) = security.relocation.as_deref().filter(|r| !r.trim().is_empty()) {
        let target = resolve_relocation(path, target.trim());
        log::debug!(
            "Security file {} relocates to {}",
            path.display(),
            target.display()
        );
        return read_security_file(&target, depth + 1);
    }

    let master = security
        .master
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| SecurityError::MissingMaster {
            path: path.to_owned(),
        })?;

    let clear = cipher::decrypt_decorated(&master, MASTER_PASSWORD_KEY)?;
    Ok(Some(MasterPassword::new(clear)))
}

fn resolve_relocation(referrer: &Path, target: &str) -> PathBuf {
    let expanded = match target.strip_prefix("~/") {
        Some(rest) => match UserDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest),
            None => PathBuf::from(target),
        },
        None => PathBuf::from(target),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        match referrer.parent() {
            Some(dir) => dir.join(expanded),
            None => expanded,
        }
    }
}
