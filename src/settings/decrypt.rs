use std::path::PathBuf;

use crate::cipher;
use crate::security::{self, MasterPassword};

use super::model::{Server, Settings};

/// Decrypts encrypted server credentials in place using the master
/// password from a security file.
///
/// Decryption is best-effort: a credential that cannot be decrypted is
/// logged and left as-is so that the remaining settings stay usable.
pub struct SettingsDecrypter {
    security_file: PathBuf,
}

impl SettingsDecrypter {
    pub fn new(security_file: PathBuf) -> SettingsDecrypter {
        SettingsDecrypter { security_file }
    }

    pub fn decrypt(&self, mut settings: Settings) -> Settings {
        if settings.servers.entries.is_empty() {
            return settings;
        }

        let master = match security::read_master_password(&self.security_file) {
            Ok(master) => master,
            Err(e) => {
                log::warn!(
                    "Could not read the master password from {}: {e}",
                    self.security_file.display()
                );
                log::debug!("Master password resolution failed: {e:?}");
                return settings;
            }
        };

        for server in &mut settings.servers.entries {
            decrypt_server(server, master.as_ref());
        }
        settings
    }
}

fn decrypt_server(server: &mut Server, master: Option<&MasterPassword>) {
    if let Some(password) = server.password.take() {
        server.password = Some(resolve_credential(&server.id, "password", password, master));
    }
    if let Some(passphrase) = server.passphrase.take() {
        server.passphrase = Some(resolve_credential(&server.id, "passphrase", passphrase, master));
    }
}

fn resolve_credential(
    server_id: &str,
    field: &str,
    value: String,
    master: Option<&MasterPassword>,
) -> String {
    // An environment reference looks like an encrypted token to the
    // brace scanner, so it has to be recognized first.
    if let Some(name) = env_reference(&value) {
        log::warn!("Server {server_id}: {field} references the environment variable {name}, leaving it unresolved");
        return value;
    }
    if !cipher::is_encrypted(&value) {
        return value;
    }
    let Some(master) = master else {
        log::warn!("Server {server_id}: {field} is encrypted but no master password is available");
        return value;
    };
    match cipher::decrypt_decorated(&value, master.as_str()) {
        Ok(clear) => {
            log::debug!("Server {server_id}: decrypted {field}");
            clear
        }
        Err(e) => {
            log::warn!("Server {server_id}: could not decrypt {field}: {e}");
            log::debug!("Server {server_id}: {field} decryption failed: {e:?}");
            value
        }
    }
}

/// Returns the variable name if the whole value is a `${env.NAME}`
/// reference.
fn env_reference(value: &str) -> Option<&str> {
    let name = value.strip_prefix("${env.")?.strip_suffix('}')?;
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        Some(name)
    } else {
        None
    }
}
