//! Produces encrypted password tokens for Maven settings files.
//!
//! With `--master` the value is encrypted as a master password for
//! `settings-security.xml`. Otherwise the value is encrypted as a
//! server password using the master password from the security file.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use m2settings::cipher;
use m2settings::security::{self, MASTER_PASSWORD_KEY};

#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Encrypt a master password for settings-security.xml instead of
    /// a server password.
    #[arg(long)]
    master: bool,

    /// The value to encrypt. Read from an interactive prompt when not
    /// given.
    #[arg(long)]
    value: Option<String>,

    /// Path to the security file holding the encrypted master password.
    /// Defaults to ~/.m2/settings-security.xml.
    #[arg(long, conflicts_with = "master")]
    security: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    let value = match opts.value {
        Some(value) => value,
        None => rpassword::prompt_password("Value to encrypt: ")?,
    };

    let token = if opts.master {
        cipher::encrypt_and_decorate(&value, MASTER_PASSWORD_KEY)?
    } else {
        let security_file = match opts.security {
            Some(path) => path,
            None => security::default_security_file()
                .context("Could not determine the home directory")?,
        };
        let Some(master) = security::read_master_password(&security_file)? else {
            bail!(
                "No master password found in {}. Encrypt one with --master first.",
                security_file.display()
            );
        };
        cipher::encrypt_and_decorate(&value, master.as_str())?
    };

    println!("{token}");
    Ok(())
}
