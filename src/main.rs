use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tabled::{settings::Style, Table, Tabled};

use m2settings::loader::SettingsLoader;
use m2settings::settings::Settings;

const MASK: &str = "***";

#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Path to the user settings file.
    /// Defaults to ~/.m2/settings.xml.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Path to the security file holding the encrypted master password.
    /// Defaults to ~/.m2/settings-security.xml.
    #[arg(long)]
    security: Option<PathBuf>,

    /// Print decrypted passwords and passphrases instead of masking
    /// them as ***.
    #[arg(long)]
    show_secrets: bool,

    /// Print the effective settings as an XML document instead of
    /// tables.
    #[arg(long)]
    xml: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    let loader = SettingsLoader::from_environment(opts.settings, opts.security)?;
    let mut settings = loader
        .load_settings()
        .context("Failed to build the effective settings")?;

    if !opts.show_secrets {
        mask_credentials(&mut settings);
    }

    if opts.xml {
        println!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        println!("{}", settings.to_xml()?);
    } else {
        print_tables(&settings);
    }

    Ok(())
}

fn mask_credentials(settings: &mut Settings) {
    for server in &mut settings.servers.entries {
        if server.password.is_some() {
            server.password = Some(MASK.to_owned());
        }
        if server.passphrase.is_some() {
            server.passphrase = Some(MASK.to_owned());
        }
    }
    for proxy in &mut settings.proxies.entries {
        if proxy.password.is_some() {
            proxy.password = Some(MASK.to_owned());
        }
    }
}

#[derive(Tabled)]
struct ServerRow<'a> {
    #[tabled(rename = "ID")]
    id: &'a str,
    #[tabled(rename = "USERNAME")]
    username: &'a str,
    #[tabled(rename = "PASSWORD")]
    password: &'a str,
    #[tabled(rename = "PASSPHRASE")]
    passphrase: &'a str,
}

#[derive(Tabled)]
struct MirrorRow<'a> {
    #[tabled(rename = "ID")]
    id: &'a str,
    #[tabled(rename = "MIRROR OF")]
    mirror_of: &'a str,
    #[tabled(rename = "URL")]
    url: &'a str,
    #[tabled(rename = "NAME")]
    name: &'a str,
}

#[derive(Tabled)]
struct ProxyRow<'a> {
    #[tabled(rename = "ID")]
    id: &'a str,
    #[tabled(rename = "PROTOCOL")]
    protocol: &'a str,
    #[tabled(rename = "HOST")]
    host: &'a str,
    #[tabled(rename = "PORT")]
    port: String,
    #[tabled(rename = "USERNAME")]
    username: &'a str,
    #[tabled(rename = "PASSWORD")]
    password: &'a str,
}

fn print_tables(settings: &Settings) {
    if let Some(local_repository) = &settings.local_repository {
        println!("Local repository: {local_repository}");
        println!();
    }

    println!("Servers:");
    if settings.servers.entries.is_empty() {
        println!("No servers configured.");
    } else {
        let rows = settings.servers.entries.iter().map(|server| ServerRow {
            id: &server.id,
            username: server.username.as_deref().unwrap_or(""),
            password: server.password.as_deref().unwrap_or(""),
            passphrase: server.passphrase.as_deref().unwrap_or(""),
        });
        print_table(rows);
    }
    println!();

    println!("Mirrors:");
    if settings.mirrors.entries.is_empty() {
        println!("No mirrors configured.");
    } else {
        let rows = settings.mirrors.entries.iter().map(|mirror| MirrorRow {
            id: &mirror.id,
            mirror_of: mirror.mirror_of.as_deref().unwrap_or(""),
            url: mirror.url.as_deref().unwrap_or(""),
            name: mirror.name.as_deref().unwrap_or(""),
        });
        print_table(rows);
    }
    println!();

    println!("Proxies:");
    if settings.proxies.entries.is_empty() {
        println!("No proxies configured.");
    } else {
        let rows = settings.proxies.entries.iter().map(|proxy| ProxyRow {
            id: &proxy.id,
            protocol: proxy.protocol.as_deref().unwrap_or(""),
            host: proxy.host.as_deref().unwrap_or(""),
            port: proxy.port.map(|p| p.to_string()).unwrap_or_default(),
            username: proxy.username.as_deref().unwrap_or(""),
            password: proxy.password.as_deref().unwrap_or(""),
        });
        print_table(rows);
    }
}

fn print_table<I>(rows: I)
where
    I: IntoIterator,
    I::Item: Tabled,
{
    let mut table = Table::new(rows);
    table.with(Style::blank());
    println!("{table}");
}
