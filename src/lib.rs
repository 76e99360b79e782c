//! Effective Maven settings for build tooling.
//!
//! Reads and merges the global and per-user `settings.xml` files, and
//! decrypts encrypted server credentials with the master password from
//! `settings-security.xml`. The cipher is wire-compatible with Maven's
//! password encryption, so tokens produced by either tool decrypt with
//! the other.

pub mod cipher;
pub mod loader;
pub mod security;
pub mod settings;
