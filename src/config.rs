use std::path::Path;

use anyhow::Context;
use confique::Config as DeriveConfig;

use crate::flatten::{ArrayPolicy, KeyPolicy};

#[derive(Debug, DeriveConfig)]
pub struct Config {
    /// How lookup keys are derived from the answers document: `"path"` joins
    /// the property names from the root with dots (`contact.email`),
    /// `"shallow"` keeps only the innermost property name.
    #[config(default = "path")]
    pub key_policy: KeyPolicy,

    /// How arrays in the answers document are flattened: `"whole"` records
    /// the array verbatim under its key, `"elementwise"` descends into each
    /// element.
    #[config(default = "whole")]
    pub array_policy: ArrayPolicy,

    /// List field identifiers that found no matching answer once the merge
    /// has finished. Off by default; unmatched fields are not an error.
    #[config(default = false)]
    pub report_unmatched: bool,
}

/// Load the configuration from an optional TOML file; a missing file yields
/// the defaults.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    Config::builder()
        .file(path)
        .load()
        .with_context(|| format!("failed to load configuration from `{}`", path.display()))
}
