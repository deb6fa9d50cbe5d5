//! Localized Messages
//!
//! User-facing templates for fatal errors. The catalog is embedded at
//! build time and keyed by culture; the agent exposes its culture through
//! `SYSTEM_CULTURE`. Templates use positional `{0}`, `{1}` placeholders.

use std::collections::HashMap;

use log::warn;
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Culture used when the agent's culture has no catalog entry.
pub const DEFAULT_CULTURE: &str = "en-US";

const CATALOG_JSON: &str = include_str!("../resources/messages.json");

/// Templates by culture, then by message key.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
struct Catalog {
    cultures: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    fn template(&self, culture: &str, key: &str) -> Option<&String> {
        self.cultures.get(culture).and_then(|messages| messages.get(key))
    }
}

static CATALOG: Lazy<Catalog> = Lazy::new(|| {
    serde_json::from_str(CATALOG_JSON).unwrap_or_else(|e| {
        warn!("Message catalog is malformed: {}", e);
        Catalog::default()
    })
});

/// Identifiers of the catalog templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    InstallationFailed,
    CreateFailed,
    PackageInstallFailed,
    DownloadFailed,
}

impl MessageId {
    /// Catalog key for this message.
    pub fn key(self) -> &'static str {
        match self {
            Self::InstallationFailed => "InstallationFailed",
            Self::CreateFailed => "CreateFailed",
            Self::PackageInstallFailed => "PackageInstallFailed",
            Self::DownloadFailed => "DownloadFailed",
        }
    }
}

/// Formats a message in the agent's culture.
pub fn format(id: MessageId, args: &[&str]) -> String {
    let culture = std::env::var("SYSTEM_CULTURE").unwrap_or_else(|_| DEFAULT_CULTURE.to_string());
    format_in(&culture, id, args)
}

/// Formats a message in an explicit culture, falling back to [`DEFAULT_CULTURE`].
pub fn format_in(culture: &str, id: MessageId, args: &[&str]) -> String {
    let template = CATALOG
        .template(culture, id.key())
        .or_else(|| CATALOG.template(DEFAULT_CULTURE, id.key()));

    match template {
        Some(template) => substitute(template, args),
        // Keep the underlying error visible even without a template.
        None => format!("{} {}", id.key(), args.join(" ")),
    }
}

fn substitute(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |text, (i, arg)| {
            text.replace(&format!("{{{}}}", i), arg)
        })
}
