use crate::DftError;
use candid::Principal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Maps a human alias ("alice") to the principal it signs as.
pub trait IdentityResolver {
    fn principal_of(&self, alias: &str) -> Result<Principal, DftError>;
}

impl<F> IdentityResolver for F
where
    F: Fn(&str) -> Option<Principal>,
{
    fn principal_of(&self, alias: &str) -> Result<Principal, DftError> {
        self(alias).ok_or_else(|| DftError::UnknownIdentity {
            alias: alias.to_string(),
        })
    }
}

/// On-disk shape of an identity file.
///
/// ```toml
/// [identities]
/// alice = "2vxsx-fae"
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
struct IdentityFile {
    #[serde(default)]
    identities: BTreeMap<String, String>,
}

/// In-memory alias → principal registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityBook {
    entries: BTreeMap<String, Principal>,
}

impl IdentityBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an alias.
    pub fn insert(&mut self, alias: impl Into<String>, principal: Principal) {
        self.entries.insert(alias.into(), principal);
    }

    /// Register an alias from principal text.
    pub fn insert_text(&mut self, alias: &str, principal_text: &str) -> Result<(), String> {
        let principal = Principal::from_text(principal_text).map_err(|e| {
            format!(
                "Invalid principal '{}' for identity '{}': {}",
                principal_text, alias, e
            )
        })?;
        self.insert(alias, principal);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Load an identity book from TOML (`[identities]` table) or, for a
    /// `.json` path, from a flat JSON object of alias → principal text.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let raw: BTreeMap<String, String> = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str::<IdentityFile>(&content)?.identities
        };

        let mut book = Self::new();
        for (alias, text) in &raw {
            book.insert_text(alias, text)?;
        }
        log::debug!(
            "loaded {} identities from {}",
            book.len(),
            path.display()
        );
        Ok(book)
    }

    /// Save the book as TOML.
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let file = IdentityFile {
            identities: self
                .entries
                .iter()
                .map(|(alias, p)| (alias.clone(), p.to_text()))
                .collect(),
        };
        fs::write(path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl IdentityResolver for IdentityBook {
    fn principal_of(&self, alias: &str) -> Result<Principal, DftError> {
        self.entries
            .get(alias)
            .copied()
            .ok_or_else(|| DftError::UnknownIdentity {
                alias: alias.to_string(),
            })
    }
}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
