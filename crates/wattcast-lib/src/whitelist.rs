//! Known-object gating
//!
//! The set of object ids seen during training, persisted next to the model
//! as a plain one-id-per-line sidecar. Scoring requests for ids outside the
//! set are dropped rather than extrapolated.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const SIDECAR_EXTENSION: &str = "dat";

/// Deduplicated set of known object ids, first-seen order preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectWhitelist {
    ids: Vec<String>,
    members: HashSet<String>,
}

impl ObjectWhitelist {
    /// Build from any id sequence; duplicates collapse onto their first
    /// occurrence.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut list = Self::default();
        for id in ids {
            if list.members.insert(id.clone()) {
                list.ids.push(id);
            }
        }
        list
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sidecar location for a given model path: same base name, `.dat`
    /// extension.
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension(SIDECAR_EXTENSION)
    }

    /// Write one id per line, no header, no escaping.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut contents = self.ids.join("\n");
        contents.push('\n');
        fs::write(path, contents)
            .with_context(|| format!("failed to write whitelist to {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read whitelist from {}", path.display()))?;
        Ok(Self::from_ids(
            contents
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        ))
    }
}
