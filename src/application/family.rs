//! Family export files: parsing and root selection
//!
//! A family file holds the already-scoped records of one family:
//!
//! ```json
//! {
//!   "members": [{ "id": "…", "firstName": "Ada", "isRoot": true }],
//!   "relationships": [{ "sourceMemberId": "…", "targetMemberId": "…", "type": "Husband" }]
//! }
//! ```
//!
//! TOML files use the same keys with `[[members]]` / `[[relationships]]` tables.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{DomainError, Member, MemberId, Relationship};

/// Members and relationships of one family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyData {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl FamilyData {
    /// Parse file content, choosing the format by extension (`json` or `toml`).
    pub fn parse(content: &str, path: &Path) -> Result<Self, DomainError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let data: FamilyData = match ext.as_deref() {
            Some("json") => serde_json::from_str(content).map_err(|e| invalid(path, e))?,
            Some("toml") => toml::from_str(content).map_err(|e| invalid(path, e))?,
            _ => return Err(DomainError::UnsupportedFormat(path.to_path_buf())),
        };

        Ok(data.dedup_members())
    }

    /// Drop repeated member ids; the first record wins.
    fn dedup_members(mut self) -> Self {
        let mut seen = HashSet::new();
        let before = self.members.len();
        self.members.retain(|m| {
            let fresh = seen.insert(m.id);
            if !fresh {
                warn!("duplicate member id {}, keeping first record", m.id);
            }
            fresh
        });
        if before != self.members.len() {
            debug!("removed {} duplicate members", before - self.members.len());
        }
        self
    }

    /// The member flagged `isRoot`; the first one wins if several are flagged.
    pub fn default_root(&self) -> Option<MemberId> {
        let mut flagged = self.members.iter().filter(|m| m.is_root);
        let first = flagged.next()?;
        if flagged.next().is_some() {
            warn!("several members flagged isRoot, using {}", first.id);
        }
        Some(first.id)
    }
}

fn invalid(path: &Path, e: impl std::fmt::Display) -> DomainError {
    DomainError::InvalidFamilyData {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
