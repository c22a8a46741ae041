//! Relation priority table: which dependents combine with their head first.
//!
//! The TOML file lists labels from earliest to latest combination; explicit ranks may
//! be given for labels that share a rank:
//!
//! ```toml
//! order = ["case", "det", "nmod", "punct"]
//!
//! [rank]
//! "nmod:tmod" = 2
//! ```
use std::{collections::HashMap, path::Path};

use log::{info, warn};
use serde::Deserialize;

use crate::{
    rules::loader::read_resource,
    utils::error::{DlError, DlResult},
};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PriorityFile {
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    rank: HashMap<String, u32>,
}

/// Mapping from relation label to rank; lower ranks combine earlier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationPriorityTable {
    ranks: HashMap<String, u32>,
    default_rank: u32,
}

impl RelationPriorityTable {
    /// Build a table where each label's rank is its position in `order`.
    pub fn from_order<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ranks: HashMap<String, u32> = order
            .into_iter()
            .zip(0..)
            .map(|(label, rank)| (label.into(), rank))
            .collect();
        let default_rank = ranks.len() as u32;
        Self {
            ranks,
            default_rank,
        }
    }

    /// Parse a TOML priority file. `file` only labels error messages.
    pub fn from_toml_str(source: &str, file: &str) -> DlResult<Self> {
        let decls: PriorityFile = toml::from_str(source).map_err(|source| DlError::TomlParse {
            file: file.to_string(),
            source,
        })?;
        let error = |message: String| DlError::RuleLoad {
            file: file.to_string(),
            message,
        };

        let mut ranks = HashMap::new();
        for (rank, label) in (0u32..).zip(&decls.order) {
            if ranks.insert(label.clone(), rank).is_some() {
                return Err(error(format!("relation '{label}' appears twice in `order`")));
            }
        }
        for (label, rank) in decls.rank {
            if ranks.insert(label.clone(), rank).is_some() {
                return Err(error(format!(
                    "relation '{label}' is ranked both in `order` and in `[rank]`"
                )));
            }
        }
        if ranks.is_empty() {
            return Err(error("no relation is ranked".to_string()));
        }

        let default_rank = ranks.values().max().map_or(0, |max| max + 1);
        info!("Loaded {} relation priorities from '{}'", ranks.len(), file);
        Ok(Self {
            ranks,
            default_rank,
        })
    }

    /// Load a TOML priority file from disk.
    pub fn load_from_toml(path: &Path) -> DlResult<Self> {
        Self::from_toml_str(&read_resource(path)?, &path.display().to_string())
    }

    /// Rank of `relation`.
    ///
    /// Subtyped labels such as `nmod:poss` fall back to their base label; labels with no
    /// configured rank get [`Self::default_rank`].
    pub fn rank(&self, relation: &str) -> u32 {
        if let Some(rank) = self.ranks.get(relation) {
            return *rank;
        }
        if let Some((base, _)) = relation.split_once(':')
            && let Some(rank) = self.ranks.get(base)
        {
            return *rank;
        }
        warn!(
            "Relation '{}' has no priority, using lowest priority {}",
            relation, self.default_rank
        );
        self.default_rank
    }

    /// The rank given to unknown relations, lower in priority than any configured one.
    pub fn default_rank(&self) -> u32 {
        self.default_rank
    }

    pub fn contains(&self, relation: &str) -> bool {
        self.ranks.contains_key(relation)
    }
}
