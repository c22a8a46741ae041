//! Loading of the four resource files into an immutable [`SemanticResources`].
//!
//! Resources are read once, before any sentence is processed, and then shared read-only.
//! They come from a data directory (see [`default_data_dir`]) or from the copies compiled
//! into the crate ([`ResourcesBuilder::bundled`]).
use std::path::{Path, PathBuf};

use dlformal::prelude::*;
use log::info;
use strum::{Display, EnumString};

use crate::{
    magic::{
        ENV_DATA_DIR, LAMBDA_RULES_FILE, RELATION_PRIORITIES_FILE, STRUCTURAL_RULES_FILE,
        TYPES_FILE,
    },
    priority::RelationPriorityTable,
    rules::{RuleGroupSequence, loader::read_resource},
    utils::error::{DlError, DlResult},
};

const BUNDLED_TYPES: &str = include_str!("../lib_data/ud.types.toml");
const BUNDLED_STRUCTURAL_RULES: &str =
    include_str!("../lib_data/ud-tree-transformation-rules.toml");
const BUNDLED_RELATION_PRIORITIES: &str = include_str!("../lib_data/ud-relation-priorities.toml");
const BUNDLED_LAMBDA_RULES: &str = include_str!("../lib_data/ud-lambda-assignment-rules.toml");

/// Type comparator used by the logic services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ComparatorChoice {
    /// Subtype-tolerant comparison.
    #[default]
    Flexible,
    /// Structural equality only.
    Strict,
}

/// Everything the pipeline needs, loaded once.
#[derive(Debug)]
pub struct SemanticResources {
    /// Rule groups reshaping the tree.
    pub structural: RuleGroupSequence,
    /// Rule groups stamping lambda templates and composition hints.
    pub lambda: RuleGroupSequence,
    pub priorities: RelationPriorityTable,
    pub logic: LogicServices,
}

impl SemanticResources {
    pub fn builder() -> ResourcesBuilder {
        ResourcesBuilder::default()
    }

    /// Load from `dir` with the flexible comparator.
    pub fn load_from_dir(dir: &Path) -> DlResult<Self> {
        Self::builder().load_from_dir(dir)
    }

    /// Load the copies compiled into the crate with the flexible comparator.
    pub fn bundled() -> DlResult<Self> {
        Self::builder().bundled()
    }
}

/// The data directory named by `DEPLAMBDA_DATA_DIR`, or the `lib_data` directory of this
/// crate when the variable is not set.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        return dir.into();
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join("lib_data")
}

#[derive(Debug, Clone, Default)]
pub struct ResourcesBuilder {
    comparator: ComparatorChoice,
}

impl ResourcesBuilder {
    pub fn comparator(mut self, comparator: ComparatorChoice) -> Self {
        self.comparator = comparator;
        self
    }

    /// Load the four resource files from `dir`.
    pub fn load_from_dir(self, dir: &Path) -> DlResult<SemanticResources> {
        let source = |name: &str| -> DlResult<(String, String)> {
            let path = dir.join(name);
            Ok((read_resource(&path)?, path.display().to_string()))
        };
        let resources = self.build(
            source(TYPES_FILE)?,
            source(STRUCTURAL_RULES_FILE)?,
            source(RELATION_PRIORITIES_FILE)?,
            source(LAMBDA_RULES_FILE)?,
        )?;
        info!("Loaded semantic resources from '{}'", dir.display());
        Ok(resources)
    }

    /// Use the resource files compiled into the crate.
    pub fn bundled(self) -> DlResult<SemanticResources> {
        let source = |text: &str, name: &str| (text.to_string(), format!("<bundled>/{name}"));
        let resources = self.build(
            source(BUNDLED_TYPES, TYPES_FILE),
            source(BUNDLED_STRUCTURAL_RULES, STRUCTURAL_RULES_FILE),
            source(BUNDLED_RELATION_PRIORITIES, RELATION_PRIORITIES_FILE),
            source(BUNDLED_LAMBDA_RULES, LAMBDA_RULES_FILE),
        )?;
        info!("Loaded bundled semantic resources");
        Ok(resources)
    }

    /// Build from `(contents, label)` pairs.
    fn build(
        self,
        (types, types_file): (String, String),
        (structural, structural_file): (String, String),
        (priorities, priorities_file): (String, String),
        (lambda, lambda_file): (String, String),
    ) -> DlResult<SemanticResources> {
        let types = TypeRepository::from_toml_str(&types, &types_file).map_err(|e| match e {
            LogicError::TypesFileParse { file, source } => DlError::TomlParse { file, source },
            other => DlError::RuleLoad {
                file: types_file.clone(),
                message: other.to_string(),
            },
        })?;
        let logic = match self.comparator {
            ComparatorChoice::Flexible => LogicServices::new(types, FlexibleTypeComparator),
            ComparatorChoice::Strict => LogicServices::new(types, StrictTypeComparator),
        };

        Ok(SemanticResources {
            structural: RuleGroupSequence::from_toml_str(&structural, &structural_file)?,
            lambda: RuleGroupSequence::from_toml_str(&lambda, &lambda_file)?,
            priorities: RelationPriorityTable::from_toml_str(&priorities, &priorities_file)?,
            logic,
        })
    }
}
