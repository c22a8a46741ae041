use std::{collections::HashSet, path::Path};

use log::info;

use crate::{
    rules::RuleGroupSequence,
    utils::error::{DlError, DlResult},
};

/// Read a file into a string, labelling I/O errors with its path.
pub(crate) fn read_resource(path: &Path) -> DlResult<String> {
    std::fs::read_to_string(path).map_err(|source| DlError::Io {
        file: path.display().to_string(),
        source,
    })
}

impl RuleGroupSequence {
    /// Parse and validate a TOML rule file. `file` only labels error messages.
    pub fn from_toml_str(source: &str, file: &str) -> DlResult<Self> {
        let sequence: RuleGroupSequence =
            toml::from_str(source).map_err(|source| DlError::TomlParse {
                file: file.to_string(),
                source,
            })?;
        sequence.validate(file)?;

        info!(
            "Loaded {} rule groups ({} rules) from '{}'",
            sequence.groups.len(),
            sequence.rule_count(),
            file
        );
        Ok(sequence)
    }

    /// Load a TOML rule file from disk.
    pub fn load_from_toml(path: &Path) -> DlResult<Self> {
        Self::from_toml_str(&read_resource(path)?, &path.display().to_string())
    }

    fn validate(&self, file: &str) -> DlResult<()> {
        let error = |message: String| DlError::RuleLoad {
            file: file.to_string(),
            message,
        };

        let mut group_names = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err(error("rule group with an empty name".to_string()));
            }
            if !group_names.insert(group.name.as_str()) {
                return Err(error(format!("rule group '{}' is declared twice", group.name)));
            }

            let mut rule_names = HashSet::new();
            for rule in &group.rules {
                if rule.name.trim().is_empty() {
                    return Err(error(format!(
                        "rule with an empty name in group '{}'",
                        group.name
                    )));
                }
                if !rule_names.insert(rule.name.as_str()) {
                    return Err(error(format!(
                        "rule '{}' is declared twice in group '{}'",
                        rule.name, group.name
                    )));
                }
                if rule.then.is_empty() {
                    return Err(error(format!(
                        "rule '{}' in group '{}' has no actions",
                        rule.name, group.name
                    )));
                }
            }
        }
        Ok(())
    }
}
