use dlformal::error::LogicError;
use strum::EnumIs;
use thiserror::Error;

/// Reasons a token list cannot be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error, EnumIs)]
pub enum MalformedInput {
    #[error("sentence has no tokens")]
    Empty,

    #[error("token at position {position} declares index {index}")]
    IndexMismatch { position: usize, index: usize },

    #[error("no token has head 0")]
    MissingRoot,

    #[error("tokens {0:?} all have head 0")]
    MultipleRoots(Vec<usize>),

    #[error("token {index} has head {head}, which is not a token of the sentence")]
    DanglingHead { index: usize, head: usize },

    #[error("following heads from token {index} never reaches the root")]
    Cycle { index: usize },

    #[error("token {index} lies deeper than {limit} nodes below the root")]
    TooDeep { index: usize, limit: usize },
}

#[derive(Debug, Error, EnumIs)]
pub enum DlError {
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),

    #[error("Invalid rule configuration in '{file}': {message}")]
    RuleLoad { file: String, message: String },

    #[error("Failed to parse '{file}': {source}")]
    TomlParse {
        file: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error while reading '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid sentence record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Composition plan is {depth} merges deep, more than the limit of {limit}")]
    PlanTooDeep { depth: usize, limit: usize },

    #[error("Rule group '{group}' did not reach a fixpoint within {cap} rule applications")]
    NonConvergence { group: String, cap: usize },

    #[error("Cannot compose '{left}' with '{right}': {source}")]
    CompositionType {
        left: String,
        right: String,
        #[source]
        source: LogicError,
    },

    #[error("Cannot build the meaning of '{node}': {source}")]
    LeafType {
        node: String,
        #[source]
        source: LogicError,
    },

    #[error("Unknown lambda template '{template}' on node '{node}'")]
    UnknownTemplate { node: String, template: String },

    #[error("Rule '{rule}' uses placeholder '{{{placeholder}}}', which does not resolve on this node")]
    UnresolvedPlaceholder { rule: String, placeholder: String },

    #[error(transparent)]
    Logic(#[from] LogicError),
}

impl DlError {
    /// Errors raised while loading resources or building the composer; fatal to the
    /// process. Per-sentence logic errors are reported as [`DlError::CompositionType`] or
    /// [`DlError::LeafType`].
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DlError::RuleLoad { .. }
                | DlError::TomlParse { .. }
                | DlError::Io { .. }
                | DlError::Logic(_)
        )
    }
}

pub type DlResult<T> = Result<T, DlError>;
