/// Name of the environment variable pointing to a directory holding the four resource files.
/// If not set, defaults to the `lib_data` directory shipped with this crate.
pub const ENV_DATA_DIR: &str = "DEPLAMBDA_DATA_DIR";

/// Resource file names, relative to the data directory.
pub const TYPES_FILE: &str = "ud.types.toml";
pub const STRUCTURAL_RULES_FILE: &str = "ud-tree-transformation-rules.toml";
pub const RELATION_PRIORITIES_FILE: &str = "ud-relation-priorities.toml";
pub const LAMBDA_RULES_FILE: &str = "ud-lambda-assignment-rules.toml";

/// Node attribute holding lambda readings, one value per reading.
pub const LAMBDA_KEY: &str = "lambda";
/// Node attribute selecting how a dependent combines with its head.
pub const COMPOSITION_KEY: &str = "composition";
/// Node attribute naming the link predicate of an existential dependent.
pub const LINK_KEY: &str = "link";

/// Lambda template identifiers.
pub const TEMPLATE_TYPE: &str = "TYPE";
pub const TEMPLATE_EVENT: &str = "EVENT";
pub const TEMPLATE_ARG1: &str = "ARG1";
pub const TEMPLATE_EMPTY: &str = "EMPTY";

/// Composition strategies.
pub const COMPOSITION_CONJOIN: &str = "conjoin";
pub const COMPOSITION_EXISTENTIAL: &str = "existential";

/// Type names the composer resolves against the type repository.
pub const VARIABLE_TYPE_NAME: &str = "v";
pub const UNARY_TYPE_NAME: &str = "u";
pub const BINARY_TYPE_NAME: &str = "b";
pub const CONJUNCTION: (&str, &str) = ("and", "c");
pub const EXISTENTIAL: (&str, &str) = ("exists", "ex");

/// Predicate names minted by the composer.
pub const PREDICATE_TYPE_PREFIX: &str = "p_TYPE_";
pub const PREDICATE_EVENT_PREFIX: &str = "p_EVENT_";
pub const PREDICATE_LINK_PREFIX: &str = "p_EVENT.ENTITY_";
pub const PREDICATE_ARG1: &str = "p_EVENT.ENTITY_arg1";
pub const PREDICATE_ARG2: &str = "p_EVENT.ENTITY_arg2";
pub const PREDICATE_EMPTY: &str = "p_EMPTY";

/// A rule group may perform at most
/// `ITERATION_CAP_FACTOR * (nodes + 1) * (rules + 1)` effective applications.
pub const ITERATION_CAP_FACTOR: usize = 4;

/// Deepest tree accepted from the input, counting the root as depth 1.
pub const MAX_TREE_DEPTH: usize = 64;
/// Deepest binary plan the composer accepts. Expressions nest about as deep as the plan.
pub const MAX_PLAN_DEPTH: usize = 128;

/// Candidates kept after each merge; readings beyond it are dropped in order.
pub const MAX_READINGS: usize = 64;
