use strum::EnumIs;
use thiserror::Error;

/// Errors raised while declaring types, constructing expressions or reading them back.
#[derive(Debug, Error, EnumIs)]
pub enum LogicError {
    #[error("I/O error while reading `{file}`: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse types file `{file}`: {source}")]
    TypesFileParse {
        file: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown type name `{0}`. Every name must be declared before it is referenced.")]
    UnknownType(String),

    #[error("Type `{0}` is declared more than once.")]
    DuplicateType(String),

    #[error("Invalid type expression `{text}`: {}", .messages.join("; "))]
    TypeSyntax { text: String, messages: Vec<String> },

    /// An argument is not accepted by the type comparator for the expected slot.
    #[error(
        "Argument `{argument}` of type `{found}` cannot be passed to `{function}`, which expects `{expected}`."
    )]
    TypeMismatch {
        function: String,
        argument: String,
        expected: String,
        found: String,
    },

    /// More arguments were supplied than the function type can consume.
    #[error("`{function}` of type `{ty}` cannot take the additional argument `{argument}`.")]
    NotAFunction {
        function: String,
        ty: String,
        argument: String,
    },

    #[error("Literal with predicate `{0}` has no arguments.")]
    EmptyLiteral(String),

    #[error(
        "Quantifier `{quantifier}` of type `{ty}` cannot bind a body of type `{body}`."
    )]
    InvalidQuantifier {
        quantifier: String,
        ty: String,
        body: String,
    },

    #[error("Variable `${0}` is not bound by any enclosing lambda or quantifier.")]
    UnboundVariable(String),

    #[error("Constant `{0}` carries no type annotation (expected `name:type`).")]
    UntypedConstant(String),

    #[error("Failed to read expression: {}", .0.join("; "))]
    Reader(Vec<String>),
}

pub type LogicResult<T> = Result<T, LogicError>;
