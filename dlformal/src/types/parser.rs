//! Parser for type expressions: declared names, `<domain,range>` and postfix `*`.
use chumsky::prelude::*;

use crate::{
    error::{LogicError, LogicResult},
    types::{Type, TypeRepository},
};

pub fn type_name_parser<'src>()
-> impl Parser<'src, &'src str, &'src str, extra::Err<Rich<'src, char>>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
        .labelled("type name")
}

/// Type syntax before names are resolved against a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTerm<'src> {
    Named(&'src str),
    Function(Box<TypeTerm<'src>>, Box<TypeTerm<'src>>),
    Array(Box<TypeTerm<'src>>),
}

pub fn type_parser<'src>()
-> impl Parser<'src, &'src str, TypeTerm<'src>, extra::Err<Rich<'src, char>>> + Clone {
    recursive(|ty| {
        let named = type_name_parser().map(TypeTerm::Named);

        let function = ty
            .clone()
            .padded()
            .then_ignore(just(','))
            .then(ty.padded())
            .delimited_by(just('<'), just('>'))
            .map(|(domain, range)| TypeTerm::Function(Box::new(domain), Box::new(range)))
            .labelled("function type");

        choice((function, named))
            .then(just('*').repeated().count())
            .map(|(ty, stars)| (0..stars).fold(ty, |ty, _| TypeTerm::Array(Box::new(ty))))
            .labelled("type")
    })
}

impl TypeTerm<'_> {
    /// Resolve every name against `repo`, collecting the names it does not declare.
    fn resolve(&self, repo: &TypeRepository, unknown: &mut Vec<String>) -> Option<Type> {
        match self {
            TypeTerm::Named(name) => {
                let found = repo.get_type(name).cloned();
                if found.is_none() {
                    unknown.push(format!("unknown type name `{name}`"));
                }
                found
            }
            TypeTerm::Function(domain, range) => {
                let domain = domain.resolve(repo, unknown);
                let range = range.resolve(repo, unknown);
                Some(Type::function(domain?, range?))
            }
            TypeTerm::Array(element) => Some(Type::array(element.resolve(repo, unknown)?)),
        }
    }
}

/// Parse `text` into a [`Type`], resolving names against `repo`.
pub fn parse_type(repo: &TypeRepository, text: &str) -> LogicResult<Type> {
    let (syntax, errors) = type_parser()
        .padded()
        .then_ignore(end())
        .parse(text)
        .into_output_errors();

    let syntax_error = |messages: Vec<String>| LogicError::TypeSyntax {
        text: text.to_string(),
        messages,
    };
    let syntax = match syntax {
        Some(syntax) if errors.is_empty() => syntax,
        _ => return Err(syntax_error(errors.into_iter().map(|e| e.to_string()).collect())),
    };

    let mut unknown = Vec::new();
    match syntax.resolve(repo, &mut unknown) {
        Some(ty) if unknown.is_empty() => Ok(ty),
        _ => Err(syntax_error(unknown)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> TypeRepository {
        let mut repo = TypeRepository::new("e", "t");
        repo.declare_primitive("a", None).unwrap();
        repo.declare_complex("v", "<a,e>").unwrap();
        repo
    }

    #[test]
    fn parses_nested_functions_and_aliases() {
        let repo = repo();
        let ty = parse_type(&repo, "< v , <v,t> >").unwrap();
        assert_eq!(ty.to_string(), "<<a,e>,<<a,e>,t>>");
    }

    #[test]
    fn parses_arrays() {
        let repo = repo();
        assert_eq!(parse_type(&repo, "<t*,t>").unwrap().to_string(), "<t*,t>");
        assert!(parse_type(&repo, "t*").unwrap().is_array());
    }

    #[test]
    fn reports_unknown_names() {
        let repo = repo();
        let err = parse_type(&repo, "<x,t>").unwrap_err();
        match err {
            LogicError::TypeSyntax { messages, .. } => {
                assert!(messages.iter().any(|m| m.contains("unknown type name `x`")))
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn reports_every_unknown_name() {
        let repo = repo();
        for (text, name) in [("x", "x"), ("<a,x>", "x"), ("<y,t>*", "y")] {
            match parse_type(&repo, text).unwrap_err() {
                LogicError::TypeSyntax { messages, .. } => assert_eq!(
                    messages,
                    vec![format!("unknown type name `{name}`")],
                    "while parsing {text}"
                ),
                other => panic!("unexpected error {other}"),
            }
        }
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        assert!(parse_type(&repo(), "<a,e").is_err());
    }
}
