//! Reader for the printer's expression syntax using chumsky.
//!
//! Role
//! - Turn strings such as `(lambda $0:<a,e> (and:c (p_dog:u $0) (p_EMPTY:u $0)))` back into
//!   typed [`Expr`] values, so that fixtures and tests can state expected results as text.
//!
//! Three stages:
//! 1) Tokenisation into parentheses and symbols (any run of non-space, non-paren chars).
//! 2) Parsing the token stream into an owned s-expression tree.
//! 3) Resolution: symbols are classified and every sub-term is built through the typed
//!    constructors of [`Expr`], so the reader rejects ill-typed input.
//!
//! Accepted forms:
//! - `(lambda $x:T body)`: lambda abstraction; `T` is any type expression.
//! - `(q:T $x:T' body)`: quantifier `q` binding `$x` over `body` (the second element is
//!   a typed binder).
//! - `(head arg ...)`: literal; `head` may be a constant, a variable or a lambda.
//! - `$x`: a variable bound by an enclosing binder; names are local to the input.
//! - `name:type`: a constant, split at the last `:`; `12`: a numeral.
use chumsky::{input::ValueInput, prelude::*};

use crate::{
    error::{LogicError, LogicResult},
    expr::{Constant, Expr},
    services::LogicServices,
    variable::Variable,
};

type Span = SimpleSpan;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Token {
    LParen,
    RParen,
    Symbol(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Symbol(s) => write!(f, "{s}"),
        }
    }
}

// ---------------- Lexer ----------------

fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<Token>, extra::Err<Rich<'a, char>>> {
    let punct = choice((just('(').to(Token::LParen), just(')').to(Token::RParen)));

    let symbol = any()
        .filter(|c: &char| !c.is_whitespace() && *c != '(' && *c != ')')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| Token::Symbol(s.to_string()))
        .labelled("symbol");

    choice((punct, symbol))
        .padded()
        .repeated()
        .collect()
        .then_ignore(end())
}

// ---------------- Owned s-expression tree ----------------

#[derive(Debug, Clone)]
enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl std::fmt::Display for Sexp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sexp::Atom(s) => write!(f, "{s}"),
            Sexp::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn sexp_parser<'tokens, I>()
-> impl Parser<'tokens, I, Sexp, extra::Err<Rich<'tokens, Token, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    recursive(|sexp| {
        let atom = select! { Token::Symbol(s) => Sexp::Atom(s) }.labelled("symbol");

        let list = sexp
            .repeated()
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(Sexp::List)
            .labelled("list");

        atom.or(list)
    })
}

// ---------------- Resolution ----------------

struct Resolver<'s> {
    services: &'s LogicServices,
    // Innermost binder last.
    scopes: Vec<(String, Variable)>,
}

/// A `$name:type` binder, if `atom` has that shape.
fn split_binder(atom: &str) -> Option<(&str, &str)> {
    atom.strip_prefix('$')?.split_once(':')
}

impl<'s> Resolver<'s> {
    fn reader_error(message: String) -> LogicError {
        LogicError::Reader(vec![message])
    }

    fn lookup(&self, name: &str) -> LogicResult<Variable> {
        self.scopes
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, variable)| variable.clone())
            .ok_or_else(|| LogicError::UnboundVariable(name.to_string()))
    }

    fn binder(&self, sexp: &Sexp) -> LogicResult<(String, Variable)> {
        let Sexp::Atom(atom) = sexp else {
            return Err(Self::reader_error(format!(
                "expected a typed binder `$x:T`, found `{sexp}`"
            )));
        };
        let (name, type_text) = split_binder(atom).ok_or_else(|| {
            Self::reader_error(format!("expected a typed binder `$x:T`, found `{atom}`"))
        })?;
        let ty = self.services.types().resolve(type_text)?;
        Ok((name.to_string(), Variable::fresh(ty)))
    }

    fn constant(&self, atom: &str) -> LogicResult<Constant> {
        if !atom.is_empty() && atom.bytes().all(|b| b.is_ascii_digit()) {
            let value = atom
                .parse::<u64>()
                .map_err(|e| Self::reader_error(format!("invalid numeral `{atom}`: {e}")))?;
            return Constant::numeral(value, self.services.types());
        }

        let (name, type_name) = atom
            .rsplit_once(':')
            .ok_or_else(|| LogicError::UntypedConstant(atom.to_string()))?;
        Constant::new(name, type_name, self.services.types())
    }

    fn atom(&self, atom: &str) -> LogicResult<Expr> {
        match atom.strip_prefix('$') {
            Some(rest) => {
                let name = rest.split_once(':').map_or(rest, |(name, _)| name);
                Ok(self.lookup(name)?.into())
            }
            None => Ok(self.constant(atom)?.into()),
        }
    }

    fn scoped(&mut self, binder: &Sexp, body: &Sexp) -> LogicResult<(Variable, Expr)> {
        let (name, variable) = self.binder(binder)?;
        self.scopes.push((name, variable.clone()));
        let body = self.expr(body);
        self.scopes.pop();
        Ok((variable, body?))
    }

    fn expr(&mut self, sexp: &Sexp) -> LogicResult<Expr> {
        let items = match sexp {
            Sexp::Atom(atom) => return self.atom(atom),
            Sexp::List(items) => items,
        };

        match items.as_slice() {
            [Sexp::Atom(keyword), rest @ ..] if keyword == "lambda" => match rest {
                [binder, body] => {
                    let (variable, body) = self.scoped(binder, body)?;
                    Ok(Expr::lambda(variable, body))
                }
                _ => Err(Self::reader_error(format!(
                    "`lambda` takes a binder and a body, found `{sexp}`"
                ))),
            },
            [Sexp::Atom(quantifier), binder @ Sexp::Atom(b), body]
                if !quantifier.starts_with('$') && split_binder(b).is_some() =>
            {
                let quantifier = self.constant(quantifier)?;
                let (variable, body) = self.scoped(binder, body)?;
                Expr::quantified(self.services, quantifier, variable, body)
            }
            [head, arguments @ ..] => {
                let head = self.expr(head)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.expr(argument))
                    .collect::<LogicResult<Vec<_>>>()?;
                Expr::literal(self.services, head, arguments)
            }
            [] => Err(Self::reader_error("empty list".to_string())),
        }
    }
}

/// Read a printed expression, type-checking it against `services`.
///
/// Example
/// ```
/// use dlformal::prelude::*;
///
/// let mut types = TypeRepository::new("e", "t");
/// types.declare_complex("u", "<e,t>").unwrap();
/// let services = LogicServices::flexible(types);
///
/// let e = services.read("(lambda $x:e (p_dog:u $x))").unwrap();
/// assert_eq!(e.to_string(), "(lambda $0:e (p_dog:u $0))");
/// ```
pub fn read(services: &LogicServices, src: &str) -> LogicResult<Expr> {
    let (tokens, lex_errs) = lexer().parse(src).into_output_errors();
    let mut errors: Vec<String> = Vec::new();
    errors.extend(lex_errs.into_iter().map(|e| format!("lexing error: {e}")));

    let tokens = match tokens {
        Some(toks) => toks,
        None => return Err(LogicError::Reader(errors)),
    };

    let (sexp, parse_errs) = sexp_parser()
        .then_ignore(end())
        .parse(tokens.as_slice())
        .into_output_errors();
    errors.extend(parse_errs.into_iter().map(|e| format!("parse error: {e}")));

    match sexp {
        Some(sexp) if errors.is_empty() => Resolver {
            services,
            scopes: Vec::new(),
        }
        .expr(&sexp),
        _ => Err(LogicError::Reader(errors)),
    }
}
