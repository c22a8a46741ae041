//! RcDoc-based printer with termcolor annotations for [`Expr`].
//!
//! Role
//! - Render expressions in the reader's syntax: `(lambda $0:<a,e> (and:c (p:u $0) ...))`.
//! - Number variables `$0`, `$1`, ... in the order they are bound during a depth-first,
//!   left-to-right walk, so alpha-equivalent expressions print identically.
//! - Provide colored output for terminals and plain strings for logs/tests.
//!
//! The document only uses hard spaces, so the rendering is always a single line.

use std::collections::HashMap;
use std::io::{self, Write};

use pretty::{FmtWrite, RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::expr::{Constant, Expr};
use crate::variable::Variable;

/// Styles used to annotate parts of the printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Parentheses are colored by nesting depth so matching pairs share a color.
    Paren(u8),
    Keyword,
    Constant,
    Ident,
    Type,
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Paren(depth) => {
                let fg = match depth % 6 {
                    0 => Color::Blue,
                    1 => Color::Green,
                    2 => Color::White,
                    3 => Color::Yellow,
                    4 => Color::Red,
                    5 => Color::Magenta,
                    _ => unreachable!(),
                };
                s.set_fg(Some(fg)).set_dimmed(true);
            }
            Style::Keyword => {
                s.set_fg(Some(Color::Cyan)).set_bold(true);
            }
            Style::Constant => {
                s.set_fg(Some(Color::Yellow));
            }
            Style::Ident => {
                s.set_fg(Some(Color::Green)).set_bold(true);
            }
            Style::Type => {
                s.set_fg(Some(Color::Magenta));
            }
        }
        s
    }
}

/// Assigns printed numbers to variables as they are bound.
#[derive(Default)]
struct Namer {
    names: HashMap<u64, usize>,
    next: usize,
}

impl Namer {
    fn bind(&mut self, variable: &Variable) -> usize {
        let n = self.next;
        self.next += 1;
        self.names.insert(variable.id(), n);
        n
    }

    fn name(&mut self, variable: &Variable) -> usize {
        match self.names.get(&variable.id()) {
            Some(n) => *n,
            // Free variable: numbered on first sight.
            None => self.bind(variable),
        }
    }
}

#[inline]
fn lparen(depth: u8) -> RcDoc<'static, Style> {
    RcDoc::as_string("(").annotate(Style::Paren(depth))
}

#[inline]
fn rparen(depth: u8) -> RcDoc<'static, Style> {
    RcDoc::as_string(")").annotate(Style::Paren(depth))
}

fn kw(s: &'static str) -> RcDoc<'static, Style> {
    RcDoc::as_string(s).annotate(Style::Keyword)
}

fn ident(n: usize) -> RcDoc<'static, Style> {
    RcDoc::as_string(format!("${n}")).annotate(Style::Ident)
}

fn constant(c: &Constant) -> RcDoc<'static, Style> {
    RcDoc::as_string(c.name().to_string())
        .annotate(Style::Constant)
        .append(RcDoc::as_string(":"))
        .append(RcDoc::as_string(c.type_name().to_string()).annotate(Style::Type))
}

fn binder(variable: &Variable, namer: &mut Namer) -> RcDoc<'static, Style> {
    ident(namer.bind(variable))
        .append(RcDoc::as_string(":"))
        .append(RcDoc::as_string(variable.ty().to_string()).annotate(Style::Type))
}

fn to_doc_with_depth(e: &Expr, namer: &mut Namer, depth: u8) -> RcDoc<'static, Style> {
    match e {
        Expr::Variable(variable) => ident(namer.name(variable)),
        Expr::Constant(c) => constant(c),
        Expr::Literal(literal) => {
            let mut doc = lparen(depth).append(to_doc_with_depth(
                literal.predicate(),
                namer,
                depth.wrapping_add(1),
            ));
            for argument in literal.arguments() {
                doc = doc
                    .append(RcDoc::space())
                    .append(to_doc_with_depth(argument, namer, depth.wrapping_add(1)));
            }
            doc.append(rparen(depth)).group()
        }
        Expr::Lambda(lambda) => lparen(depth)
            .append(kw("lambda"))
            .append(RcDoc::space())
            .append(binder(lambda.variable(), namer))
            .append(RcDoc::space())
            .append(to_doc_with_depth(lambda.body(), namer, depth.wrapping_add(1)))
            .append(rparen(depth))
            .group(),
        Expr::Quantifier(quantifier) => lparen(depth)
            .append(constant(quantifier.quantifier()))
            .append(RcDoc::space())
            .append(binder(quantifier.variable(), namer))
            .append(RcDoc::space())
            .append(to_doc_with_depth(
                quantifier.body(),
                namer,
                depth.wrapping_add(1),
            ))
            .append(rparen(depth))
            .group(),
    }
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, 'w, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'w, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }
    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<'w, W: WriteColor + Write> pretty::Render for ColorWriter<'w, W> {
    type Error = io::Error;
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }
    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

fn render_to<W: WriteColor + Write>(
    doc: &RcDoc<'_, Style>,
    width: usize,
    out: &mut W,
) -> io::Result<()> {
    let mut cw = ColorWriter { out };
    doc.render_raw(width, &mut cw)
}

fn terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Printing conveniences for [`Expr`].
pub trait PrettyExpr {
    /// Build an RcDoc representation with style annotations.
    fn pretty_doc(&self) -> RcDoc<'static, Style>;

    /// Render with colors to any termcolor writer.
    fn pretty_render_to<W: WriteColor + Write>(&self, out: &mut W) -> io::Result<()>;

    /// Print to stdout with colors (TTY-aware).
    fn pretty_print(&self) -> io::Result<()>;

    /// Format into a plain string (no colors).
    fn pretty_string(&self) -> String;
}

impl PrettyExpr for Expr {
    #[inline]
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        to_doc_with_depth(self, &mut Namer::default(), 0)
    }

    #[inline]
    fn pretty_render_to<W: WriteColor + Write>(&self, out: &mut W) -> io::Result<()> {
        render_to(&self.pretty_doc(), terminal_width(), out)
    }

    fn pretty_print(&self) -> io::Result<()> {
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        self.pretty_render_to(&mut stdout)
    }

    #[inline]
    fn pretty_string(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut w = FmtWrite::new(f);
        self.pretty_doc().render_raw(80, &mut w)
    }
}
