//  PARSER.rs
//    by Lut99
//
//  Created:
//    14 Oct 2026, 13:30:48
//  Last edited:
//    14 Oct 2026, 15:12:06
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements a parser for the bracketed expression syntax in which
//!   facts, rules and queries are written.
//!
//!   # Syntax
//!   ```plain
//!   ; Comments run until the end of the line
//!   (isa fido Dog)
//!   (implies (and (isa ?X Dog) (owns ?Y ?X)) (petOwner ?Y))
//!   (age fido 3)
//!   (name fido "Fido the \"dog\"")
//!   ```
//!
//!   Anything starting with `?` is a variable. Numbers are (signed)
//!   integers; everything else is a named constant.
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while, take_while1};
use nom::character::complete::{char as pchar, digit1, multispace1, satisfy};
use nom::combinator::{all_consuming, map, map_res, not, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;

use crate::horn::{Error as HornError, HornClause};
use crate::literal::{Error as LiteralError, Literal};
use crate::term::Term;


/***** ERRORS *****/
/// Defines the errors originating from parsing.
#[derive(Debug)]
pub enum Error {
    /// The input is not syntactically valid.
    Syntax { what: String, line: usize, col: usize, near: String },
    /// Expected exactly one term in the input.
    NotOneTerm { what: String, got: usize },
    /// The term parsed is not a literal.
    Literal { err: LiteralError },
    /// The term parsed is not a Horn clause.
    Horn { err: HornError },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Syntax { what, line, col, near } => write!(f, "{what}:{line}:{col}: Syntax error near '{near}'"),
            Self::NotOneTerm { what, got } => write!(f, "{what}: Expected exactly one term, got {got}"),
            Self::Literal { .. } => write!(f, "Parsed term is not a literal"),
            Self::Horn { .. } => write!(f, "Parsed term is not a Horn clause"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Syntax { .. } | Self::NotOneTerm { .. } => None,
            Self::Literal { err } => Some(err),
            Self::Horn { err } => Some(err),
        }
    }
}
impl Error {
    /// Builds an [`Error::Syntax`] pointing at where the given remainder starts in the source.
    fn syntax(what: &str, source: &str, remainder: &str) -> Self {
        let offset: usize = source.len().saturating_sub(remainder.len());
        let before: &str = &source[..offset];
        let line: usize = before.matches('\n').count() + 1;
        let col: usize = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) + 1;
        Self::Syntax { what: what.into(), line, col, near: remainder.chars().take(16).collect() }
    }
}





/***** HELPERS *****/
/// Characters that may appear in constants and variable names.
#[inline]
fn is_symbol_char(c: char) -> bool { c.is_alphanumeric() || "-_+*/<>=!.:#$%&^~@'".contains(c) }

/// Parses a comment, i.e., everything from a `;` to the end of the line.
fn comment(input: &str) -> IResult<&str, &str> { recognize(pair(pchar(';'), take_while(|c| c != '\n')))(input) }

/// Skips any whitespace and comments.
fn skip(input: &str) -> IResult<&str, ()> { map(many0(alt((multispace1, comment))), |_| ())(input) }

/// Parses a variable, e.g., `?X`.
fn variable(input: &str) -> IResult<&str, Term> { map(preceded(pchar('?'), take_while1(is_symbol_char)), Term::var)(input) }

/// Parses a (signed) integer, e.g., `-42`. Fails if the digits continue as a symbol.
fn integer(input: &str) -> IResult<&str, Term> {
    map_res(terminated(recognize(pair(opt(pchar('-')), digit1)), not(satisfy(is_symbol_char))), |s: &str| s.parse::<i64>().map(Term::Int))(input)
}

/// Parses a string literal, e.g., `"Fido the \"dog\""`.
fn string(input: &str) -> IResult<&str, Term> {
    let esc = escaped_transform(
        is_not("\\\""),
        '\\',
        alt((map(tag("\\"), |_| "\\"), map(tag("\""), |_| "\""), map(tag("n"), |_| "\n"), map(tag("t"), |_| "\t"))),
    );
    map(delimited(pchar('"'), opt(esc), pchar('"')), |s: Option<String>| Term::Str(s.unwrap_or_default()))(input)
}

/// Parses a named constant, e.g., `Dog`.
fn symbol(input: &str) -> IResult<&str, Term> { map(take_while1(is_symbol_char), Term::constant)(input) }

/// Parses a bracketed list of terms, e.g., `(isa ?X Dog)`.
fn compound(input: &str) -> IResult<&str, Term> { map(delimited(pchar('('), many0(term), preceded(skip, pchar(')'))), Term::Compound)(input) }

/// Parses any term, preceded by optional whitespace.
fn term(input: &str) -> IResult<&str, Term> { preceded(skip, alt((compound, variable, string, integer, symbol)))(input) }





/***** LIBRARY *****/
/// Parses all terms in the given source text.
///
/// # Arguments
/// - `what`: Some description of the source (e.g., a path) used in errors.
/// - `source`: The text to parse.
///
/// # Returns
/// The top-level terms in the source, in order.
///
/// # Errors
/// This function errors with [`Error::Syntax`] if the source is not entirely made up of terms.
pub fn parse(what: &str, source: &str) -> Result<Vec<Term>, Error> {
    match all_consuming(terminated(many0(term), skip))(source) {
        Ok((_, terms)) => Ok(terms),
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => Err(Error::syntax(what, source, err.input)),
        Err(nom::Err::Incomplete(_)) => Err(Error::syntax(what, source, "")),
    }
}

/// Parses a single term.
///
/// # Arguments
/// - `source`: The text to parse.
///
/// # Returns
/// The only term in the source.
///
/// # Errors
/// This function errors if the source is not a single term.
pub fn parse_term(source: &str) -> Result<Term, Error> {
    let mut terms: Vec<Term> = parse("<term>", source)?;
    if terms.len() != 1 {
        return Err(Error::NotOneTerm { what: "<term>".into(), got: terms.len() });
    }
    Ok(terms.swap_remove(0))
}

impl FromStr for Term {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_term(s) }
}
impl FromStr for Literal {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { Literal::from_expression(parse_term(s)?).map_err(|err| Error::Literal { err }) }
}
impl FromStr for HornClause {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { HornClause::from_canonical(&parse_term(s)?).map_err(|err| Error::Horn { err }) }
}





/***** TESTS *****/
