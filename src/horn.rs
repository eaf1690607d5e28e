//  HORN.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 13:12:47
//  Last edited:
//    13 Oct 2026, 14:31:09
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines [`HornClause`]s, i.e., implications with a conjunctive
//!   antecedent and a single-literal consequent.
//!
//!   In canonical form, a Horn clause is written as:
//!   ```plain
//!   (implies (and (isa ?X Dog) (owns ?Y ?X)) (petOwner ?Y))
//!   (implies (isa ?X Dog) (mammal ?X))
//!   ```
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;

use crate::builtins::{AND, IMPLIES};
use crate::literal::{self, Literal};
use crate::term::{Term, Variable};


/***** ERRORS *****/
/// Defines the errors originating from [`HornClause`]s.
#[derive(Debug)]
pub enum Error {
    /// The given expression is not a legal `(implies ...)`-expression.
    InvalidHornExpression { expr: Term },
    /// Attempted to build a clause without any antecedents.
    NoAntecedents { consequent: Literal },
    /// Attempted to substitute a variable that doesn't occur in the clause.
    NotAVariableOfClause { var: Variable, clause: HornClause },
    /// Failed to substitute a variable in one of the clause's literals.
    Literal { err: literal::Error },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::InvalidHornExpression { expr } => write!(f, "Expression '{expr}' is not a valid Horn clause"),
            Self::NoAntecedents { consequent } => write!(f, "Cannot build a Horn clause concluding '{consequent}' without any antecedents"),
            Self::NotAVariableOfClause { var, clause } => write!(f, "Variable '{var}' does not occur in Horn clause '{clause}'"),
            Self::Literal { .. } => write!(f, "Failed to substitute in literal"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InvalidHornExpression { .. } | Self::NoAntecedents { .. } | Self::NotAVariableOfClause { .. } => None,
            Self::Literal { err } => Some(err),
        }
    }
}





/***** HELPERS *****/
/// Reads the antecedent part of an `(implies ...)`-expression.
///
/// # Returns
/// The conjuncts if `expr` is an `and`-expression, or else just `expr`.
#[inline]
fn antecedent_exprs(expr: &Term) -> &[Term] {
    match expr {
        Term::Compound(terms) if expr.is_headed_by(AND) => &terms[1..],
        expr => std::slice::from_ref(expr),
    }
}

/// Collects the distinct variables of the given literals.
#[inline]
fn collect_vars<'l>(literals: impl IntoIterator<Item = &'l Literal>) -> IndexSet<Variable> {
    let mut vars: IndexSet<Variable> = IndexSet::new();
    for lit in literals {
        vars.extend(lit.variables().iter().cloned());
    }
    vars
}





/***** LIBRARY *****/
/// An implication of a single literal by a conjunction of literals.
///
/// Equality and hashing consider the antecedents (in order) and the consequent.
#[derive(Clone, Debug)]
pub struct HornClause {
    /// The literals that must all hold.
    antecedents: Vec<Literal>,
    /// The literal that holds if they do.
    consequent: Literal,
    /// The distinct variables of all the literals above.
    variables: IndexSet<Variable>,
}

// Constructors
impl HornClause {
    /// Constructor for the HornClause.
    ///
    /// # Arguments
    /// - `antecedents`: The [`Literal`]s that must all hold.
    /// - `consequent`: The [`Literal`] concluded when they do.
    ///
    /// # Returns
    /// A new HornClause.
    ///
    /// # Errors
    /// This function errors if `antecedents` is empty.
    pub fn new(antecedents: impl IntoIterator<Item = Literal>, consequent: Literal) -> Result<Self, Error> {
        let antecedents: Vec<Literal> = antecedents.into_iter().collect();
        if antecedents.is_empty() {
            return Err(Error::NoAntecedents { consequent });
        }
        let variables: IndexSet<Variable> = collect_vars(antecedents.iter().chain(Some(&consequent)));
        Ok(Self { antecedents, consequent, variables })
    }

    /// Reads a HornClause from its canonical `(implies <antecedent> <consequent>)`-form.
    ///
    /// The antecedent is either a single literal or an `(and ...)`-conjunction of them.
    ///
    /// # Arguments
    /// - `expr`: The [`Term`] to read.
    ///
    /// # Returns
    /// A new HornClause.
    ///
    /// # Errors
    /// This function errors with [`Error::InvalidHornExpression`] if the expression does not pass
    /// [`HornClause::is_valid_horn_expression()`].
    pub fn from_canonical(expr: &Term) -> Result<Self, Error> {
        if !Self::is_valid_horn_expression(expr) {
            return Err(Error::InvalidHornExpression { expr: expr.clone() });
        }
        let Term::Compound(terms) = expr else { unreachable!() };

        // Validation guarantees these all succeed
        let antecedents: Vec<Literal> =
            antecedent_exprs(&terms[1]).iter().cloned().map(Literal::from_expression).collect::<Result<_, _>>().map_err(|err| Error::Literal { err })?;
        let consequent: Literal = Literal::from_expression(terms[2].clone()).map_err(|err| Error::Literal { err })?;
        Self::new(antecedents, consequent)
    }

    /// Checks whether the given expression is a legal `(implies ...)`-expression.
    ///
    /// That is:
    /// - it is compound with exactly three elements;
    /// - its first element is the `implies`-constant;
    /// - its second element is a legal literal or an `and` of one or more legal literals; and
    /// - its third element is a legal literal.
    ///
    /// See [`Literal::is_valid_expression()`] for when a literal is legal.
    ///
    /// # Arguments
    /// - `expr`: The [`Term`] to check.
    ///
    /// # Returns
    /// True if the expression can be read as a Horn clause, or false otherwise.
    pub fn is_valid_horn_expression(expr: &Term) -> bool {
        let Term::Compound(terms) = expr else {
            return false;
        };
        if terms.len() != 3 || !expr.is_headed_by(IMPLIES) {
            return false;
        }
        let antecedents: &[Term] = antecedent_exprs(&terms[1]);
        !antecedents.is_empty() && antecedents.iter().all(Literal::is_valid_expression) && Literal::is_valid_expression(&terms[2])
    }
}

// Inspection
impl HornClause {
    /// Returns the antecedents of this clause.
    #[inline]
    pub fn antecedents(&self) -> &[Literal] { &self.antecedents }

    /// Returns the consequent of this clause.
    #[inline]
    pub fn consequent(&self) -> &Literal { &self.consequent }

    /// Returns the distinct variables occurring anywhere in this clause.
    #[inline]
    pub fn variables(&self) -> &IndexSet<Variable> { &self.variables }

    /// Returns the conjunction of all antecedents as a single literal.
    #[inline]
    pub fn antecedent_literal(&self) -> Literal {
        match Literal::conjunction(self.antecedents.iter().cloned()) {
            Some(lit) => lit,
            None => unreachable!("HornClause has no antecedents"),
        }
    }
}

// Rewriting
impl HornClause {
    /// Replaces a variable everywhere in this clause.
    ///
    /// Every literal that has been rewritten is checked to still be well-formed. Note that this is
    /// not transactional: if some antecedent turns out ill-formed, the substitution has already
    /// been applied to the others. Clone the clause first if that matters.
    ///
    /// # Arguments
    /// - `var`: The [`Variable`] to replace.
    /// - `value`: The [`Term`] to replace it with.
    ///
    /// # Returns
    /// True if all rewritten literals are well-formed, or false otherwise.
    ///
    /// # Errors
    /// This function errors with [`Error::NotAVariableOfClause`] if `var` does not occur in this
    /// clause.
    pub fn substitute_variable(&mut self, var: &Variable, value: &Term) -> Result<bool, Error> {
        if !self.variables.contains(var) {
            return Err(Error::NotAVariableOfClause { var: var.clone(), clause: self.clone() });
        }

        let mut well_formed: bool = true;
        if self.consequent.variables().contains(var) {
            self.consequent = self.consequent.substitute(var, value).map_err(|err| Error::Literal { err })?;
            well_formed &= self.consequent.is_well_formed();
        }
        for ante in &mut self.antecedents {
            if !ante.variables().contains(var) {
                continue;
            }
            *ante = ante.substitute(var, value).map_err(|err| Error::Literal { err })?;
            if !ante.is_well_formed() {
                well_formed = false;
                break;
            }
        }

        self.variables = collect_vars(self.antecedents.iter().chain(Some(&self.consequent)));
        Ok(well_formed)
    }

    /// Renames every variable that this clause shares with the given ones to a fresh variable.
    ///
    /// Afterwards, none of `others` occurs in this clause.
    ///
    /// # Arguments
    /// - `others`: The variables to rename apart from.
    ///
    /// # Returns
    /// True if all substitutions left the clause well-formed, or false otherwise.
    ///
    /// # Errors
    /// This function errors if a substitution failed.
    pub fn rename_apart<'v>(&mut self, others: impl IntoIterator<Item = &'v Variable>) -> Result<bool, Error> {
        let shared: Vec<Variable> = others.into_iter().filter(|v| self.variables.contains(*v)).cloned().collect();
        for var in shared {
            let fresh: Term = Term::Var(var.fresh());
            if !self.substitute_variable(&var, &fresh)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

// Conversion
impl HornClause {
    /// Writes this clause in its canonical `(implies ...)`-form.
    ///
    /// A single antecedent is written as-is unless it is an `and`-literal itself, in which case it
    /// is wrapped in another `and` to be read back as a single antecedent.
    pub fn to_canonical(&self) -> Term {
        let antecedent: Term = if self.antecedents.len() == 1 && !self.antecedents[0].to_term().is_headed_by(AND) {
            self.antecedents[0].to_term()
        } else {
            Term::compound(Some(Term::constant(AND)).into_iter().chain(self.antecedents.iter().map(Literal::to_term)))
        };
        Term::compound([Term::constant(IMPLIES), antecedent, self.consequent.to_term()])
    }
}

// Standard traits
impl Eq for HornClause {}
impl Hash for HornClause {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.antecedents.hash(state);
        self.consequent.hash(state);
    }
}
impl PartialEq for HornClause {
    #[inline]
    fn eq(&self, other: &Self) -> bool { self.consequent == other.consequent && self.antecedents == other.antecedents }
}
impl Display for HornClause {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { self.to_canonical().fmt(f) }
}
impl TryFrom<&Term> for HornClause {
    type Error = Error;

    #[inline]
    fn try_from(value: &Term) -> Result<Self, Self::Error> { Self::from_canonical(value) }
}





/***** TESTS *****/
