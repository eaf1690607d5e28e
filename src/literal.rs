//  LITERAL.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 11:36:02
//  Last edited:
//    13 Oct 2026, 13:58:16
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines [`Literal`]s, i.e., predicates applied to arguments.
//!
//!   Note that, in this crate, the _arity_ of a literal is the number of
//!   distinct variables in it, not the number of arguments of its
//!   predicate. It measures how unbound a literal is.
//

use std::collections::HashMap;
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::hash::{Hash, Hasher};

use enum_debug::EnumDebug;
use indexmap::IndexSet;

use crate::builtins::{AND, NUMERICALLY_EQUAL, OR, SUCCESSOR, is_connective};
use crate::connector::KnowledgeBase;
use crate::term::{Term, Variable};


/***** ERRORS *****/
/// Defines the errors originating from [`Literal`]s.
#[derive(Debug)]
pub enum Error {
    /// The given expression cannot be read as a literal.
    MalformedLiteral { expr: Term },
    /// Attempted to substitute a variable that doesn't occur in the literal.
    NotAVariableOfLiteral { var: Variable, literal: Literal },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::MalformedLiteral { expr } => {
                write!(f, "Expression '{expr}' ({:?}) is not a literal (expected a predicate followed by at least one argument)", expr.variant())
            },
            Self::NotAVariableOfLiteral { var, literal } => write!(f, "Variable '{var}' does not occur in literal '{literal}'"),
        }
    }
}
impl error::Error for Error {}





/***** HELPERS *****/
/// The verdict accumulated while comparing two literals argument-by-argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Verdict {
    /// No argument has pointed in either direction yet.
    Undetermined,
    /// `this` is at least as general as `other` in every argument seen so far.
    Subsumes,
    /// `other` is at least as general as `this` in every argument seen so far.
    SubsumedBy,
}
impl Verdict {
    /// Combines the verdict so far with that of the next argument pair.
    ///
    /// # Returns
    /// The new verdict, or [`None`] if the two point in opposite directions.
    #[inline]
    const fn transition(self, next: Self) -> Option<Self> {
        match (self, next) {
            (verdict, Self::Undetermined) | (Self::Undetermined, verdict) => Some(verdict),
            (Self::Subsumes, Self::Subsumes) => Some(Self::Subsumes),
            (Self::SubsumedBy, Self::SubsumedBy) => Some(Self::SubsumedBy),
            (Self::Subsumes, Self::SubsumedBy) | (Self::SubsumedBy, Self::Subsumes) => None,
        }
    }
}

/// Compares a single pair of arguments.
///
/// # Returns
/// The verdict for this pair, or [`None`] if the pair rules out subsumption altogether.
///
/// # Errors
/// This function errors if the knowledge base failed to answer a query about collections.
fn compare_args<K: ?Sized + KnowledgeBase>(this: &Term, other: &Term, kb: &K) -> Result<Option<Verdict>, K::Error> {
    if this == other {
        return Ok(Some(Verdict::Undetermined));
    }
    match (this.is_var(), other.is_var()) {
        (true, true) => Ok(None),
        (true, false) => Ok(Some(Verdict::Subsumes)),
        (false, true) => Ok(Some(Verdict::SubsumedBy)),
        (false, false) => {
            if !kb.is_collection(this)? || !kb.is_collection(other)? {
                return Ok(None);
            }
            // A literal over the more specific collection subsumes the one over its generalization
            if kb.is_more_general(this, other)? {
                Ok(Some(Verdict::SubsumedBy))
            } else if kb.is_more_general(other, this)? {
                Ok(Some(Verdict::Subsumes))
            } else {
                Ok(None)
            }
        },
    }
}

/// Checks whether the given term may appear as an argument of a numeric equality that is decided
/// without the knowledge base.
#[inline]
fn is_numeric_arg(term: &Term) -> bool {
    match term {
        Term::Int(_) | Term::Var(_) => true,
        Term::Compound(terms) => {
            terms.len() == 2 && terms[0].as_const().map(|c| c.name() == SUCCESSOR).unwrap_or(false) && matches!(terms[1], Term::Int(_) | Term::Var(_))
        },
        Term::Const(_) | Term::Str(_) => false,
    }
}

/// Checks whether the formula of a literal can be decided without the knowledge base.
fn is_evaluatable_formula(formula: &[Term]) -> bool {
    let Some(pred) = formula.first().and_then(Term::as_const) else {
        return false;
    };
    match pred.name() {
        AND | OR => formula[1..].iter().all(|arg| match arg {
            Term::Compound(sub) => is_evaluatable_formula(sub),
            _ => false,
        }),
        NUMERICALLY_EQUAL => formula[1..].iter().all(is_numeric_arg),
        _ => false,
    }
}

/// Checks that every compound term nested in the given one has at least one element.
fn has_no_empty_compounds(term: &Term) -> bool {
    match term {
        Term::Compound(terms) => !terms.is_empty() && terms.iter().all(has_no_empty_compounds),
        Term::Var(_) | Term::Const(_) | Term::Int(_) | Term::Str(_) => true,
    }
}

/// Checks whether a formula (predicate + arguments) is syntactically legal.
fn is_valid_formula(formula: &[Term]) -> bool {
    if formula.len() < 2 {
        return false;
    }
    let Some(pred) = formula[0].as_const() else {
        return false;
    };
    if is_connective(pred.name()) {
        formula[1..].iter().all(Literal::is_valid_expression)
    } else {
        formula[1..].iter().all(has_no_empty_compounds)
    }
}





/***** AUXILLARY *****/
/// The three-way outcome of [`Literal::determine_subsumption()`].
#[derive(Clone, Copy, Debug, EnumDebug, Eq, Hash, PartialEq)]
pub enum Subsumption {
    /// The literal is at least as general as the other one.
    Subsumes,
    /// The other literal is more general than this one.
    SubsumedBy,
    /// Neither is more general than the other.
    NoSubsumption,
}





/***** LIBRARY *****/
/// A predicate applied to arguments, e.g., `(isa ?X Dog)`.
///
/// Equality and hashing only consider the formula, not any cached information.
#[derive(Clone, Debug)]
pub struct Literal {
    /// The predicate, followed by the arguments.
    formula: Vec<Term>,
    /// The distinct variables occurring in `formula`, in order of first occurrence.
    variables: IndexSet<Variable>,
    /// The number of facts matching this literal in some context, if it has been counted.
    instance_count: Option<usize>,
}

// Constructors
impl Literal {
    /// Creates a new Literal from a structural expression.
    ///
    /// # Arguments
    /// - `expr`: A compound [`Term`] with a predicate and at least one argument.
    ///
    /// # Returns
    /// A new Literal with its variables scanned from the whole expression tree.
    ///
    /// # Errors
    /// This function errors with [`Error::MalformedLiteral`] if `expr` is not compound or has fewer
    /// than two elements.
    pub fn from_expression(expr: Term) -> Result<Self, Error> {
        match expr {
            Term::Compound(formula) if formula.len() >= 2 => Ok(Self::from_formula_unchecked(formula)),
            expr => Err(Error::MalformedLiteral { expr }),
        }
    }

    /// Creates a new Literal from a predicate and its arguments.
    ///
    /// # Arguments
    /// - `formula`: The predicate followed by at least one argument.
    ///
    /// # Returns
    /// A new Literal.
    ///
    /// # Errors
    /// This function errors with [`Error::MalformedLiteral`] if `formula` has fewer than two
    /// elements.
    #[inline]
    pub fn from_formula(formula: Vec<Term>) -> Result<Self, Error> { Self::from_expression(Term::Compound(formula)) }

    /// Builds a literal without checking its length.
    #[inline]
    fn from_formula_unchecked(formula: Vec<Term>) -> Self {
        let mut variables: IndexSet<Variable> = IndexSet::new();
        for term in &formula {
            term.collect_vars(&mut variables);
        }
        Self { formula, variables, instance_count: None }
    }

    /// Synthesizes the conjunction of the given literals.
    ///
    /// # Arguments
    /// - `literals`: The literals to conjunct.
    ///
    /// # Returns
    /// `(and lit1 lit2 ...)`, the literal itself if only one is given, or [`None`] if none are.
    pub fn conjunction(literals: impl IntoIterator<Item = Literal>) -> Option<Self> {
        let mut literals = literals.into_iter();
        let first: Literal = literals.next()?;
        let Some(second) = literals.next() else {
            return Some(first);
        };
        let mut formula: Vec<Term> = vec![Term::constant(AND), first.into_term(), second.into_term()];
        formula.extend(literals.map(Literal::into_term));
        Some(Self::from_formula_unchecked(formula))
    }
}

// Validation
impl Literal {
    /// Checks whether the given expression is a syntactically legal literal.
    ///
    /// That means that it is compound, has at least two elements, starts with a named constant and
    /// does not nest any empty compounds. Arguments of `and` and `or` must be legal literals
    /// themselves.
    ///
    /// # Arguments
    /// - `expr`: The [`Term`] to check.
    ///
    /// # Returns
    /// True if it is legal, false otherwise.
    #[inline]
    pub fn is_valid_expression(expr: &Term) -> bool {
        match expr {
            Term::Compound(formula) => is_valid_formula(formula),
            _ => false,
        }
    }

    /// Checks whether this literal is (still) syntactically legal.
    ///
    /// See [`Literal::is_valid_expression()`] for what that means.
    #[inline]
    pub fn is_well_formed(&self) -> bool { is_valid_formula(&self.formula) }
}

// Inspection
impl Literal {
    /// Returns the predicate of this literal.
    #[inline]
    pub fn predicate(&self) -> &Term { &self.formula[0] }

    /// Returns the arguments of this literal.
    #[inline]
    pub fn arguments(&self) -> &[Term] { &self.formula[1..] }

    /// Returns the predicate followed by the arguments.
    #[inline]
    pub fn formula(&self) -> &[Term] { &self.formula }

    /// Returns the distinct variables of this literal, in order of first occurrence.
    #[inline]
    pub fn variables(&self) -> &IndexSet<Variable> { &self.variables }

    /// Returns the number of distinct variables in this literal.
    #[inline]
    pub fn arity(&self) -> usize { self.variables.len() }

    /// Returns whether this literal has no variables at all.
    #[inline]
    pub fn is_ground(&self) -> bool { self.variables.is_empty() }

    /// Returns whether this literal has exactly one variable.
    #[inline]
    pub fn is_unary(&self) -> bool { self.variables.len() == 1 }

    /// Returns whether this literal can be decided without consulting a knowledge base.
    ///
    /// This is the case for numeric equalities over integers, variables and simple successor
    /// expressions (e.g., `(numericallyEqual ?X (successor 3))`), and for conjunctions and
    /// disjunctions of those.
    #[inline]
    pub fn is_evaluatable(&self) -> bool { is_evaluatable_formula(&self.formula) }

    /// Returns the number of matching facts, if it was counted before.
    #[inline]
    pub const fn instance_count(&self) -> Option<usize> { self.instance_count }

    /// Caches the number of matching facts.
    #[inline]
    pub(crate) fn set_instance_count(&mut self, count: usize) { self.instance_count = Some(count); }

    /// Splits this literal into the literals it is a conjunction of.
    ///
    /// # Returns
    /// The arguments of this literal if it is an `and`-literal, or else just this literal.
    ///
    /// # Errors
    /// This function errors if any argument of an `and`-literal is not a literal itself.
    pub fn conjuncts(&self) -> Result<Vec<Literal>, Error> {
        if self.predicate().as_const().map(|c| c.name() == AND).unwrap_or(false) {
            self.arguments().iter().cloned().map(Literal::from_expression).collect()
        } else {
            Ok(vec![self.clone()])
        }
    }
}

// Rewriting
impl Literal {
    /// Replaces a variable with a value.
    ///
    /// The literal itself is left untouched.
    ///
    /// # Arguments
    /// - `var`: The [`Variable`] to replace.
    /// - `value`: The [`Term`] to replace every occurrence of `var` with.
    ///
    /// # Returns
    /// A new Literal in which `var` is replaced by `value`. If `value` is a variable, it takes
    /// over the place of `var` among the variables; otherwise, `var` is simply gone.
    ///
    /// # Errors
    /// This function errors with [`Error::NotAVariableOfLiteral`] if `var` does not occur in this
    /// literal.
    pub fn substitute(&self, var: &Variable, value: &Term) -> Result<Literal, Error> {
        if !self.variables.contains(var) {
            return Err(Error::NotAVariableOfLiteral { var: var.clone(), literal: self.clone() });
        }
        let mut formula: Vec<Term> = self.formula.clone();
        for term in &mut formula {
            term.substitute_mut(var, value);
        }
        Ok(Self::from_formula_unchecked(formula))
    }

    /// Returns a copy of this literal with the given assignment applied.
    ///
    /// # Arguments
    /// - `assign`: A map of [`Variable`]s to the [`Term`]s they are bound to.
    ///
    /// # Returns
    /// A new Literal with all bound variables resolved.
    pub fn apply(&self, assign: &HashMap<Variable, Term>) -> Literal {
        Self::from_formula_unchecked(self.formula.iter().map(|t| t.apply(assign)).collect())
    }
}

// Subsumption
impl Literal {
    /// Decides which of two literals is more general.
    ///
    /// The literals are compared argument-by-argument:
    /// - Identical arguments don't say anything;
    /// - A variable is more general than anything that isn't;
    /// - Two different variables are incomparable;
    /// - Two constants are only comparable if both are collections, in which case the literal
    ///   over the more specific collection subsumes the literal over the more general one.
    ///
    /// If all pairs agree on a direction (or say nothing, as with equal literals), that's the
    /// answer. Otherwise, there is no subsumption.
    ///
    /// # Arguments
    /// - `other`: The other [`Literal`] to compare with.
    /// - `kb`: A [`KnowledgeBase`] that knows about collections.
    ///
    /// # Returns
    /// A [`Subsumption`] telling how `self` relates to `other`. This is always
    /// [`Subsumption::NoSubsumption`] if their predicates, arities or argument counts differ.
    ///
    /// # Errors
    /// This function errors if the knowledge base failed to answer.
    pub fn determine_subsumption<K: ?Sized + KnowledgeBase>(&self, other: &Literal, kb: &K) -> Result<Subsumption, K::Error> {
        if self.predicate() != other.predicate() || self.arity() != other.arity() || self.formula.len() != other.formula.len() {
            return Ok(Subsumption::NoSubsumption);
        }

        let mut verdict: Verdict = Verdict::Undetermined;
        for (this, that) in self.arguments().iter().zip(other.arguments()) {
            let Some(next) = compare_args(this, that, kb)? else {
                return Ok(Subsumption::NoSubsumption);
            };
            let Some(combined) = verdict.transition(next) else {
                return Ok(Subsumption::NoSubsumption);
            };
            verdict = combined;
        }
        Ok(match verdict {
            Verdict::Undetermined | Verdict::Subsumes => Subsumption::Subsumes,
            Verdict::SubsumedBy => Subsumption::SubsumedBy,
        })
    }

    /// Checks whether this literal is at least as general as the other one.
    ///
    /// # Errors
    /// This function errors if the knowledge base failed to answer.
    #[inline]
    pub fn subsumes<K: ?Sized + KnowledgeBase>(&self, other: &Literal, kb: &K) -> Result<bool, K::Error> {
        Ok(self.determine_subsumption(other, kb)? == Subsumption::Subsumes)
    }

    /// Checks whether the other literal is at least as general as this one.
    ///
    /// # Errors
    /// This function errors if the knowledge base failed to answer.
    #[inline]
    pub fn is_subsumed_by<K: ?Sized + KnowledgeBase>(&self, other: &Literal, kb: &K) -> Result<bool, K::Error> { other.subsumes(self, kb) }
}

// Conversion
impl Literal {
    /// Returns this literal as a compound [`Term`].
    #[inline]
    pub fn to_term(&self) -> Term { Term::Compound(self.formula.clone()) }

    /// Turns this literal into a compound [`Term`].
    #[inline]
    pub fn into_term(self) -> Term { Term::Compound(self.formula) }
}

// Standard traits
impl Eq for Literal {}
impl Hash for Literal {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) { self.formula.hash(state) }
}
impl PartialEq for Literal {
    #[inline]
    fn eq(&self, other: &Self) -> bool { self.formula == other.formula }
}
impl Display for Literal {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "(")?;
        for (i, term) in self.formula.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            term.fmt(f)?;
        }
        write!(f, ")")
    }
}
impl TryFrom<Term> for Literal {
    type Error = Error;

    #[inline]
    fn try_from(value: Term) -> Result<Self, Self::Error> { Self::from_expression(value) }
}





/***** TESTS *****/
