//  CONNECTOR.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 11:03:50
//  Last edited:
//    13 Oct 2026, 10:12:33
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the interfaces of everything the backchainer talks to but
//!   does not implement itself: the knowledge base storing facts and
//!   rules, the unifier matching literals against rules, and the solver
//!   that proves the antecedents of a rule.
//!
//!   [`crate::memory`] provides in-memory implementations of the knowledge
//!   base and the solver; [`crate::unify`] provides a syntactic unifier.
//

use std::error;

use crate::horn::HornClause;
use crate::literal::Literal;
use crate::term::{Constant, Term, Variable};


/***** AUXILLARY *****/
/// A single answer produced by a [`SubSearch`]: the value of every variable it bound.
pub type Solution = Vec<(Variable, Term)>;

/// Parameters with which a [`SubSearch`] is constructed.
///
/// The backchainer never shares solver state between branches; instead, it describes every
/// recursive search with one of these and leaves spawning it to the [`SubSearch`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchParams {
    /// The knowledge-base context (the microtheory) in which to search.
    pub scope: Constant,
    /// The maximum number of solutions to produce, or [`None`] for all of them.
    pub max_solutions: Option<usize>,
    /// Verbosity of the search, passed through untouched.
    pub verbosity: u8,
    /// The maximum depth at which rules may still be expanded.
    pub max_backchain_depth: usize,
    /// The depth of this search. Top-level searches live at `0`.
    pub depth: usize,
}
impl SearchParams {
    /// Constructor for top-level SearchParams.
    ///
    /// # Arguments
    /// - `scope`: The context in which to search.
    /// - `max_backchain_depth`: The maximum depth at which rules may still be expanded. `0`
    ///   disables backchaining altogether.
    ///
    /// # Returns
    /// A new SearchParams at depth `0`, asking for all solutions.
    #[inline]
    pub fn new(scope: impl Into<Constant>, max_backchain_depth: usize) -> Self {
        Self { scope: scope.into(), max_solutions: None, verbosity: 0, max_backchain_depth, depth: 0 }
    }

    /// Derives the parameters of a search spawned from this one.
    ///
    /// The child lives in the same scope with the same verbosity and maximum depth, asks for all
    /// solutions, and sits one level deeper.
    ///
    /// # Returns
    /// A new SearchParams for the child search.
    #[inline]
    pub fn child(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            max_solutions: None,
            verbosity: self.verbosity,
            max_backchain_depth: self.max_backchain_depth,
            depth: self.depth + 1,
        }
    }

    /// Returns whether rules may still be expanded at this depth.
    #[inline]
    pub const fn may_backchain(&self) -> bool { self.depth < self.max_backchain_depth }
}





/***** LIBRARY *****/
/// The knowledge base that stores facts and rules and knows about predicates and collections.
///
/// Any of its operations may fail (e.g., because the knowledge base lives on the other side of a
/// network connection). Such errors are always propagated by the engine.
pub trait KnowledgeBase {
    /// The error returned by all operations.
    type Error: 'static + Send + Sync + error::Error;


    /// Checks whether backchaining on the given predicate is forbidden in the given scope.
    fn is_backchain_forbidden(&self, predicate: &Constant, scope: &Constant) -> Result<bool, Self::Error>;

    /// Checks whether backchaining on the given predicate is discouraged in the given scope.
    fn is_backchain_discouraged(&self, predicate: &Constant, scope: &Constant) -> Result<bool, Self::Error>;

    /// Checks whether the truth of literals with the given predicate can be decided without any
    /// knowledge base lookups.
    fn is_evaluatable_predicate(&self, predicate: &Constant) -> Result<bool, Self::Error>;

    /// Fetches the raw expressions of backward rules concluding something that matches `literal`.
    ///
    /// # Returns
    /// A list of expressions that _should_ be `(implies ...)`-expressions, but this is not
    /// guaranteed.
    fn get_backchain_rules(&self, literal: &Literal, scope: &Constant) -> Result<Vec<Term>, Self::Error>;

    /// Fetches the raw expressions of forward rules concluding something that matches `literal`.
    ///
    /// # Returns
    /// A list of expressions that _should_ be `(implies ...)`-expressions, but this is not
    /// guaranteed.
    fn get_forward_chain_rules(&self, literal: &Literal, scope: &Constant) -> Result<Vec<Term>, Self::Error>;

    /// Counts the facts in the given scope matching the given (partially bound) formula.
    fn count_using_best_index(&self, formula: &Term, scope: &Constant) -> Result<usize, Self::Error>;

    /// Checks whether the given term is a collection.
    fn is_collection(&self, term: &Term) -> Result<bool, Self::Error>;

    /// Checks whether collection `general` is a (strict or non-strict) generalization of
    /// collection `specific`.
    fn is_more_general(&self, general: &Term, specific: &Term) -> Result<bool, Self::Error>;

    /// Resolves a name to the constant it refers to.
    fn resolve_named_constant(&self, name: &str) -> Result<Term, Self::Error>;
}

// Pointer-like impls
impl<T: ?Sized + KnowledgeBase> KnowledgeBase for &T {
    type Error = T::Error;

    #[inline]
    fn is_backchain_forbidden(&self, predicate: &Constant, scope: &Constant) -> Result<bool, Self::Error> {
        (**self).is_backchain_forbidden(predicate, scope)
    }

    #[inline]
    fn is_backchain_discouraged(&self, predicate: &Constant, scope: &Constant) -> Result<bool, Self::Error> {
        (**self).is_backchain_discouraged(predicate, scope)
    }

    #[inline]
    fn is_evaluatable_predicate(&self, predicate: &Constant) -> Result<bool, Self::Error> { (**self).is_evaluatable_predicate(predicate) }

    #[inline]
    fn get_backchain_rules(&self, literal: &Literal, scope: &Constant) -> Result<Vec<Term>, Self::Error> {
        (**self).get_backchain_rules(literal, scope)
    }

    #[inline]
    fn get_forward_chain_rules(&self, literal: &Literal, scope: &Constant) -> Result<Vec<Term>, Self::Error> {
        (**self).get_forward_chain_rules(literal, scope)
    }

    #[inline]
    fn count_using_best_index(&self, formula: &Term, scope: &Constant) -> Result<usize, Self::Error> {
        (**self).count_using_best_index(formula, scope)
    }

    #[inline]
    fn is_collection(&self, term: &Term) -> Result<bool, Self::Error> { (**self).is_collection(term) }

    #[inline]
    fn is_more_general(&self, general: &Term, specific: &Term) -> Result<bool, Self::Error> { (**self).is_more_general(general, specific) }

    #[inline]
    fn resolve_named_constant(&self, name: &str) -> Result<Term, Self::Error> { (**self).resolve_named_constant(name) }
}



/// Matches a literal against the consequent of a Horn clause.
pub trait Unifier {
    /// The error returned when unification could not be attempted (not when it fails!).
    type Error: 'static + Send + Sync + error::Error;


    /// Unifies a literal with the consequent of a Horn clause.
    ///
    /// # Arguments
    /// - `literal`: The [`Literal`] that we're trying to prove.
    /// - `clause`: The [`HornClause`] that might conclude it. Its variables are already renamed
    ///   apart from those of `literal`.
    ///
    /// # Returns
    /// The antecedents of the `clause`, specialized by the match, or [`None`] if the clause does
    /// not conclude the `literal`.
    fn semantically_unify(&self, literal: &Literal, clause: &HornClause) -> Result<Option<Vec<Literal>>, Self::Error>;
}



/// Runs a full (recursive) search for the solutions of a formula.
///
/// This is where the surrounding constraint solver plugs in. Every call represents a fresh,
/// independently owned search, configured by the given [`SearchParams`].
pub trait SubSearch {
    /// The error returned when the search fails.
    type Error: 'static + Send + Sync + error::Error;


    /// Finds solutions to the given formula.
    ///
    /// # Arguments
    /// - `params`: The [`SearchParams`] of the new search.
    /// - `formula`: The formula (a literal or an `and`-conjunction of them) to solve.
    ///
    /// # Returns
    /// A list of [`Solution`]s, in the order they were found.
    fn solve(&self, params: &SearchParams, formula: &Literal) -> Result<Vec<Solution>, Self::Error>;
}
