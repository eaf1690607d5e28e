//  BACKCHAIN.rs
//    by Lut99
//
//  Created:
//    13 Oct 2026, 14:51:06
//  Last edited:
//    15 Oct 2026, 10:31:47
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the backchainer itself.
//!
//!   Given a unary literal, e.g., `(isa ?X Dog)`, the [`Backchainer`]
//!   finds the values of `?X` by looking for rules that conclude the
//!   literal and solving their antecedents instead. Solving happens in a
//!   fresh [`SubSearch`] one level deeper than the current one, which may
//!   in turn backchain again until the maximum depth is reached.
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use itertools::Itertools as _;

use crate::bindings::{BindingSet, Error as BindingsError};
use crate::builtins::is_taxonomic;
use crate::cache::RuleCache;
use crate::connector::{KnowledgeBase, SearchParams, Solution, SubSearch, Unifier};
use crate::horn::{Error as HornError, HornClause};
use crate::literal::{Error as LiteralError, Literal};
use crate::log::{debug, trace};
use crate::term::{Constant, Term};


/***** ERRORS *****/
/// Defines the errors originating from the [`Backchainer`].
#[derive(Debug)]
pub enum Error {
    /// Only literals with exactly one variable can be backchained on.
    NotUnary { literal: Literal },
    /// The knowledge base, unifier or sub-search failed.
    Connector { what: &'static str, err: Box<dyn 'static + Send + Sync + error::Error> },
    /// Failed to rewrite a Horn clause.
    Horn { err: HornError },
    /// Failed to split a formula into literals.
    Literal { err: LiteralError },
    /// Failed to store the values found in a binding set.
    Bindings { err: BindingsError },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::NotUnary { literal } => {
                write!(f, "Cannot backchain on literal '{literal}' with {} variable(s) (need exactly 1)", literal.arity())
            },
            Self::Connector { what, .. } => write!(f, "Failed to {what}"),
            Self::Horn { .. } => write!(f, "Failed to rewrite Horn clause"),
            Self::Literal { .. } => write!(f, "Failed to split formula into literals"),
            Self::Bindings { .. } => write!(f, "Failed to populate binding set"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::NotUnary { .. } => None,
            Self::Connector { err, .. } => Some(&**err),
            Self::Horn { err } => Some(err),
            Self::Literal { err } => Some(err),
            Self::Bindings { err } => Some(err),
        }
    }
}





/***** HELPERS *****/
/// Returns a closure that wraps the error of some connector in an [`Error::Connector`].
#[inline]
fn connector<E: 'static + Send + Sync + error::Error>(what: &'static str) -> impl FnOnce(E) -> Error {
    move |err| Error::Connector { what, err: Box::new(err) }
}





/***** AUXILLARY *****/
/// Configures a [`Backchainer`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BackchainConfig {
    /// The maximum depth at which rules may still be expanded. `0` disables backchaining.
    pub max_backchain_depth: usize,
    /// Whether to backchain on taxonomic predicates (`isa` and `genls`) as well.
    pub backchain_taxonomic: bool,
    /// Whether to remember which rules conclude which predicate in the shared [`RuleCache`].
    pub use_rule_cache: bool,
    /// Verbosity passed on to every search.
    pub verbosity: u8,
}
impl Default for BackchainConfig {
    #[inline]
    fn default() -> Self { Self { max_backchain_depth: 3, backchain_taxonomic: false, use_rule_cache: false, verbosity: 0 } }
}
impl BackchainConfig {
    /// Sets the maximum backchain depth.
    #[inline]
    pub const fn with_max_backchain_depth(mut self, depth: usize) -> Self {
        self.max_backchain_depth = depth;
        self
    }

    /// Sets whether taxonomic predicates are backchained on.
    #[inline]
    pub const fn with_backchain_taxonomic(mut self, enabled: bool) -> Self {
        self.backchain_taxonomic = enabled;
        self
    }

    /// Sets whether the rule cache is used.
    #[inline]
    pub const fn with_rule_cache(mut self, enabled: bool) -> Self {
        self.use_rule_cache = enabled;
        self
    }

    /// Sets the verbosity.
    #[inline]
    pub const fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Builds the [`SearchParams`] of a top-level search in the given scope.
    #[inline]
    pub fn params(&self, scope: impl Into<Constant>) -> SearchParams {
        let mut params: SearchParams = SearchParams::new(scope, self.max_backchain_depth);
        params.verbosity = self.verbosity;
        params
    }
}



/// A rule that might conclude the literal being backchained on, together with what remains to be
/// proven for it to do so.
///
/// Two obligations are equal if they have the same [formula](ProofObligation::formula()), since
/// solving either yields the same values.
#[derive(Clone, Debug)]
pub struct ProofObligation {
    /// The rule, with its variables renamed apart from the literal.
    pub rule: HornClause,
    /// The antecedents of the rule, specialized to the literal and conjuncted.
    pub antecedent: Literal,
}
impl ProofObligation {
    /// Returns the formula that a sub-search has to solve to discharge this obligation.
    #[inline]
    pub fn formula(&self) -> &Literal { &self.antecedent }
}
impl Eq for ProofObligation {}
impl Hash for ProofObligation {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) { self.antecedent.hash(state) }
}
impl PartialEq for ProofObligation {
    #[inline]
    fn eq(&self, other: &Self) -> bool { self.antecedent == other.antecedent }
}





/***** LIBRARY *****/
/// Finds the values of the variable of a unary literal by proving rules that conclude it.
///
/// A backchainer lives at some depth of a search. It never backchains itself if that depth has
/// reached the configured maximum; otherwise, every sub-search it spawns lives one level deeper.
#[derive(Debug)]
pub struct Backchainer<'e, K, U, S> {
    /// The knowledge base to fetch rules and predicate properties from.
    kb: &'e K,
    /// The unifier matching literals against the consequents of rules.
    unifier: &'e U,
    /// Solves the antecedents of rules.
    solver: &'e S,
    /// Remembers the rules concluding predicates across backchainers.
    cache: Arc<RuleCache>,
    /// Describes the search that this backchainer lives in.
    params: SearchParams,
    /// Whether to backchain on `isa` and `genls`.
    backchain_taxonomic: bool,
    /// Whether to consult the `cache`.
    use_rule_cache: bool,
}

// Constructors
impl<'e, K, U, S> Backchainer<'e, K, U, S> {
    /// Constructor for a Backchainer at the top of a search.
    ///
    /// # Arguments
    /// - `kb`: The [`KnowledgeBase`] to fetch rules from.
    /// - `unifier`: The [`Unifier`] to match literals to rules with.
    /// - `solver`: The [`SubSearch`] that proves the antecedents of rules.
    /// - `cache`: A [`RuleCache`], possibly shared with other backchainers.
    /// - `scope`: The context (microtheory) in which to search.
    /// - `config`: The [`BackchainConfig`] to run with.
    ///
    /// # Returns
    /// A new Backchainer at depth `0`.
    #[inline]
    pub fn new(kb: &'e K, unifier: &'e U, solver: &'e S, cache: Arc<RuleCache>, scope: impl Into<Constant>, config: &BackchainConfig) -> Self {
        Self::nested(kb, unifier, solver, cache, config.params(scope), config)
    }

    /// Constructor for a Backchainer living inside an existing search.
    ///
    /// # Arguments
    /// - `kb`: The [`KnowledgeBase`] to fetch rules from.
    /// - `unifier`: The [`Unifier`] to match literals to rules with.
    /// - `solver`: The [`SubSearch`] that proves the antecedents of rules.
    /// - `cache`: A [`RuleCache`], possibly shared with other backchainers.
    /// - `params`: The [`SearchParams`] of the search. Its depth and maximum depth take precedence
    ///   over those in the `config`.
    /// - `config`: The [`BackchainConfig`] to take the remaining settings from.
    ///
    /// # Returns
    /// A new Backchainer at the depth of `params`.
    #[inline]
    pub fn nested(kb: &'e K, unifier: &'e U, solver: &'e S, cache: Arc<RuleCache>, params: SearchParams, config: &BackchainConfig) -> Self {
        Self { kb, unifier, solver, cache, params, backchain_taxonomic: config.backchain_taxonomic, use_rule_cache: config.use_rule_cache }
    }
}

// Settings
impl<'e, K, U, S> Backchainer<'e, K, U, S> {
    /// Returns the parameters of the search this backchainer lives in.
    #[inline]
    pub fn params(&self) -> &SearchParams { &self.params }

    /// Returns the depth of the search this backchainer lives in.
    #[inline]
    pub const fn depth(&self) -> usize { self.params.depth }

    /// Returns the maximum depth at which rules are still expanded.
    #[inline]
    pub const fn max_backchain_depth(&self) -> usize { self.params.max_backchain_depth }

    /// Changes the maximum depth at which rules are still expanded.
    ///
    /// Only affects this backchainer and the sub-searches it spawns from now on.
    #[inline]
    pub fn set_max_backchain_depth(&mut self, depth: usize) {
        debug!("Setting maximum backchain depth from {} to {}", self.params.max_backchain_depth, depth);
        self.params.max_backchain_depth = depth;
    }

    /// Returns the (shared) rule cache.
    #[inline]
    pub fn cache(&self) -> &Arc<RuleCache> { &self.cache }

    /// Forgets all cached rules and sets a new capacity for the shared cache.
    #[inline]
    pub fn reset_rule_cache(&self, capacity: usize) { self.cache.reset(capacity) }

    /// Returns the number of predicates in the shared cache.
    #[inline]
    pub fn rule_cache_size(&self) -> usize { self.cache.size() }
}

// Backchaining
impl<'e, K: KnowledgeBase, U: Unifier, S: SubSearch> Backchainer<'e, K, U, S> {
    /// Finds values for the variable of a unary literal by proving rules that conclude it.
    ///
    /// Every rule that may conclude the literal is turned into a [`ProofObligation`], which is
    /// solved by a sub-search one level deeper. The values found for the variable are returned in
    /// the order of the obligations, then in the order the sub-search found them. Duplicates are
    /// kept.
    ///
    /// # Arguments
    /// - `literal`: The [`Literal`] to backchain on. Must have exactly one variable.
    ///
    /// # Returns
    /// The values of the literal's variable for which it was proven. Empty if the maximum depth
    /// has been reached.
    ///
    /// # Errors
    /// This function errors with [`Error::NotUnary`] if the literal does not have exactly one
    /// variable, or with another [`Error`] if the knowledge base, unifier or sub-search fails.
    pub fn backchain(&self, literal: &Literal) -> Result<Vec<Term>, Error> {
        let Some(var) = literal.variables().first().filter(|_| literal.is_unary()) else {
            return Err(Error::NotUnary { literal: literal.clone() });
        };
        if !self.params.may_backchain() {
            debug!("Not backchaining on '{literal}' at depth {} (maximum is {})", self.params.depth, self.params.max_backchain_depth);
            return Ok(Vec::new());
        }
        debug!("Backchaining on '{literal}' at depth {}", self.params.depth);

        let mut values: Vec<Term> = Vec::new();
        for obligation in self.get_backchain_rules(literal)? {
            trace!("Solving '{}' for rule '{}'", obligation.formula(), obligation.rule);
            let solutions: Vec<Solution> = self.solver.solve(&self.params.child(), obligation.formula()).map_err(connector("solve proof obligation"))?;
            values.extend(solutions.into_iter().flat_map(|sol| sol.into_iter().filter_map(|(v, value)| if &v == var { Some(value) } else { None })));
        }
        debug!("Backchaining on '{literal}' found {} value(s)", values.len());
        Ok(values)
    }

    /// Backchains on the literal of a binding set, and stores the values found in it.
    ///
    /// # Arguments
    /// - `set`: The [`BindingSet`] to populate. Its literal must be unary.
    ///
    /// # Errors
    /// This function errors if [backchaining](Backchainer::backchain()) fails or if the set was
    /// populated already.
    pub fn populate(&self, set: &mut BindingSet) -> Result<(), Error> {
        let values: Vec<Term> = self.backchain(set.literal())?;
        set.populate_unary(values).map_err(|err| Error::Bindings { err })
    }

    /// Builds the proof obligations for all rules that may conclude the given literal.
    ///
    /// Every rule is renamed apart from the literal and then unified with it. Rules that cannot be
    /// renamed cleanly or that do not unify are skipped.
    ///
    /// # Arguments
    /// - `literal`: The [`Literal`] to find rules for.
    ///
    /// # Returns
    /// A [`ProofObligation`] per rule that may conclude the literal. Empty if the maximum depth has
    /// been reached.
    ///
    /// # Errors
    /// This function errors if the knowledge base or the unifier fails.
    pub fn get_backchain_rules(&self, literal: &Literal) -> Result<Vec<ProofObligation>, Error> {
        if !self.params.may_backchain() {
            return Ok(Vec::new());
        }

        let mut obligations: Vec<ProofObligation> = Vec::new();
        for mut rule in self.gather_rules_concluding(literal)? {
            if !rule.rename_apart(literal.variables()).map_err(|err| Error::Horn { err })? {
                trace!("Skipping rule '{rule}' (ill-formed after renaming)");
                continue;
            }
            let Some(antecedents) = self.unifier.semantically_unify(literal, &rule).map_err(connector("unify literal with rule"))? else {
                trace!("Skipping rule '{rule}' (does not unify with '{literal}')");
                continue;
            };
            let Some(antecedent) = Literal::conjunction(antecedents) else {
                trace!("Skipping rule '{rule}' (unified to no antecedents)");
                continue;
            };
            obligations.push(ProofObligation { rule, antecedent });
        }
        Ok(obligations)
    }

    /// Builds the proof obligations for all rules that may conclude any of the given literals.
    ///
    /// # Arguments
    /// - `literals`: The [`Literal`]s to find rules for.
    ///
    /// # Returns
    /// The union of [`Backchainer::get_backchain_rules()`] over all literals, without duplicates,
    /// in order of first occurrence.
    ///
    /// # Errors
    /// This function errors if the knowledge base or the unifier fails.
    pub fn get_backchain_rules_all(&self, literals: &[Literal]) -> Result<Vec<ProofObligation>, Error> {
        let mut obligations: Vec<ProofObligation> = Vec::new();
        for literal in literals {
            obligations.extend(self.get_backchain_rules(literal)?);
        }
        Ok(obligations.into_iter().unique().collect())
    }

    /// Collects the Horn clauses whose consequent might match the given literal.
    ///
    /// No rules are collected for literals that:
    /// - have a non-constant predicate;
    /// - have a taxonomic predicate, unless enabled in the [`BackchainConfig`];
    /// - have a predicate on which backchaining is forbidden or discouraged in this scope; or
    /// - are evaluatable.
    ///
    /// Otherwise, both backward and forward rules are fetched from the knowledge base. Fetched
    /// expressions that are not legal Horn clauses are dropped.
    ///
    /// # Arguments
    /// - `literal`: The [`Literal`] to find rules for.
    ///
    /// # Returns
    /// The Horn clauses found. They still share variables with `literal`.
    ///
    /// # Errors
    /// This function errors if the knowledge base fails.
    pub fn gather_rules_concluding(&self, literal: &Literal) -> Result<Vec<HornClause>, Error> {
        if !self.params.may_backchain() {
            return Ok(Vec::new());
        }
        let Some(pred) = literal.predicate().as_const() else {
            trace!("Not gathering rules for '{literal}' (predicate is not a constant)");
            return Ok(Vec::new());
        };
        let scope: &Constant = &self.params.scope;
        if !self.backchain_taxonomic && is_taxonomic(pred.name()) {
            trace!("Not gathering rules for '{literal}' (taxonomic predicate)");
            return Ok(Vec::new());
        }
        if self.kb.is_backchain_forbidden(pred, scope).map_err(connector("check whether backchaining is forbidden"))? {
            debug!("Not gathering rules for '{literal}' (backchaining on '{pred}' forbidden in '{scope}')");
            return Ok(Vec::new());
        }
        if self.kb.is_backchain_discouraged(pred, scope).map_err(connector("check whether backchaining is discouraged"))? {
            debug!("Not gathering rules for '{literal}' (backchaining on '{pred}' discouraged in '{scope}')");
            return Ok(Vec::new());
        }
        if literal.is_evaluatable() || self.kb.is_evaluatable_predicate(pred).map_err(connector("check whether predicate is evaluatable"))? {
            trace!("Not gathering rules for '{literal}' (evaluatable)");
            return Ok(Vec::new());
        }

        if self.use_rule_cache {
            if let Some(rules) = self.cache.get(scope, pred) {
                return Ok(rules);
            }
        }

        let mut exprs: Vec<Term> = self.kb.get_backchain_rules(literal, scope).map_err(connector("fetch backward rules"))?;
        exprs.extend(self.kb.get_forward_chain_rules(literal, scope).map_err(connector("fetch forward rules"))?);
        let rules: Vec<HornClause> = exprs
            .iter()
            .filter_map(|expr| match HornClause::from_canonical(expr) {
                Ok(rule) => Some(rule),
                Err(_) => {
                    trace!("Dropping rule '{expr}' (not a Horn clause)");
                    None
                },
            })
            .collect();
        trace!("Gathered {} rule(s) concluding '{literal}' ({} dropped)", rules.len(), exprs.len() - rules.len());

        if self.use_rule_cache {
            self.cache.put(scope.clone(), pred.clone(), rules.clone());
        }
        Ok(rules)
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::error::Error as _;

    use super::*;
    use crate::memory::{Error as MemoryError, MemoryKb, MemorySolver};
    use crate::term::Variable;
    use crate::tests::{CountingKb, Failure, FailingKb, FailingSolver, FailingUnifier, make_clause, make_lit, make_term};
    use crate::unify::SyntacticUnifier;


    /// A [`SubSearch`] that answers every formula with the same solutions.
    struct ScriptedSolver {
        solutions: Vec<Solution>,
        seen: RefCell<Vec<(SearchParams, Literal)>>,
    }
    impl ScriptedSolver {
        fn new(values: impl IntoIterator<Item = &'static str>) -> Self {
            Self {
                solutions: values.into_iter().map(|v| vec![(Variable::new("X"), Term::constant(v))]).collect(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }
    impl SubSearch for ScriptedSolver {
        type Error = Infallible;

        fn solve(&self, params: &SearchParams, formula: &Literal) -> Result<Vec<Solution>, Self::Error> {
            self.seen.borrow_mut().push((params.clone(), formula.clone()));
            Ok(self.solutions.clone())
        }
    }

    /// A [`Unifier`] that accepts every rule as-is.
    struct TrivialUnifier;
    impl Unifier for TrivialUnifier {
        type Error = Infallible;

        fn semantically_unify(&self, _literal: &Literal, _clause: &HornClause) -> Result<Option<Vec<Literal>>, Self::Error> {
            Ok(Some(vec![make_lit("q", ["?X"])]))
        }
    }

    fn kb_with(exprs: &[&str]) -> MemoryKb {
        let mut kb = MemoryKb::new();
        for expr in exprs {
            kb.assert_expression("BaseKB", make_term(expr)).unwrap();
        }
        kb
    }


    #[test]
    fn test_backchain_collects_values() {
        #[cfg(feature = "log")]
        crate::tests::setup_logger();

        let kb = kb_with(&["(implies (q ?X) (p ?X))"]);
        let solver = ScriptedSolver::new(["a", "b"]);
        let bc = Backchainer::new(&kb, &TrivialUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());

        let values = bc.backchain(&make_lit("p", ["?X"])).unwrap();
        assert_eq!(values, vec![Term::constant("a"), Term::constant("b")]);

        let seen = solver.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.depth, 1);
        assert_eq!(seen[0].1, make_lit("q", ["?X"]));
    }

    #[test]
    fn test_backchain_keeps_duplicates() {
        let kb = kb_with(&["(implies (q ?X) (p ?X))", "(implies (r ?X) (p ?X))"]);
        let solver = ScriptedSolver::new(["a"]);
        let bc = Backchainer::new(&kb, &TrivialUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());
        assert_eq!(bc.backchain(&make_lit("p", ["?X"])).unwrap(), vec![Term::constant("a"), Term::constant("a")]);
    }

    #[test]
    fn test_backchain_not_unary() {
        let kb = MemoryKb::new();
        let solver = ScriptedSolver::new([]);
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());
        assert!(matches!(bc.backchain(&make_lit("likes", ["?X", "?Y"])), Err(Error::NotUnary { .. })));
        assert!(matches!(bc.backchain(&make_lit("likes", ["a", "b"])), Err(Error::NotUnary { .. })));
    }

    #[test]
    fn test_backchain_depth_zero() {
        let kb = CountingKb::new(kb_with(&["(implies (q ?X) (p ?X))"]));
        let solver = ScriptedSolver::new(["a"]);
        let mut bc =
            Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default().with_max_backchain_depth(0));
        assert_eq!(bc.backchain(&make_lit("p", ["?X"])).unwrap(), vec![]);
        assert!(bc.get_backchain_rules(&make_lit("p", ["?X"])).unwrap().is_empty());
        assert_eq!(kb.calls(), 0);
        assert!(solver.seen.borrow().is_empty());

        bc.set_max_backchain_depth(1);
        assert_eq!(bc.max_backchain_depth(), 1);
        assert_eq!(bc.backchain(&make_lit("p", ["?X"])).unwrap(), vec![Term::constant("a")]);
    }

    #[test]
    fn test_backchain_drops_malformed_rules() {
        let mut kb = MemoryKb::new();
        kb.add_backward_rule("BaseKB", make_term("(implies (q ?X) (p ?X))"));
        kb.add_backward_rule("BaseKB", make_term("(implies (q ?X) (p ?X) (r ?X))"));
        kb.add_backward_rule("BaseKB", make_term("(implies () (p ?X))"));
        let solver = ScriptedSolver::new([]);
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());

        let obligations = bc.get_backchain_rules(&make_lit("p", ["?X"])).unwrap();
        assert_eq!(obligations.len(), 1);
        assert_eq!(obligations[0].formula().predicate(), &Term::constant("q"));
    }

    #[test]
    fn test_backchain_forbidden_and_discouraged() {
        let mut kb = kb_with(&["(implies (q ?X) (p ?X))", "(implies (q ?X) (s ?X))"]);
        kb.forbid_backchain("BaseKB", "p");
        kb.discourage_backchain("BaseKB", "s");
        let kb = CountingKb::new(kb);
        let solver = ScriptedSolver::new(["a"]);
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());

        assert!(bc.gather_rules_concluding(&make_lit("p", ["?X"])).unwrap().is_empty());
        assert!(bc.gather_rules_concluding(&make_lit("s", ["?X"])).unwrap().is_empty());
        assert_eq!(kb.calls_to("get_backchain_rules"), 0);
        assert_eq!(kb.calls_to("get_forward_chain_rules"), 0);
        assert!(bc.backchain(&make_lit("p", ["?X"])).unwrap().is_empty());

        // Only in the scope where it was forbidden
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "OtherKB", &BackchainConfig::default());
        assert!(bc.gather_rules_concluding(&make_lit("p", ["?X"])).unwrap().is_empty());
        assert_eq!(kb.calls_to("get_backchain_rules"), 1);
    }

    #[test]
    fn test_backchain_taxonomic() {
        let kb = kb_with(&["(implies (dog ?X) (isa ?X Dog))"]);
        let solver = ScriptedSolver::new(["fido"]);
        let lit = make_lit("isa", ["?X", "Dog"]);

        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());
        assert!(bc.gather_rules_concluding(&lit).unwrap().is_empty());

        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default().with_backchain_taxonomic(true));
        assert_eq!(bc.gather_rules_concluding(&lit).unwrap(), vec![make_clause("(implies (dog ?X) (isa ?X Dog))")]);
        assert_eq!(bc.backchain(&lit).unwrap(), vec![Term::constant("fido")]);
    }

    #[test]
    fn test_backchain_evaluatable() {
        let kb = kb_with(&["(implies (q ?X) (numericallyEqual ?X 3))"]);
        let solver = ScriptedSolver::new([]);
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());
        assert!(bc.gather_rules_concluding(&make_lit("numericallyEqual", ["?X", "3"])).unwrap().is_empty());
    }

    #[test]
    fn test_backchain_rule_cache() {
        let kb = CountingKb::new(kb_with(&["(implies (q ?X) (p ?X))"]));
        let solver = ScriptedSolver::new([]);
        let lit = make_lit("p", ["?X"]);

        // Off by default
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());
        bc.gather_rules_concluding(&lit).unwrap();
        bc.gather_rules_concluding(&lit).unwrap();
        assert_eq!(kb.calls_to("get_backchain_rules"), 2);
        assert_eq!(bc.rule_cache_size(), 0);

        let cache: Arc<RuleCache> = Arc::new(RuleCache::new(8));
        let config = BackchainConfig::default().with_rule_cache(true);
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache.clone(), "BaseKB", &config);
        let rules = bc.gather_rules_concluding(&lit).unwrap();
        assert_eq!(bc.gather_rules_concluding(&lit).unwrap(), rules);
        assert_eq!(kb.calls_to("get_backchain_rules"), 3);
        assert_eq!(cache.size(), 1);

        // Shared with other backchainers
        let other = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache.clone(), "BaseKB", &config);
        assert_eq!(other.gather_rules_concluding(&lit).unwrap(), rules);
        assert_eq!(kb.calls_to("get_backchain_rules"), 3);

        other.reset_rule_cache(4);
        assert_eq!(bc.rule_cache_size(), 0);
        assert_eq!(cache.cap(), 4);
    }

    #[test]
    fn test_backchain_rule_cache_per_scope() {
        let mut kb = MemoryKb::new();
        kb.assert_expression("A", make_term("(implies (q ?X) (p ?X))")).unwrap();
        kb.assert_expression("A", make_term("(q a)")).unwrap();
        kb.assert_expression("B", make_term("(q a)")).unwrap();
        let config = BackchainConfig::default().with_rule_cache(true);
        let cache: Arc<RuleCache> = Arc::default();
        let solver = MemorySolver::new(&kb, cache.clone(), config.clone());
        let lit = make_lit("p", ["?X"]);

        let a = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache.clone(), "A", &config);
        assert_eq!(a.backchain(&lit).unwrap(), vec![Term::constant("a")]);
        let b = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache.clone(), "B", &config);
        assert_eq!(b.backchain(&lit).unwrap(), vec![]);
        assert!(cache.get(&Constant::new("B"), &Constant::new("p")).is_some_and(|rules| rules.is_empty()));
        assert_eq!(cache.get(&Constant::new("A"), &Constant::new("p")).map(|rules| rules.len()), Some(1));
    }

    #[test]
    fn test_backchain_cyclic_unification_is_dropped() {
        let kb = kb_with(&["(q a)", "(implies (q ?A) (p ?A (f ?A)))"]);
        let config = BackchainConfig::default();
        let cache: Arc<RuleCache> = Arc::default();
        let solver = MemorySolver::new(&kb, cache.clone(), config.clone());
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache, "BaseKB", &config);

        let lit = make_lit("p", ["?X", "?X"]);
        assert!(bc.get_backchain_rules(&lit).unwrap().is_empty());
        assert_eq!(bc.backchain(&lit).unwrap(), vec![]);
    }

    #[test]
    fn test_backchain_propagates_kb_errors() {
        for op in ["is_backchain_forbidden", "is_backchain_discouraged", "is_evaluatable_predicate", "get_backchain_rules", "get_forward_chain_rules"] {
            let kb = FailingKb::new(kb_with(&["(implies (q ?X) (p ?X))"]), op);
            let solver = ScriptedSolver::new(["a"]);
            let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());

            let err = match bc.backchain(&make_lit("p", ["?X"])) {
                Ok(values) => panic!("Expected '{op}' to fail backchaining, got {values:?}"),
                Err(err) => err,
            };
            assert!(matches!(err, Error::Connector { .. }), "{op}");
            let source = err.source().and_then(|err| err.downcast_ref::<Failure<MemoryError>>());
            assert!(matches!(source, Some(Failure::Injected { what }) if *what == op), "{op}");
            assert!(solver.seen.borrow().is_empty(), "{op}");
        }
    }

    #[test]
    fn test_backchain_propagates_unifier_errors() {
        let kb = kb_with(&["(implies (q ?X) (p ?X))"]);
        let solver = ScriptedSolver::new(["a"]);
        let bc = Backchainer::new(&kb, &FailingUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());

        let err = bc.backchain(&make_lit("p", ["?X"])).unwrap_err();
        assert!(matches!(err, Error::Connector { what: "unify literal with rule", .. }));
        let source = err.source().and_then(|err| err.downcast_ref::<Failure<Infallible>>());
        assert!(matches!(source, Some(Failure::Injected { what: "semantically_unify" })));
        assert!(solver.seen.borrow().is_empty());
    }

    #[test]
    fn test_backchain_propagates_solver_errors() {
        let kb = kb_with(&["(implies (q ?X) (p ?X))", "(implies (r ?X) (p ?X))"]);
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &FailingSolver, Arc::default(), "BaseKB", &BackchainConfig::default());

        let err = bc.backchain(&make_lit("p", ["?X"])).unwrap_err();
        assert!(matches!(err, Error::Connector { what: "solve proof obligation", .. }));
        let source = err.source().and_then(|err| err.downcast_ref::<Failure<Infallible>>());
        assert!(matches!(source, Some(Failure::Injected { what: "solve" })));

        // Nothing ends up in a binding set either
        let mut set = BindingSet::new(make_lit("p", ["?X"]), "BaseKB");
        assert!(matches!(bc.populate(&mut set), Err(Error::Connector { .. })));
        assert!(!set.is_populated());
    }

    #[test]
    fn test_backchain_rules_all_unique() {
        let kb = kb_with(&["(implies (q ?X) (p ?X))", "(implies (r ?X) (s ?X))"]);
        let solver = ScriptedSolver::new([]);
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());

        let lit = make_lit("p", ["?X"]);
        let obligations = bc.get_backchain_rules_all(&[lit.clone(), lit.clone(), make_lit("s", ["?X"])]).unwrap();
        assert_eq!(obligations.iter().map(|o| o.formula().clone()).collect::<Vec<_>>(), vec![make_lit("q", ["?X"]), make_lit("r", ["?X"])]);
    }

    #[test]
    fn test_backchain_populate() {
        let kb = kb_with(&["(implies (q ?X) (p ?X))"]);
        let solver = ScriptedSolver::new(["a", "b"]);
        let bc = Backchainer::new(&kb, &TrivialUnifier, &solver, Arc::default(), "BaseKB", &BackchainConfig::default());

        let mut set = BindingSet::new(make_lit("p", ["?X"]), "BaseKB");
        bc.populate(&mut set).unwrap();
        assert_eq!(set.size(), 2);
        assert!(matches!(bc.populate(&mut set), Err(Error::Bindings { .. })));
    }

    #[test]
    fn test_backchain_with_memory_solver() {
        let kb = kb_with(&["(q a)", "(q b)", "(r c)", "(implies (q ?X) (p ?X))", "(implies (r ?X) (q ?X))"]);
        let cache: Arc<RuleCache> = Arc::default();

        let config = BackchainConfig::default().with_max_backchain_depth(1);
        let solver = MemorySolver::new(&kb, cache.clone(), config.clone());
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache.clone(), "BaseKB", &config);
        assert_eq!(bc.backchain(&make_lit("p", ["?X"])).unwrap(), vec![Term::constant("a"), Term::constant("b")]);

        let config = BackchainConfig::default().with_max_backchain_depth(2);
        let solver = MemorySolver::new(&kb, cache.clone(), config.clone());
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache, "BaseKB", &config);
        assert_eq!(bc.backchain(&make_lit("p", ["?X"])).unwrap(), vec![Term::constant("a"), Term::constant("b"), Term::constant("c")]);
    }

    #[test]
    fn test_backchain_cyclic_rule_terminates() {
        let kb = kb_with(&["(p a)", "(implies (p ?X) (p ?X))"]);
        let config = BackchainConfig::default();
        let cache: Arc<RuleCache> = Arc::default();
        let solver = MemorySolver::new(&kb, cache.clone(), config.clone());
        let bc = Backchainer::new(&kb, &SyntacticUnifier, &solver, cache, "BaseKB", &config);

        let values = bc.backchain(&make_lit("p", ["?X"])).unwrap();
        assert!(!values.is_empty());
        assert!(values.iter().all(|v| v == &Term::constant("a")));
    }
}
