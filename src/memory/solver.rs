//  SOLVER.rs
//    by Lut99
//
//  Created:
//    14 Oct 2026, 10:04:33
//  Last edited:
//    15 Oct 2026, 10:52:13
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the [`MemorySolver`], a depth-first [`SubSearch`] over a
//!   [`MemoryKb`] that backchains on unary literals.
//

use std::collections::HashMap;
use std::sync::Arc;

use super::knowledge_base::MemoryKb;
use crate::backchain::{BackchainConfig, Backchainer, Error};
use crate::builtins::{AND, EQUALS, NUMERICALLY_EQUAL, OR, SUCCESSOR};
use crate::cache::RuleCache;
use crate::connector::{SearchParams, Solution, SubSearch};
use crate::literal::Literal;
use crate::log::{debug, trace, warn};
use crate::term::{Constant, Term, Variable};
use crate::unify::{SyntacticUnifier, unify_terms};


/***** HELPERS *****/
/// A (partial) assignment of variables.
type Assignment = HashMap<Variable, Term>;

/// Checks whether the given compound is a `(successor <n>)`-term.
#[inline]
fn is_successor(terms: &[Term]) -> bool { terms.len() == 2 && terms[0].as_const().is_some_and(|c| c.name() == SUCCESSOR) }

/// Reads the numeric value of an (already resolved) argument of `numericallyEqual`.
///
/// # Returns
/// [`None`] if the argument is not (yet) a number.
fn numeric_value(term: &Term) -> Option<i64> {
    match term {
        Term::Int(i) => Some(*i),
        Term::Compound(terms) if is_successor(terms) => {
            numeric_value(&terms[1]).and_then(|i| i.checked_add(1))
        },
        _ => None,
    }
}

/// Binds an unresolved argument of `numericallyEqual` such that its value becomes `value`.
///
/// # Returns
/// False if the argument can never have that value.
fn bind_numeric(term: &Term, value: i64, assign: &mut Assignment) -> bool {
    match term {
        Term::Var(v) => {
            assign.insert(v.clone(), Term::Int(value));
            true
        },
        Term::Compound(terms) if is_successor(terms) => match value.checked_sub(1) {
            Some(prev) => bind_numeric(&terms[1], prev, assign),
            None => false,
        },
        _ => numeric_value(term) == Some(value),
    }
}





/***** LIBRARY *****/
/// A [`SubSearch`] that solves formulas depth-first against a [`MemoryKb`].
///
/// Every conjunct of a formula is matched against the facts in the search's context. Unary
/// conjuncts are additionally [backchained](Backchainer::backchain()) on while the depth of the
/// search allows it. `and`, `or`, `equals` and `numericallyEqual` are decided directly.
#[derive(Debug)]
pub struct MemorySolver<'k> {
    /// The knowledge base to solve against.
    kb: &'k MemoryKb,
    /// The unifier used when backchaining.
    unifier: SyntacticUnifier,
    /// The rule cache shared by all backchainers spawned.
    cache: Arc<RuleCache>,
    /// The configuration of all backchainers spawned.
    config: BackchainConfig,
}

// Constructors
impl<'k> MemorySolver<'k> {
    /// Constructor for the MemorySolver.
    ///
    /// # Arguments
    /// - `kb`: The [`MemoryKb`] to solve against.
    /// - `cache`: A [`RuleCache`] to share between all backchainers spawned.
    /// - `config`: The [`BackchainConfig`] for all backchainers spawned.
    ///
    /// # Returns
    /// A new MemorySolver.
    #[inline]
    pub fn new(kb: &'k MemoryKb, cache: Arc<RuleCache>, config: BackchainConfig) -> Self { Self { kb, unifier: SyntacticUnifier, cache, config } }

    /// Returns the configuration of all backchainers spawned.
    #[inline]
    pub fn config(&self) -> &BackchainConfig { &self.config }
}

// Solving
impl<'k> MemorySolver<'k> {
    /// Solves a formula at the top of a new search.
    ///
    /// # Arguments
    /// - `scope`: The context in which to search.
    /// - `formula`: The formula to solve.
    ///
    /// # Returns
    /// All [`Solution`]s found.
    ///
    /// # Errors
    /// This function errors if backchaining fails.
    #[inline]
    pub fn query(&self, scope: impl Into<Constant>, formula: &Literal) -> Result<Vec<Solution>, Error> { self.solve(&self.config.params(scope), formula) }

    /// Returns a backchainer living at the depth of the given search.
    #[inline]
    fn backchainer(&self, params: &SearchParams) -> Backchainer<'_, MemoryKb, SyntacticUnifier, Self> {
        Backchainer::nested(self.kb, &self.unifier, self, self.cache.clone(), params.clone(), &self.config)
    }

    /// Extends an assignment in every way that makes the given formula true.
    ///
    /// # Arguments
    /// - `params`: The [`SearchParams`] of the current search.
    /// - `formula`: The formula (predicate + arguments) to make true.
    /// - `assign`: The assignment made so far.
    ///
    /// # Returns
    /// All extended assignments, in the order found.
    ///
    /// # Errors
    /// This function errors if backchaining fails.
    fn extend(&self, params: &SearchParams, formula: &[Term], assign: &Assignment) -> Result<Vec<Assignment>, Error> {
        let resolved: Term = Term::Compound(formula.to_vec()).apply(assign);
        let Some(args) = resolved.as_compound() else { return Ok(Vec::new()) };
        let pred: &str = args.first().and_then(Term::as_const).map(Constant::name).unwrap_or("");
        match pred {
            AND => {
                let mut partials: Vec<Assignment> = vec![assign.clone()];
                for conjunct in &args[1..] {
                    let Some(conjunct) = conjunct.as_compound() else { return Ok(Vec::new()) };
                    let mut next: Vec<Assignment> = Vec::new();
                    for partial in &partials {
                        next.extend(self.extend(params, conjunct, partial)?);
                    }
                    partials = next;
                    if partials.is_empty() {
                        break;
                    }
                }
                Ok(partials)
            },
            OR => {
                let mut partials: Vec<Assignment> = Vec::new();
                for disjunct in &args[1..] {
                    if let Some(disjunct) = disjunct.as_compound() {
                        partials.extend(self.extend(params, disjunct, assign)?);
                    }
                }
                Ok(partials)
            },
            EQUALS => {
                let mut assign: Assignment = assign.clone();
                if args.len() == 3 && unify_terms(&args[1], &args[2], &mut assign) { Ok(vec![assign]) } else { Ok(Vec::new()) }
            },
            NUMERICALLY_EQUAL => {
                let Some(value) = args[1..].iter().find_map(numeric_value) else {
                    warn!("Cannot decide '{resolved}' (no argument is a number)");
                    return Ok(Vec::new());
                };
                let mut assign: Assignment = assign.clone();
                if args[1..].iter().all(|arg| bind_numeric(arg, value, &mut assign)) { Ok(vec![assign]) } else { Ok(Vec::new()) }
            },
            _ => {
                let mut partials: Vec<Assignment> = Vec::new();
                for found in self.kb.matching(&params.scope, &resolved) {
                    let mut extended: Assignment = assign.clone();
                    extended.extend(found);
                    partials.push(extended);
                }

                // Try the rules too, if we're still allowed to
                let Ok(literal) = Literal::from_expression(resolved.clone()) else { return Ok(partials) };
                if literal.is_unary() && params.may_backchain() {
                    let var: &Variable = &literal.variables()[0];
                    for value in self.backchainer(params).backchain(&literal)? {
                        let mut extended: Assignment = assign.clone();
                        extended.insert(var.clone(), value);
                        partials.push(extended);
                    }
                }
                Ok(partials)
            },
        }
    }
}

// Connector
impl<'k> SubSearch for MemorySolver<'k> {
    type Error = Error;

    fn solve(&self, params: &SearchParams, formula: &Literal) -> Result<Vec<Solution>, Self::Error> {
        debug!("Solving '{formula}' at depth {}", params.depth);
        let assigns: Vec<Assignment> = self.extend(params, formula.formula(), &Assignment::new())?;

        let mut solutions: Vec<Solution> = Vec::with_capacity(assigns.len());
        for assign in assigns {
            if params.max_solutions.map(|max| solutions.len() >= max).unwrap_or(false) {
                break;
            }
            solutions.push(
                formula
                    .variables()
                    .iter()
                    .filter_map(|var| {
                        let value: Term = Term::Var(var.clone()).apply(&assign);
                        if value.is_ground() { Some((var.clone(), value)) } else { None }
                    })
                    .collect(),
            );
        }
        trace!("Found {} solution(s) for '{formula}' at depth {}", solutions.len(), params.depth);
        Ok(solutions)
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{make_lit, make_term};

    fn kb_with(exprs: &[&str]) -> MemoryKb {
        let mut kb = MemoryKb::new();
        for expr in exprs {
            kb.assert_expression("BaseKB", make_term(expr)).unwrap();
        }
        kb
    }

    fn values(solutions: &[Solution], var: &str) -> Vec<String> {
        let var = Variable::new(var);
        solutions.iter().flat_map(|sol| sol.iter().filter(|(v, _)| v == &var).map(|(_, value)| value.to_string())).collect()
    }

    #[test]
    fn test_solver_conjunction() {
        let kb = kb_with(&["(isa fido Dog)", "(isa tom Cat)", "(owns alice fido)", "(owns bob tom)"]);
        let solver = MemorySolver::new(&kb, Arc::default(), BackchainConfig::default());

        let formula = Literal::try_from(make_term("(and (isa ?X Dog) (owns ?Y ?X))")).unwrap();
        let solutions = solver.query("BaseKB", &formula).unwrap();
        assert_eq!(values(&solutions, "Y"), ["alice"]);
        assert_eq!(values(&solutions, "X"), ["fido"]);

        let formula = Literal::try_from(make_term("(or (isa ?X Dog) (isa ?X Cat))")).unwrap();
        assert_eq!(values(&solver.query("BaseKB", &formula).unwrap(), "X"), ["fido", "tom"]);
        assert!(solver.query("OtherKB", &formula).unwrap().is_empty());
    }

    #[test]
    fn test_solver_builtins() {
        let kb = MemoryKb::new();
        let solver = MemorySolver::new(&kb, Arc::default(), BackchainConfig::default());

        let solutions = solver.query("BaseKB", &make_lit("numericallyEqual", ["?X", "3"])).unwrap();
        assert_eq!(values(&solutions, "X"), ["3"]);
        let formula = Literal::try_from(make_term("(numericallyEqual (successor ?X) 3)")).unwrap();
        assert_eq!(values(&solver.query("BaseKB", &formula).unwrap(), "X"), ["2"]);
        assert!(solver.query("BaseKB", &make_lit("numericallyEqual", ["2", "3"])).unwrap().is_empty());
        assert!(solver.query("BaseKB", &make_lit("numericallyEqual", ["?X", "?Y"])).unwrap().is_empty());

        assert_eq!(values(&solver.query("BaseKB", &make_lit("equals", ["?X", "fido"])).unwrap(), "X"), ["fido"]);
        assert!(solver.query("BaseKB", &make_lit("equals", ["rex", "fido"])).unwrap().is_empty());
    }

    #[test]
    fn test_solver_numeric_only_through_successor() {
        let kb = MemoryKb::new();
        let solver = MemorySolver::new(&kb, Arc::default(), BackchainConfig::default());

        let formula = Literal::try_from(make_term("(numericallyEqual 4 (successor ?Y))")).unwrap();
        assert_eq!(values(&solver.query("BaseKB", &formula).unwrap(), "Y"), ["3"]);
        let formula = Literal::try_from(make_term("(numericallyEqual 4 (foo ?Y))")).unwrap();
        assert!(solver.query("BaseKB", &formula).unwrap().is_empty());
        let formula = Literal::try_from(make_term("(numericallyEqual 4 (foo 3))")).unwrap();
        assert!(solver.query("BaseKB", &formula).unwrap().is_empty());
    }

    #[test]
    fn test_solver_max_solutions() {
        let kb = kb_with(&["(q a)", "(q b)", "(q c)"]);
        let solver = MemorySolver::new(&kb, Arc::default(), BackchainConfig::default());
        let mut params = solver.config().params("BaseKB");
        params.max_solutions = Some(2);
        assert_eq!(values(&solver.solve(&params, &make_lit("q", ["?X"])).unwrap(), "X"), ["a", "b"]);
    }

    #[test]
    fn test_solver_backchains_with_bound_literal_vars() {
        let kb = kb_with(&["(knows bob)", "(implies (knows ?A) (likes ?A alice))"]);
        let solver = MemorySolver::new(&kb, Arc::default(), BackchainConfig::default());
        assert_eq!(values(&solver.query("BaseKB", &make_lit("likes", ["bob", "?X"])).unwrap(), "X"), ["alice"]);
        assert!(solver.query("BaseKB", &make_lit("likes", ["carol", "?X"])).unwrap().is_empty());
    }

    #[test]
    fn test_solver_depth_zero_only_facts() {
        let kb = kb_with(&["(q a)", "(implies (q ?X) (p ?X))"]);
        let solver = MemorySolver::new(&kb, Arc::default(), BackchainConfig::default().with_max_backchain_depth(0));
        assert!(solver.query("BaseKB", &make_lit("p", ["?X"])).unwrap().is_empty());
        assert_eq!(values(&solver.query("BaseKB", &make_lit("q", ["?X"])).unwrap(), "X"), ["a"]);
    }
}
