//  KNOWLEDGE BASE.rs
//    by Lut99
//
//  Created:
//    13 Oct 2026, 17:41:51
//  Last edited:
//    14 Oct 2026, 09:58:27
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the [`MemoryKb`], a [`KnowledgeBase`] that keeps all its
//!   facts and rules in memory.
//

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use indexmap::IndexSet;

use crate::builtins::{AND, EQUALS, GENLS, IMPLIES, ISA, NUMERICALLY_EQUAL, OR};
use crate::connector::KnowledgeBase;
use crate::literal::Literal;
use crate::log::{debug, trace};
use crate::term::{Constant, Term, Variable};
use crate::unify::unify_terms;


/***** CONSTANTS *****/
/// Predicate marking backchaining on a predicate as forbidden, i.e., `(backchainForbidden p)`.
pub const BACKCHAIN_FORBIDDEN: &str = "backchainForbidden";
/// Predicate marking backchaining on a predicate as discouraged, i.e., `(backchainDiscouraged p)`.
pub const BACKCHAIN_DISCOURAGED: &str = "backchainDiscouraged";
/// Predicate marking a rule as forward rule, i.e., `(forwardRule (implies ...))`.
pub const FORWARD_RULE: &str = "forwardRule";





/***** ERRORS *****/
/// Defines the errors originating from the [`MemoryKb`].
#[derive(Debug)]
pub enum Error {
    /// A fact with variables was asserted.
    NonGroundFact { expr: Term },
    /// An assertion was not compound.
    NotAnAssertion { expr: Term },
    /// A meta-assertion (e.g., `backchainForbidden`) had the wrong shape.
    IllegalMetaAssertion { expr: Term },
    /// A named constant was not known to the knowledge base.
    UnknownConstant { name: String },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::NonGroundFact { expr } => write!(f, "Cannot assert non-ground fact '{expr}'"),
            Self::NotAnAssertion { expr } => write!(f, "Cannot assert '{expr}' (not a compound expression)"),
            Self::IllegalMetaAssertion { expr } => write!(f, "Illegal meta-assertion '{expr}' (expected a single constant or rule argument)"),
            Self::UnknownConstant { name } => write!(f, "Unknown constant '{name}'"),
        }
    }
}
impl error::Error for Error {}





/***** HELPERS *****/
/// Everything known in a single context (microtheory).
#[derive(Clone, Debug, Default)]
struct Microtheory {
    /// The ground facts, in order of assertion.
    facts: IndexSet<Term>,
    /// The raw expressions of backward rules. Not necessarily legal Horn clauses.
    backward_rules: Vec<Term>,
    /// The raw expressions of forward rules. Not necessarily legal Horn clauses.
    forward_rules: Vec<Term>,
    /// Predicates on which backchaining is forbidden.
    forbidden: BTreeSet<Constant>,
    /// Predicates on which backchaining is discouraged.
    discouraged: BTreeSet<Constant>,
}

/// Selects the rule expressions whose consequent has the given predicate.
///
/// Expressions without a recognizable consequent are kept, for the caller to judge.
#[inline]
fn rules_concluding<'r>(rules: &'r [Term], predicate: &'r Term) -> impl 'r + Iterator<Item = &'r Term> {
    rules.iter().filter(move |rule| match rule.as_compound().and_then(|terms| terms.get(2)).and_then(Term::as_compound) {
        Some(consequent) => consequent.first().map(|p| p == predicate).unwrap_or(true),
        None => true,
    })
}

/// Collects all named constants occurring in a term.
fn collect_constants(term: &Term, constants: &mut BTreeSet<Constant>) {
    match term {
        Term::Const(c) => {
            constants.insert(c.clone());
        },
        Term::Compound(terms) => {
            for term in terms {
                collect_constants(term, constants);
            }
        },
        Term::Var(_) | Term::Int(_) | Term::Str(_) => {},
    }
}





/***** LIBRARY *****/
/// A [`KnowledgeBase`] that keeps everything in memory.
///
/// Facts and rules are stored per context (microtheory); contexts do not inherit from each
/// other. Collections and the generalization hierarchy between them are global.
#[derive(Clone, Debug)]
pub struct MemoryKb {
    /// The contexts we know of.
    mts: BTreeMap<Constant, Microtheory>,
    /// Maps every collection to its direct generalizations.
    genls: BTreeMap<Term, BTreeSet<Term>>,
    /// The terms known to be collections.
    collections: BTreeSet<Term>,
    /// The predicates that can be decided without looking anything up.
    evaluatable: BTreeSet<Constant>,
    /// All constants ever asserted.
    constants: BTreeSet<Constant>,
}

// Constructors
impl Default for MemoryKb {
    #[inline]
    fn default() -> Self { Self::new() }
}
impl MemoryKb {
    /// Constructor for an empty MemoryKb.
    ///
    /// Only the logical connectives, `equals` and `numericallyEqual` are known to be evaluatable.
    ///
    /// # Returns
    /// A new MemoryKb without any facts or rules.
    pub fn new() -> Self {
        Self {
            mts: BTreeMap::new(),
            genls: BTreeMap::new(),
            collections: BTreeSet::new(),
            evaluatable: [AND, OR, EQUALS, NUMERICALLY_EQUAL].into_iter().map(Constant::new).collect(),
            constants: BTreeSet::new(),
        }
    }

    /// Returns the given context, creating it if it does not exist.
    #[inline]
    fn mt_mut(&mut self, scope: impl Into<Constant>) -> &mut Microtheory { self.mts.entry(scope.into()).or_default() }
}

// Assertion
impl MemoryKb {
    /// Asserts an expression in the given context.
    ///
    /// The expression is interpreted as follows:
    /// - `(implies ...)` is stored as backward rule;
    /// - `(forwardRule (implies ...))` is stored as forward rule;
    /// - `(backchainForbidden p)` and `(backchainDiscouraged p)` mark predicate `p`;
    /// - `(genls A B)` and `(isa x A)` are stored as facts, but also register `A` (and `B`) as
    ///   collections; and
    /// - anything else is stored as a fact.
    ///
    /// Rules are not checked to be legal Horn clauses.
    ///
    /// # Arguments
    /// - `scope`: The context in which to assert.
    /// - `expr`: The [`Term`] to assert.
    ///
    /// # Errors
    /// This function errors if the expression is not compound, if a fact contains variables, or if
    /// a meta-assertion has the wrong arguments.
    pub fn assert_expression(&mut self, scope: impl Into<Constant>, expr: Term) -> Result<(), Error> {
        let scope: Constant = scope.into();
        let Some(terms) = expr.as_compound() else {
            return Err(Error::NotAnAssertion { expr });
        };
        collect_constants(&expr, &mut self.constants);

        let head: &str = terms.first().and_then(Term::as_const).map(Constant::name).unwrap_or("");
        match head {
            IMPLIES => {
                self.add_backward_rule(scope, expr);
                Ok(())
            },
            FORWARD_RULE => match terms {
                [_, rule] => {
                    let rule: Term = rule.clone();
                    self.add_forward_rule(scope, rule);
                    Ok(())
                },
                _ => Err(Error::IllegalMetaAssertion { expr }),
            },
            BACKCHAIN_FORBIDDEN | BACKCHAIN_DISCOURAGED => match terms {
                [_, Term::Const(pred)] => {
                    let pred: Constant = pred.clone();
                    if head == BACKCHAIN_FORBIDDEN {
                        self.forbid_backchain(scope, pred);
                    } else {
                        self.discourage_backchain(scope, pred);
                    }
                    Ok(())
                },
                _ => Err(Error::IllegalMetaAssertion { expr }),
            },
            _ => {
                if let [pred, spec, gen] = terms {
                    if pred.as_const().map(|c| c.name() == GENLS).unwrap_or(false) {
                        self.add_genls(spec.clone(), gen.clone());
                    } else if pred.as_const().map(|c| c.name() == ISA).unwrap_or(false) {
                        self.add_collection(gen.clone());
                    }
                }
                self.learn(scope, expr).map(|_| ())
            },
        }
    }

    /// Learns a new ground fact in the given context.
    ///
    /// # Arguments
    /// - `scope`: The context in which the fact holds.
    /// - `fact`: The fact itself.
    ///
    /// # Returns
    /// Whether anything has actually changed.
    ///
    /// # Errors
    /// This function errors if the fact contains variables.
    pub fn learn(&mut self, scope: impl Into<Constant>, fact: Term) -> Result<bool, Error> {
        if !fact.is_ground() {
            return Err(Error::NonGroundFact { expr: fact });
        }
        let scope: Constant = scope.into();
        trace!("Learning fact '{fact}' in '{scope}'");
        Ok(self.mt_mut(scope).facts.insert(fact))
    }

    /// Adds a backward rule to the given context.
    ///
    /// The rule is stored as-is; it need not be a legal Horn clause.
    #[inline]
    pub fn add_backward_rule(&mut self, scope: impl Into<Constant>, rule: Term) { self.mt_mut(scope).backward_rules.push(rule) }

    /// Adds a forward rule to the given context.
    ///
    /// The rule is stored as-is; it need not be a legal Horn clause.
    #[inline]
    pub fn add_forward_rule(&mut self, scope: impl Into<Constant>, rule: Term) { self.mt_mut(scope).forward_rules.push(rule) }

    /// Forbids backchaining on the given predicate in the given context.
    #[inline]
    pub fn forbid_backchain(&mut self, scope: impl Into<Constant>, predicate: impl Into<Constant>) {
        self.mt_mut(scope).forbidden.insert(predicate.into());
    }

    /// Discourages backchaining on the given predicate in the given context.
    #[inline]
    pub fn discourage_backchain(&mut self, scope: impl Into<Constant>, predicate: impl Into<Constant>) {
        self.mt_mut(scope).discouraged.insert(predicate.into());
    }

    /// Registers a term as a collection.
    #[inline]
    pub fn add_collection(&mut self, collection: Term) { self.collections.insert(collection); }

    /// Registers that collection `general` generalizes collection `specific`.
    ///
    /// Both are registered as collections too.
    #[inline]
    pub fn add_genls(&mut self, specific: Term, general: Term) {
        self.collections.insert(specific.clone());
        self.collections.insert(general.clone());
        self.genls.entry(specific).or_default().insert(general);
    }

    /// Registers a predicate as evaluatable.
    #[inline]
    pub fn add_evaluatable(&mut self, predicate: impl Into<Constant>) { self.evaluatable.insert(predicate.into()); }
}

// Inspection
impl MemoryKb {
    /// Returns the facts known in the given context, in order of assertion.
    #[inline]
    pub fn facts<'s>(&'s self, scope: &Constant) -> impl 's + Iterator<Item = &'s Term> { self.mts.get(scope).into_iter().flat_map(|mt| mt.facts.iter()) }

    /// Checks whether the given ground fact holds in the given context.
    #[inline]
    pub fn holds(&self, scope: &Constant, fact: &Term) -> bool { self.mts.get(scope).map(|mt| mt.facts.contains(fact)).unwrap_or(false) }

    /// Returns the facts in the given context that unify with the given formula.
    ///
    /// # Returns
    /// For every matching fact, the assignment that makes the formula equal to it.
    pub fn matching<'s>(&'s self, scope: &Constant, formula: &'s Term) -> impl 's + Iterator<Item = HashMap<Variable, Term>> {
        self.facts(scope).filter_map(move |fact| {
            let mut assign: HashMap<Variable, Term> = HashMap::new();
            if unify_terms(formula, fact, &mut assign) { Some(assign) } else { None }
        })
    }
}

// Collection
impl MemoryKb {
    /// Clears the knowledge base, resetting it to start.
    ///
    /// The evaluatable predicates are kept.
    #[inline]
    pub fn reset(&mut self) {
        self.mts.clear();
        self.genls.clear();
        self.collections.clear();
        self.constants.clear();
    }
}

// Connector
impl KnowledgeBase for MemoryKb {
    type Error = Error;

    #[inline]
    fn is_backchain_forbidden(&self, predicate: &Constant, scope: &Constant) -> Result<bool, Self::Error> {
        Ok(self.mts.get(scope).map(|mt| mt.forbidden.contains(predicate)).unwrap_or(false))
    }

    #[inline]
    fn is_backchain_discouraged(&self, predicate: &Constant, scope: &Constant) -> Result<bool, Self::Error> {
        Ok(self.mts.get(scope).map(|mt| mt.discouraged.contains(predicate)).unwrap_or(false))
    }

    #[inline]
    fn is_evaluatable_predicate(&self, predicate: &Constant) -> Result<bool, Self::Error> { Ok(self.evaluatable.contains(predicate)) }

    fn get_backchain_rules(&self, literal: &Literal, scope: &Constant) -> Result<Vec<Term>, Self::Error> {
        let rules: Vec<Term> = match self.mts.get(scope) {
            Some(mt) => rules_concluding(&mt.backward_rules, literal.predicate()).cloned().collect(),
            None => Vec::new(),
        };
        debug!("Found {} backward rule(s) for '{literal}' in '{scope}'", rules.len());
        Ok(rules)
    }

    fn get_forward_chain_rules(&self, literal: &Literal, scope: &Constant) -> Result<Vec<Term>, Self::Error> {
        let rules: Vec<Term> = match self.mts.get(scope) {
            Some(mt) => rules_concluding(&mt.forward_rules, literal.predicate()).cloned().collect(),
            None => Vec::new(),
        };
        debug!("Found {} forward rule(s) for '{literal}' in '{scope}'", rules.len());
        Ok(rules)
    }

    #[inline]
    fn count_using_best_index(&self, formula: &Term, scope: &Constant) -> Result<usize, Self::Error> { Ok(self.matching(scope, formula).count()) }

    #[inline]
    fn is_collection(&self, term: &Term) -> Result<bool, Self::Error> { Ok(self.collections.contains(term)) }

    fn is_more_general(&self, general: &Term, specific: &Term) -> Result<bool, Self::Error> {
        let mut todo: VecDeque<&Term> = VecDeque::from([specific]);
        let mut seen: BTreeSet<&Term> = BTreeSet::new();
        while let Some(next) = todo.pop_front() {
            if next == general {
                return Ok(true);
            }
            if !seen.insert(next) {
                continue;
            }
            if let Some(gens) = self.genls.get(next) {
                todo.extend(gens.iter());
            }
        }
        Ok(false)
    }

    #[inline]
    fn resolve_named_constant(&self, name: &str) -> Result<Term, Self::Error> {
        self.constants.get(&Constant::new(name)).cloned().map(Term::Const).ok_or_else(|| Error::UnknownConstant { name: name.into() })
    }
}

// Formatting
impl Display for MemoryKb {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        writeln!(f, "Knowledge base {{")?;
        for (scope, mt) in &self.mts {
            writeln!(f, "    {scope}:")?;
            for fact in &mt.facts {
                writeln!(f, "      + {fact}")?;
            }
            for rule in &mt.backward_rules {
                writeln!(f, "      <- {rule}")?;
            }
            for rule in &mt.forward_rules {
                writeln!(f, "      -> {rule}")?;
            }
            for pred in &mt.forbidden {
                writeln!(f, "      ! {pred}")?;
            }
            for pred in &mt.discouraged {
                writeln!(f, "      ~ {pred}")?;
            }
        }
        if self.mts.is_empty() {
            writeln!(f, "    <none>")?;
        }
        writeln!(f, "}}")
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{make_lit, make_term};

    fn scope() -> Constant { Constant::new("BaseKB") }

    #[test]
    fn test_memory_kb_assert() {
        let mut kb = MemoryKb::new();
        kb.assert_expression("BaseKB", make_term("(isa fido Dog)")).unwrap();
        kb.assert_expression("BaseKB", make_term("(implies (dog ?X) (isa ?X Dog))")).unwrap();
        kb.assert_expression("BaseKB", make_term("(forwardRule (implies (cat ?X) (isa ?X Cat)))")).unwrap();
        kb.assert_expression("BaseKB", make_term("(backchainForbidden likes)")).unwrap();
        kb.assert_expression("BaseKB", make_term("(backchainDiscouraged owns)")).unwrap();

        assert!(kb.holds(&scope(), &make_term("(isa fido Dog)")));
        assert!(!kb.holds(&Constant::new("OtherKB"), &make_term("(isa fido Dog)")));
        assert_eq!(kb.facts(&scope()).count(), 1);
        assert!(kb.is_collection(&Term::constant("Dog")).unwrap());
        assert!(kb.is_backchain_forbidden(&Constant::new("likes"), &scope()).unwrap());
        assert!(!kb.is_backchain_forbidden(&Constant::new("likes"), &Constant::new("OtherKB")).unwrap());
        assert!(kb.is_backchain_discouraged(&Constant::new("owns"), &scope()).unwrap());

        let lit = make_lit("isa", ["?X", "Dog"]);
        assert_eq!(kb.get_backchain_rules(&lit, &scope()).unwrap(), vec![make_term("(implies (dog ?X) (isa ?X Dog))")]);
        assert_eq!(kb.get_forward_chain_rules(&lit, &scope()).unwrap().len(), 1);
        assert!(kb.get_backchain_rules(&make_lit("likes", ["?X"]), &scope()).unwrap().is_empty());
    }

    #[test]
    fn test_memory_kb_rejects() {
        let mut kb = MemoryKb::new();
        assert!(matches!(kb.assert_expression("BaseKB", make_term("(likes ?X bob)")), Err(Error::NonGroundFact { .. })));
        assert!(matches!(kb.assert_expression("BaseKB", make_term("likes")), Err(Error::NotAnAssertion { .. })));
        assert!(matches!(kb.assert_expression("BaseKB", make_term("(backchainForbidden (f x))")), Err(Error::IllegalMetaAssertion { .. })));
    }

    #[test]
    fn test_memory_kb_count() {
        let mut kb = MemoryKb::new();
        for fact in ["(likes alice bob)", "(likes alice carol)", "(likes bob carol)"] {
            kb.assert_expression("BaseKB", make_term(fact)).unwrap();
        }
        assert_eq!(kb.count_using_best_index(&make_term("(likes alice ?X)"), &scope()).unwrap(), 2);
        assert_eq!(kb.count_using_best_index(&make_term("(likes ?X carol)"), &scope()).unwrap(), 2);
        assert_eq!(kb.count_using_best_index(&make_term("(likes ?X ?X)"), &scope()).unwrap(), 0);
        assert_eq!(kb.count_using_best_index(&make_term("(likes ?X ?Y)"), &Constant::new("OtherKB")).unwrap(), 0);
    }

    #[test]
    fn test_memory_kb_genls() {
        let mut kb = MemoryKb::new();
        kb.assert_expression("BaseKB", make_term("(genls Dog Mammal)")).unwrap();
        kb.assert_expression("BaseKB", make_term("(genls Mammal Animal)")).unwrap();
        kb.assert_expression("BaseKB", make_term("(genls Animal Dog)")).unwrap();
        kb.add_genls(Term::constant("Cat"), Term::constant("Mammal"));

        assert!(kb.is_more_general(&Term::constant("Animal"), &Term::constant("Dog")).unwrap());
        assert!(kb.is_more_general(&Term::constant("Mammal"), &Term::constant("Mammal")).unwrap());
        assert!(kb.is_more_general(&Term::constant("Mammal"), &Term::constant("Cat")).unwrap());
        assert!(!kb.is_more_general(&Term::constant("Cat"), &Term::constant("Mammal")).unwrap());
        assert!(kb.is_collection(&Term::constant("Cat")).unwrap());
    }

    #[test]
    fn test_memory_kb_constants() {
        let mut kb = MemoryKb::new();
        kb.assert_expression("BaseKB", make_term("(isa fido Dog)")).unwrap();
        assert_eq!(kb.resolve_named_constant("fido").unwrap(), Term::constant("fido"));
        assert!(matches!(kb.resolve_named_constant("rex"), Err(Error::UnknownConstant { .. })));

        assert!(kb.is_evaluatable_predicate(&Constant::new(NUMERICALLY_EQUAL)).unwrap());
        assert!(!kb.is_evaluatable_predicate(&Constant::new("isa")).unwrap());
        kb.add_evaluatable("greaterThan");
        assert!(kb.is_evaluatable_predicate(&Constant::new("greaterThan")).unwrap());

        kb.reset();
        assert!(kb.resolve_named_constant("fido").is_err());
        assert_eq!(kb.to_string(), "Knowledge base {\n    <none>\n}\n");
    }
}
