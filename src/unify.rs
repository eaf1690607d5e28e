//  UNIFY.rs
//    by Lut99
//
//  Created:
//    13 Oct 2026, 13:02:17
//  Last edited:
//    15 Oct 2026, 09:14:22
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements purely syntactic unification of terms, and a [`Unifier`]
//!   built on top of it.
//!
//!   Unification is two-sided: both the literal to prove and the rule may
//!   contain variables. Assignments are kept in triangular form (a
//!   variable may be bound to a term containing other bound variables),
//!   which [`Term::apply()`] resolves.
//

use std::collections::HashMap;
use std::convert::Infallible;

use crate::builtins::EQUALS;
use crate::connector::Unifier;
use crate::horn::HornClause;
use crate::literal::Literal;
use crate::log::trace;
use crate::term::{Term, Variable};


/***** HELPERS *****/
/// Follows variable bindings until an unbound variable or a non-variable term is found.
#[inline]
fn walk<'t>(mut term: &'t Term, assign: &'t HashMap<Variable, Term>) -> &'t Term {
    while let Term::Var(v) = term {
        match assign.get(v) {
            Some(next) if next != term => term = next,
            _ => break,
        }
    }
    term
}

/// Checks whether the given variable occurs in the given term, following bindings.
fn occurs(var: &Variable, term: &Term, assign: &HashMap<Variable, Term>) -> bool {
    match walk(term, assign) {
        Term::Var(v) => v == var,
        Term::Compound(terms) => terms.iter().any(|t| occurs(var, t, assign)),
        Term::Const(_) | Term::Int(_) | Term::Str(_) => false,
    }
}





/***** LIBRARY *****/
/// Unifies two terms, extending the given assignment.
///
/// If both sides are (unbound) variables, the one on the right is bound to the one on the left.
/// Hence, pass the terms whose variables should survive as `left`.
///
/// Binding a variable to a term that contains it (e.g., `?X` to `(f ?X)`) fails the unification.
///
/// # Arguments
/// - `left`: The first [`Term`] to unify.
/// - `right`: The second [`Term`] to unify.
/// - `assign`: The assignment to extend. It is left in an unspecified (but valid) state if
///   unification fails, so pass a copy if the original is still needed.
///
/// # Returns
/// True if the terms unify, or false otherwise.
pub fn unify_terms(left: &Term, right: &Term, assign: &mut HashMap<Variable, Term>) -> bool {
    let left: Term = walk(left, assign).clone();
    let right: Term = walk(right, assign).clone();
    match (left, right) {
        (Term::Var(l), Term::Var(r)) => {
            if l != r {
                assign.insert(r, Term::Var(l));
            }
            true
        },
        (Term::Var(l), right) => {
            if occurs(&l, &right, assign) {
                return false;
            }
            assign.insert(l, right);
            true
        },
        (left, Term::Var(r)) => {
            if occurs(&r, &left, assign) {
                return false;
            }
            assign.insert(r, left);
            true
        },
        (Term::Compound(ls), Term::Compound(rs)) => ls.len() == rs.len() && ls.iter().zip(rs.iter()).all(|(l, r)| unify_terms(l, r, assign)),
        (left, right) => left == right,
    }
}



/// A [`Unifier`] that only looks at the syntax of literals, nothing else.
///
/// Variables in the literal that end up bound to something other than a variable are reported
/// back as an extra `(equals ?X <value>)`-antecedent, which keeps the value observable to whoever
/// solves the antecedents.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntacticUnifier;
impl Unifier for SyntacticUnifier {
    type Error = Infallible;

    fn semantically_unify(&self, literal: &Literal, clause: &HornClause) -> Result<Option<Vec<Literal>>, Self::Error> {
        let mut assign: HashMap<Variable, Term> = HashMap::new();
        if !unify_terms(&literal.to_term(), &clause.consequent().to_term(), &mut assign) {
            trace!("Literal '{literal}' does not unify with consequent '{}'", clause.consequent());
            return Ok(None);
        }

        let mut antecedents: Vec<Literal> = clause.antecedents().iter().map(|ante| ante.apply(&assign)).collect();
        for var in literal.variables() {
            let value: Term = Term::Var(var.clone()).apply(&assign);
            if !value.is_var() {
                // Length is 3, so this never fails
                if let Ok(equals) = Literal::from_formula(vec![Term::constant(EQUALS), Term::Var(var.clone()), value]) {
                    antecedents.push(equals);
                }
            }
        }
        Ok(Some(antecedents))
    }
}





/***** TESTS *****/
