//  BUILTINS.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 10:40:19
//  Last edited:
//    12 Oct 2026, 16:02:45
//  Auto updated?
//    Yes
//
//  Description:
//!   Names of the constants that the engine itself attaches meaning to.
//

/***** CONSTANTS *****/
/// Marks an implication, i.e., `(implies <antecedent> <consequent>)`.
pub const IMPLIES: &str = "implies";
/// Conjunction of literals.
pub const AND: &str = "and";
/// Disjunction of literals.
pub const OR: &str = "or";

/// Collection membership, i.e., `(isa <instance> <collection>)`.
pub const ISA: &str = "isa";
/// Generalization between collections, i.e., `(genls <specialization> <generalization>)`.
pub const GENLS: &str = "genls";

/// Syntactic equality of two terms, i.e., `(equals ?X Dog)`.
pub const EQUALS: &str = "equals";
/// Numeric equality, which can be decided without consulting the knowledge base.
pub const NUMERICALLY_EQUAL: &str = "numericallyEqual";
/// The successor function over integers, i.e., `(successor 1)` is `2`.
pub const SUCCESSOR: &str = "successor";



/// Returns whether the given predicate is one of the taxonomic ones ([`ISA`] or [`GENLS`]).
///
/// These are so common that backchaining on them is rarely worth it.
#[inline]
pub fn is_taxonomic(predicate: &str) -> bool { predicate == ISA || predicate == GENLS }

/// Returns whether the given predicate is a logical connective ([`AND`] or [`OR`]).
#[inline]
pub fn is_connective(predicate: &str) -> bool { predicate == AND || predicate == OR }
