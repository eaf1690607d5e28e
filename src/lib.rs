//  LIB.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 09:58:40
//  Last edited:
//    14 Oct 2026, 15:41:19
//  Auto updated?
//    Yes
//
//  Description:
//!   A backward-chaining inference engine over Horn clauses.
//!
//!   Given a literal with a single unbound variable, e.g., `(isa ?X Dog)`,
//!   the [`Backchainer`] finds values for that variable by looking up the
//!   rules that conclude the literal and proving their antecedents in a
//!   recursive, depth-bounded search.
//!
//!   The knowledge base, the unifier and the recursive search are all
//!   abstracted behind traits in [`connector`]. In-memory implementations
//!   live in [`memory`] and [`unify`].
//

// Declare modules
pub mod backchain;
pub mod bindings;
pub mod builtins;
pub mod cache;
pub mod connector;
pub mod horn;
pub mod literal;
mod log;
pub mod memory;
pub mod parser;
pub mod term;
pub mod unify;

// Re-exports
pub use backchain::{BackchainConfig, Backchainer, ProofObligation};
pub use bindings::BindingSet;
pub use cache::RuleCache;
pub use connector::{KnowledgeBase, SearchParams, Solution, SubSearch, Unifier};
pub use horn::HornClause;
pub use literal::{Literal, Subsumption};
pub use term::{Constant, Term, Variable};
