//  MOD.rs
//    by Lut99
//
//  Created:
//    13 Oct 2026, 17:40:12
//  Last edited:
//    13 Oct 2026, 17:41:30
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements a knowledge base and a solver that live entirely in
//!   memory.
//!
//!   These are complete enough to run the backchainer stand-alone (e.g.,
//!   from the command-line or in tests), but make no attempt at being fast
//!   on large knowledge bases.
//

// Nested modules
mod knowledge_base;
mod solver;

// Imports
pub use knowledge_base::{Error, MemoryKb};
pub use solver::MemorySolver;
