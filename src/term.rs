//  TERM.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 10:11:52
//  Last edited:
//    13 Oct 2026, 11:20:04
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the terms that literals and rules are built from.
//!
//!   A [`Term`] is either atomic (a named [`Constant`], an integer or a string), a [`Variable`],
//!   or a compound, bracketed list of other terms. Literals, Horn clauses and rule expressions as
//!   fetched from a knowledge base are all just (compound) terms in the end.
//

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FResult};
use std::sync::atomic::{AtomicU64, Ordering};

use enum_debug::EnumDebug;
use indexmap::IndexSet;


/***** CONSTANTS *****/
/// Counter handing out the scopes of [fresh](Variable::fresh()) variables.
///
/// Starts at 1, because scope 0 is reserved for variables that were written by someone.
static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);





/***** LIBRARY *****/
/// A variable in a [`Term`].
///
/// Variables are identified by their name _and_ their scope. Variables read from input all live in
/// scope `0`; [renaming](Variable::fresh()) keeps the name but moves the variable to a brand-new
/// scope. As such, `?X` and a renamed `?X` never compare equal.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Variable {
    /// The name of the variable, without the leading `?`.
    name:  String,
    /// The scope in which the variable lives.
    scope: u64,
}
impl Variable {
    /// Constructor for a Variable in the default scope.
    ///
    /// # Arguments
    /// - `name`: The name of the variable. A leading `?` is stripped if given.
    ///
    /// # Returns
    /// A new Variable in scope `0`.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        let mut name: String = name.into();
        if name.starts_with('?') {
            name.remove(0);
        }
        Self { name, scope: 0 }
    }

    /// Generates a globally unique copy of this variable.
    ///
    /// The name is kept for readability, but the scope is drawn from a process-wide counter. Hence,
    /// the result is guaranteed not to be equal to any variable in existence.
    ///
    /// # Returns
    /// A new Variable with the same name in a fresh scope.
    #[inline]
    pub fn fresh(&self) -> Self { Self { name: self.name.clone(), scope: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed) } }

    /// Returns the name of the variable (without `?`).
    #[inline]
    pub fn name(&self) -> &str { &self.name }

    /// Returns the scope of the variable. `0` for variables that have never been renamed.
    #[inline]
    pub const fn scope(&self) -> u64 { self.scope }
}
impl Display for Variable {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        if self.scope == 0 { write!(f, "?{}", self.name) } else { write!(f, "?{}#{}", self.name, self.scope) }
    }
}



/// A named constant, e.g., a predicate, a collection or an individual.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Constant {
    /// The name of the constant.
    name: String,
}
impl Constant {
    /// Constructor for the Constant.
    ///
    /// # Arguments
    /// - `name`: The name of the constant.
    ///
    /// # Returns
    /// A new Constant.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }

    /// Returns the name of the constant.
    #[inline]
    pub fn name(&self) -> &str { &self.name }
}
impl Display for Constant {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name) }
}
impl From<&str> for Constant {
    #[inline]
    fn from(value: &str) -> Self { Self::new(value) }
}



/// A term in a logical expression.
///
/// # Syntax
/// ```plain
/// Dog
/// ?X
/// 42
/// "a string"
/// (isa ?X Dog)
/// ```
#[derive(Clone, Debug, EnumDebug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Term {
    /// A variable that may be bound to any other term.
    Var(Variable),
    /// A named constant.
    Const(Constant),
    /// A number.
    Int(i64),
    /// A piece of text. Only ever plain data, never a predicate or collection.
    Str(String),
    /// A bracketed list of terms, e.g., a functional expression or a nested formula.
    Compound(Vec<Term>),
}

// Constructors
impl Term {
    /// Shorthand for creating a [`Term::Var`] in the default scope.
    #[inline]
    pub fn var(name: impl Into<String>) -> Self { Self::Var(Variable::new(name)) }

    /// Shorthand for creating a [`Term::Const`].
    #[inline]
    pub fn constant(name: impl Into<String>) -> Self { Self::Const(Constant::new(name)) }

    /// Shorthand for creating a [`Term::Compound`] out of something iterable.
    #[inline]
    pub fn compound(terms: impl IntoIterator<Item = Term>) -> Self { Self::Compound(terms.into_iter().collect()) }
}

// Inspection
impl Term {
    /// Returns the variable if this term is one.
    #[inline]
    pub const fn as_var(&self) -> Option<&Variable> {
        match self {
            Self::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the constant if this term is a named one.
    #[inline]
    pub const fn as_const(&self) -> Option<&Constant> {
        match self {
            Self::Const(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the elements of this term if it is compound.
    #[inline]
    pub fn as_compound(&self) -> Option<&[Term]> {
        match self {
            Self::Compound(terms) => Some(terms),
            _ => None,
        }
    }

    /// Returns whether this term is a variable.
    #[inline]
    pub const fn is_var(&self) -> bool { matches!(self, Self::Var(_)) }

    /// Returns whether this term is a plain constant, i.e., neither a variable nor compound.
    #[inline]
    pub const fn is_atomic(&self) -> bool { matches!(self, Self::Const(_) | Self::Int(_) | Self::Str(_)) }

    /// Returns whether the given constant is the head of this (compound) term.
    ///
    /// # Arguments
    /// - `name`: The name of the constant to look for.
    ///
    /// # Returns
    /// True if this term is compound and its first element is the constant called `name`.
    #[inline]
    pub fn is_headed_by(&self, name: &str) -> bool {
        match self {
            Self::Compound(terms) => terms.first().and_then(Term::as_const).map(|c| c.name() == name).unwrap_or(false),
            _ => false,
        }
    }

    /// Returns whether this term (or any of its nested terms) contains no variables at all.
    #[inline]
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Var(_) => false,
            Self::Compound(terms) => terms.iter().all(Term::is_ground),
            Self::Const(_) | Self::Int(_) | Self::Str(_) => true,
        }
    }

    /// Returns whether the given variable occurs anywhere in this term.
    #[inline]
    pub fn contains_var(&self, var: &Variable) -> bool {
        match self {
            Self::Var(v) => v == var,
            Self::Compound(terms) => terms.iter().any(|t| t.contains_var(var)),
            Self::Const(_) | Self::Int(_) | Self::Str(_) => false,
        }
    }

    /// Collects the variables in this term into the given set.
    ///
    /// The set is traversed depth-first, left-to-right, so the set's order is that of first
    /// occurrence.
    ///
    /// # Arguments
    /// - `vars`: The [`IndexSet`] to extend.
    pub fn collect_vars(&self, vars: &mut IndexSet<Variable>) {
        match self {
            Self::Var(v) => {
                vars.insert(v.clone());
            },
            Self::Compound(terms) => {
                for term in terms {
                    term.collect_vars(vars);
                }
            },
            Self::Const(_) | Self::Int(_) | Self::Str(_) => {},
        }
    }

    /// Returns the distinct variables in this term, in order of first occurrence.
    #[inline]
    pub fn vars(&self) -> IndexSet<Variable> {
        let mut vars: IndexSet<Variable> = IndexSet::new();
        self.collect_vars(&mut vars);
        vars
    }
}

// Rewriting
impl Term {
    /// Replaces every occurrence of a variable in this term, in-place.
    ///
    /// # Arguments
    /// - `var`: The [`Variable`] to replace.
    /// - `value`: The [`Term`] to replace it with.
    ///
    /// # Returns
    /// The number of occurrences replaced.
    pub fn substitute_mut(&mut self, var: &Variable, value: &Term) -> usize {
        match self {
            Self::Var(v) if v == var => {
                *self = value.clone();
                1
            },
            Self::Compound(terms) => terms.iter_mut().map(|t| t.substitute_mut(var, value)).sum(),
            Self::Var(_) | Self::Const(_) | Self::Int(_) | Self::Str(_) => 0,
        }
    }

    /// Returns a copy of this term with the given assignment applied.
    ///
    /// Variables bound in the assignment are replaced by their value, which is resolved further if
    /// it contains bound variables itself. Unbound variables are left as-is.
    ///
    /// # Arguments
    /// - `assign`: A map of [`Variable`]s to the [`Term`]s they are bound to.
    ///
    /// # Returns
    /// A new Term with as many variables resolved as the assignment allows.
    pub fn apply(&self, assign: &HashMap<Variable, Term>) -> Term {
        match self {
            Self::Var(v) => match assign.get(v) {
                // Prevent looping forever on `?X -> ?X`
                Some(Self::Var(w)) if w == v => self.clone(),
                Some(value) => value.apply(assign),
                None => self.clone(),
            },
            Self::Compound(terms) => Self::Compound(terms.iter().map(|t| t.apply(assign)).collect()),
            Self::Const(_) | Self::Int(_) | Self::Str(_) => self.clone(),
        }
    }
}

// Formatting
impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Var(v) => v.fmt(f),
            Self::Const(c) => c.fmt(f),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Compound(terms) => {
                write!(f, "(")?;
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    term.fmt(f)?;
                }
                write!(f, ")")
            },
        }
    }
}

// Conversion
impl From<Variable> for Term {
    #[inline]
    fn from(value: Variable) -> Self { Self::Var(value) }
}
impl From<Constant> for Term {
    #[inline]
    fn from(value: Constant) -> Self { Self::Const(value) }
}
impl From<i64> for Term {
    #[inline]
    fn from(value: i64) -> Self { Self::Int(value) }
}





/***** TESTS *****/
