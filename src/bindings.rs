//  BINDINGS.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 14:50:33
//  Last edited:
//    13 Oct 2026, 12:07:58
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the [`BindingSet`], which records the values found for the
//!   variables of a single literal.
//

use std::cmp::Ordering;
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::hash::{Hash, Hasher};

use crate::connector::KnowledgeBase;
use crate::literal::Literal;
use crate::term::{Constant, Term, Variable};


/***** ERRORS *****/
/// Defines the errors originating from [`BindingSet`]s.
#[derive(Debug)]
pub enum Error {
    /// The binding set was already populated before.
    AlreadyPopulated { literal: Literal },
    /// A row of values did not have one value per variable.
    RowArity { literal: Literal, expected: usize, got: usize },
    /// The knowledge base failed to count the instances of the literal.
    Connector { literal: Literal, err: Box<dyn 'static + Send + Sync + error::Error> },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::AlreadyPopulated { literal } => write!(f, "Binding set for literal '{literal}' is already populated"),
            Self::RowArity { literal, expected, got } => {
                write!(f, "Binding set for literal '{literal}' expects {expected} value(s) per binding, got {got}")
            },
            Self::Connector { literal, .. } => write!(f, "Failed to count instances of literal '{literal}'"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::AlreadyPopulated { .. } | Self::RowArity { .. } => None,
            Self::Connector { err, .. } => Some(&**err),
        }
    }
}





/***** LIBRARY *****/
/// The values found for the variables of a [`Literal`] in some context.
///
/// A binding set starts out empty and is populated exactly once by a search. Each binding is a row
/// with one value per variable of the literal, in the order of [`Literal::variables()`].
///
/// Equality and hashing only look at the literal, since the bindings may not be known yet.
#[derive(Clone, Debug)]
pub struct BindingSet {
    /// The literal for which we're finding bindings.
    literal: Literal,
    /// The context in which we find them.
    context: Constant,
    /// The bindings found, if any search has populated us already.
    binding_values: Option<Vec<Vec<Term>>>,
}

// Constructors
impl BindingSet {
    /// Constructor for an unpopulated BindingSet.
    ///
    /// # Arguments
    /// - `literal`: The [`Literal`] to find bindings for.
    /// - `context`: The context (microtheory) in which to find them.
    ///
    /// # Returns
    /// A new BindingSet without any bindings.
    #[inline]
    pub fn new(literal: Literal, context: impl Into<Constant>) -> Self { Self { literal, context: context.into(), binding_values: None } }
}

// Population
impl BindingSet {
    /// Populates this binding set with found bindings.
    ///
    /// # Arguments
    /// - `rows`: The bindings, each with one value per variable of the literal.
    ///
    /// # Errors
    /// This function errors if the set was already populated or if any row has the wrong length.
    pub fn populate(&mut self, rows: Vec<Vec<Term>>) -> Result<(), Error> {
        if self.binding_values.is_some() {
            return Err(Error::AlreadyPopulated { literal: self.literal.clone() });
        }
        let arity: usize = self.literal.arity();
        if let Some(row) = rows.iter().find(|row| row.len() != arity) {
            return Err(Error::RowArity { literal: self.literal.clone(), expected: arity, got: row.len() });
        }
        self.binding_values = Some(rows);
        Ok(())
    }

    /// Populates this binding set with the values of its only variable.
    ///
    /// # Arguments
    /// - `values`: The values found for the literal's variable.
    ///
    /// # Errors
    /// This function errors if the set was already populated or if the literal is not unary.
    #[inline]
    pub fn populate_unary(&mut self, values: Vec<Term>) -> Result<(), Error> { self.populate(values.into_iter().map(|v| vec![v]).collect()) }
}

// Inspection
impl BindingSet {
    /// Returns the literal for which bindings are (being) found.
    #[inline]
    pub fn literal(&self) -> &Literal { &self.literal }

    /// Returns the context in which bindings are (being) found.
    #[inline]
    pub fn context(&self) -> &Constant { &self.context }

    /// Returns whether a search has populated this set yet.
    #[inline]
    pub const fn is_populated(&self) -> bool { self.binding_values.is_some() }

    /// Returns the bindings, if populated.
    #[inline]
    pub fn rows(&self) -> Option<&[Vec<Term>]> { self.binding_values.as_deref() }

    /// Returns all values found for the given variable, in binding order.
    ///
    /// # Returns
    /// [`None`] if the set is not populated or `var` is not a variable of the literal.
    pub fn values_of(&self, var: &Variable) -> Option<impl '_ + Iterator<Item = &Term>> {
        let index: usize = self.literal.variables().get_index_of(var)?;
        Some(self.binding_values.as_ref()?.iter().map(move |row| &row[index]))
    }

    /// Returns the number of bindings found. `0` while unpopulated.
    #[inline]
    pub fn size(&self) -> usize { self.binding_values.as_ref().map(Vec::len).unwrap_or(0) }

    /// Returns the number of facts matching the literal in this set's context.
    ///
    /// The count is asked of the knowledge base the first time, and cached on the literal after.
    ///
    /// # Arguments
    /// - `kb`: The [`KnowledgeBase`] to count in.
    ///
    /// # Errors
    /// This function errors if the knowledge base failed to count.
    pub fn instance_count<K: ?Sized + KnowledgeBase>(&mut self, kb: &K) -> Result<usize, Error> {
        if let Some(count) = self.literal.instance_count() {
            return Ok(count);
        }
        let count: usize = kb
            .count_using_best_index(&self.literal.to_term(), &self.context)
            .map_err(|err| Error::Connector { literal: self.literal.clone(), err: Box::new(err) })?;
        self.literal.set_instance_count(count);
        Ok(count)
    }
}

// Ordering
impl BindingSet {
    /// Orders binding sets by their [size](BindingSet::size()), smallest first.
    ///
    /// This is not the [`Ord`] of a BindingSet, since equality only considers the literal.
    #[inline]
    pub fn cmp_size(&self, other: &Self) -> Ordering { self.size().cmp(&other.size()) }

    /// Finds the binding set with the fewest bindings, i.e., the most constrained literal.
    ///
    /// # Returns
    /// The first of the smallest binding sets, or [`None`] if there are none.
    #[inline]
    pub fn tightest<'s>(sets: impl IntoIterator<Item = &'s BindingSet>) -> Option<&'s BindingSet> {
        sets.into_iter().reduce(|best, next| if next.cmp_size(best) == Ordering::Less { next } else { best })
    }
}

// Standard traits
impl Eq for BindingSet {}
impl Hash for BindingSet {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) { self.literal.hash(state) }
}
impl PartialEq for BindingSet {
    #[inline]
    fn eq(&self, other: &Self) -> bool { self.literal == other.literal }
}
impl Display for BindingSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{} in {}", self.literal, self.context)?;
        match &self.binding_values {
            Some(rows) => {
                write!(f, " {{")?;
                for (i, row) in rows.iter().enumerate() {
                    write!(f, "{}(", if i > 0 { ", " } else { "" })?;
                    for (j, (var, value)) in self.literal.variables().iter().zip(row).enumerate() {
                        write!(f, "{}{var}={value}", if j > 0 { " " } else { "" })?;
                    }
                    write!(f, ")")?;
                }
                write!(f, "}}")
            },
            None => write!(f, " <unsolved>"),
        }
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKb;
    use crate::tests::{CountingKb, FailingKb, make_lit, make_term};

    #[test]
    fn test_bindings_populate() {
        let mut set = BindingSet::new(make_lit("likes", ["?X", "?Y"]), "BaseKB");
        assert!(!set.is_populated());
        assert_eq!(set.size(), 0);
        assert!(set.values_of(&Variable::new("X")).is_none());

        set.populate(vec![vec![Term::constant("a"), Term::constant("b")], vec![Term::constant("c"), Term::constant("d")]]).unwrap();
        assert!(set.is_populated());
        assert_eq!(set.size(), 2);
        assert_eq!(set.values_of(&Variable::new("Y")).unwrap().map(Term::to_string).collect::<Vec<_>>(), ["b", "d"]);
        assert!(set.values_of(&Variable::new("Z")).is_none());
        assert_eq!(set.to_string(), "(likes ?X ?Y) in BaseKB {(?X=a ?Y=b), (?X=c ?Y=d)}");

        // Only once
        assert!(matches!(set.populate(vec![]), Err(Error::AlreadyPopulated { .. })));
    }

    #[test]
    fn test_bindings_instance_count_failure() {
        let mut kb = MemoryKb::new();
        kb.assert_expression("BaseKB", make_term("(isa fido Dog)")).unwrap();

        let mut set = BindingSet::new(make_lit("isa", ["?X", "Dog"]), "BaseKB");
        let failing = FailingKb::new(&kb, "count_using_best_index");
        assert!(matches!(set.instance_count(&failing), Err(Error::Connector { .. })));
        assert_eq!(set.literal().instance_count(), None);

        // Nothing was cached, so a working knowledge base is asked again
        assert_eq!(set.instance_count(&kb).unwrap(), 1);
    }

    #[test]
    fn test_bindings_row_arity() {
        let mut set = BindingSet::new(make_lit("likes", ["?X", "?Y"]), "BaseKB");
        assert!(matches!(set.populate_unary(vec![Term::constant("a")]), Err(Error::RowArity { expected: 2, got: 1, .. })));
        assert!(!set.is_populated());
    }

    #[test]
    fn test_bindings_instance_count_cached() {
        let mut kb = MemoryKb::new();
        kb.assert_expression("BaseKB", make_term("(isa fido Dog)")).unwrap();
        kb.assert_expression("BaseKB", make_term("(isa rex Dog)")).unwrap();
        kb.assert_expression("BaseKB", make_term("(isa tom Cat)")).unwrap();
        let kb = CountingKb::new(kb);

        let mut set = BindingSet::new(make_lit("isa", ["?X", "Dog"]), "BaseKB");
        assert_eq!(set.instance_count(&kb).unwrap(), 2);
        assert_eq!(set.instance_count(&kb).unwrap(), 2);
        assert_eq!(kb.calls(), 1);
        assert_eq!(set.literal().instance_count(), Some(2));
    }

    #[test]
    fn test_bindings_ordering() {
        let mut small = BindingSet::new(make_lit("p", ["?X"]), "BaseKB");
        small.populate_unary(vec![Term::Int(1)]).unwrap();
        let mut large = BindingSet::new(make_lit("q", ["?X"]), "BaseKB");
        large.populate_unary(vec![Term::Int(1), Term::Int(2)]).unwrap();
        let empty = BindingSet::new(make_lit("r", ["?X"]), "BaseKB");

        assert_eq!(small.cmp_size(&large), Ordering::Less);
        assert_eq!(large.cmp_size(&small), Ordering::Greater);
        assert_eq!(BindingSet::tightest([&large, &small]).map(|s| s.literal().clone()), Some(make_lit("p", ["?X"])));
        assert_eq!(BindingSet::tightest([&large, &empty, &small]).map(|s| s.literal().clone()), Some(make_lit("r", ["?X"])));
        assert!(BindingSet::tightest(Vec::<&BindingSet>::new()).is_none());
    }

    #[test]
    fn test_bindings_equality_by_literal() {
        let mut a = BindingSet::new(make_lit("p", ["?X"]), "BaseKB");
        let b = BindingSet::new(make_lit("p", ["?X"]), "OtherKB");
        a.populate_unary(vec![Term::Int(1)]).unwrap();
        assert_eq!(a, b);
    }
}
