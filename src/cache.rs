//  CACHE.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 15:21:40
//  Last edited:
//    15 Oct 2026, 09:48:05
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the [`RuleCache`], which remembers which Horn clauses
//!   conclude which predicate in which scope.
//!
//!   One cache is meant to be shared (through an [`Arc`](std::sync::Arc))
//!   by all searches in a process. It is guarded by a single lock, which
//!   makes every operation atomic with respect to its key.
//

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::horn::HornClause;
use crate::log::trace;
use crate::term::Constant;


/***** AUXILLARY *****/
/// Identifies a set of cached rules: the scope they were fetched in and the predicate they conclude.
type Key = (Constant, Constant);





/***** LIBRARY *****/
/// A bounded, least-recently-used map from predicates to the Horn clauses concluding them.
///
/// Rules are remembered per scope, as knowledge bases may have different rules in each.
#[derive(Debug)]
pub struct RuleCache {
    /// The cache itself.
    rules: Mutex<LruCache<Key, Vec<HornClause>>>,
}

// Constructors
impl Default for RuleCache {
    #[inline]
    fn default() -> Self { Self::new(Self::DEFAULT_CAPACITY) }
}
impl RuleCache {
    /// The capacity of a [default](RuleCache::default()) cache.
    pub const DEFAULT_CAPACITY: usize = 200;


    /// Constructor for the RuleCache.
    ///
    /// # Arguments
    /// - `capacity`: The maximum number of predicates to remember rules for. A capacity of `0` is
    ///   taken as `1`.
    ///
    /// # Returns
    /// A new, empty RuleCache.
    #[inline]
    pub fn new(capacity: usize) -> Self { Self { rules: Mutex::new(LruCache::new(Self::capacity(capacity))) } }

    /// Turns a user-given capacity into a legal one.
    #[inline]
    fn capacity(capacity: usize) -> NonZeroUsize { NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN) }

    /// Locks the cache.
    ///
    /// A panic while holding the lock cannot leave the map in a state that's worse than outdated,
    /// so poisoning is ignored.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, LruCache<Key, Vec<HornClause>>> { self.rules.lock().unwrap_or_else(PoisonError::into_inner) }
}

// Operations
impl RuleCache {
    /// Returns the rules concluding the given predicate in the given scope, if cached.
    ///
    /// Marks the entry as most recently used.
    ///
    /// # Arguments
    /// - `scope`: The scope in which the rules were fetched.
    /// - `predicate`: The predicate to look up.
    ///
    /// # Returns
    /// A copy of the cached rules, or [`None`] if there are none.
    #[inline]
    pub fn get(&self, scope: &Constant, predicate: &Constant) -> Option<Vec<HornClause>> {
        let res: Option<Vec<HornClause>> = self.lock().get(&(scope.clone(), predicate.clone())).cloned();
        trace!("Rule cache {} for '{predicate}' in '{scope}'", if res.is_some() { "hit" } else { "miss" });
        res
    }

    /// Caches the rules concluding the given predicate in the given scope.
    ///
    /// If the cache is full, the least recently used entry is evicted first.
    ///
    /// # Arguments
    /// - `scope`: The scope in which the rules were fetched.
    /// - `predicate`: The predicate concluded by the rules.
    /// - `rules`: The [`HornClause`]s concluding it.
    ///
    /// # Returns
    /// The rules that were cached for this predicate before, if any.
    #[inline]
    pub fn put(&self, scope: Constant, predicate: Constant, rules: Vec<HornClause>) -> Option<Vec<HornClause>> {
        trace!("Caching {} rule(s) for '{predicate}' in '{scope}'", rules.len());
        self.lock().put((scope, predicate), rules)
    }

    /// Invalidates the rules of the given predicate in the given scope.
    ///
    /// # Returns
    /// The rules that were cached for this predicate, if any.
    #[inline]
    pub fn remove(&self, scope: &Constant, predicate: &Constant) -> Option<Vec<HornClause>> { self.lock().pop(&(scope.clone(), predicate.clone())) }

    /// Returns the number of (scope, predicate)-pairs for which rules are cached.
    #[inline]
    pub fn size(&self) -> usize { self.lock().len() }

    /// Returns the maximum number of (scope, predicate)-pairs for which rules are cached.
    #[inline]
    pub fn cap(&self) -> usize { self.lock().cap().get() }

    /// Forgets all cached rules and changes the capacity.
    ///
    /// # Arguments
    /// - `capacity`: The new capacity. A capacity of `0` is taken as `1`.
    #[inline]
    pub fn reset(&self, capacity: usize) {
        let mut rules = self.lock();
        rules.clear();
        rules.resize(Self::capacity(capacity));
    }

    /// Forgets all cached rules, keeping the capacity.
    #[inline]
    pub fn clear(&self) { self.lock().clear() }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::tests::make_clause;

    #[test]
    fn test_cache_put_get_remove() {
        let cache = RuleCache::default();
        assert_eq!(cache.cap(), RuleCache::DEFAULT_CAPACITY);
        let (mt, p) = (Constant::new("BaseKB"), Constant::new("p"));
        assert!(cache.get(&mt, &p).is_none());

        let rules = vec![make_clause("(implies (q ?X) (p ?X))")];
        assert!(cache.put(mt.clone(), p.clone(), rules.clone()).is_none());
        assert_eq!(cache.get(&mt, &p), Some(rules.clone()));
        assert_eq!(cache.size(), 1);

        assert_eq!(cache.remove(&mt, &p), Some(rules));
        assert!(cache.get(&mt, &p).is_none());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_cache_separates_scopes() {
        let cache = RuleCache::default();
        let (a, b, p) = (Constant::new("A"), Constant::new("B"), Constant::new("p"));
        cache.put(a.clone(), p.clone(), vec![make_clause("(implies (q ?X) (p ?X))")]);
        assert!(cache.get(&b, &p).is_none());

        cache.put(b.clone(), p.clone(), vec![]);
        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get(&a, &p).map(|rules| rules.len()), Some(1));
        assert_eq!(cache.get(&b, &p), Some(vec![]));

        // Invalidating in one scope leaves the other alone
        cache.remove(&a, &p);
        assert!(cache.get(&a, &p).is_none());
        assert!(cache.get(&b, &p).is_some());
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let cache = RuleCache::new(2);
        let mt = Constant::new("BaseKB");
        let (p, q, r) = (Constant::new("p"), Constant::new("q"), Constant::new("r"));
        cache.put(mt.clone(), p.clone(), vec![make_clause("(implies (a ?X) (p ?X))")]);
        cache.put(mt.clone(), q.clone(), vec![make_clause("(implies (a ?X) (q ?X))")]);

        // Touch `p` so that `q` is the oldest
        assert!(cache.get(&mt, &p).is_some());
        cache.put(mt.clone(), r.clone(), vec![make_clause("(implies (a ?X) (r ?X))")]);
        assert!(cache.get(&mt, &p).is_some());
        assert!(cache.get(&mt, &q).is_none());
        assert!(cache.get(&mt, &r).is_some());
        assert_eq!(cache.size(), 2);
    }

    #[test]
    fn test_cache_reset() {
        let cache = RuleCache::new(0);
        assert_eq!(cache.cap(), 1);
        let mt = Constant::new("BaseKB");
        cache.put(mt.clone(), Constant::new("p"), vec![]);
        cache.reset(10);
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.cap(), 10);

        cache.put(mt, Constant::new("p"), vec![]);
        cache.clear();
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.cap(), 10);
    }

    #[test]
    fn test_cache_shared_between_threads() {
        let cache = Arc::new(RuleCache::new(64));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let mt = Constant::new(format!("Mt{i}"));
                    for j in 0..16 {
                        let pred = Constant::new(format!("p{j}"));
                        cache.put(mt.clone(), pred.clone(), vec![make_clause(&format!("(implies (a ?X) ({pred} ?X))"))]);
                        assert!(cache.get(&mt, &pred).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.size(), 64);
    }
}
