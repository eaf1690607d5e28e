//  LOG.rs
//    by Lut99
//
//  Created:
//    12 Oct 2026, 10:02:11
//  Last edited:
//    13 Oct 2026, 09:41:37
//  Auto updated?
//    Yes
//
//  Description:
//!   Logging shims for the engine.
//!
//!   Every macro in here forwards to its namesake in the
//!   [`log`](https://github.com/rust-lang/log)-crate if the `log`-feature is enabled, and expands
//!   to nothing otherwise.
//


/***** LIBRARY *****/
/// Forwards to `log::warn!()` (with the `log`-feature) or does nothing (without it).
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! warning {
    ($($t:tt)*) => { ::log::warn!($($t)*) };
}
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! warning {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use warning as warn;

/// Forwards to `log::info!()` (with the `log`-feature) or does nothing (without it).
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! info {
    ($($t:tt)*) => { ::log::info!($($t)*) };
}
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! info {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use info;

/// Forwards to `log::debug!()` (with the `log`-feature) or does nothing (without it).
///
/// Used for per-search events, e.g., a literal being backchained on or a predicate being bypassed.
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! debug {
    ($($t:tt)*) => { ::log::debug!($($t)*) };
}
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! debug {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use debug;

/// Forwards to `log::trace!()` (with the `log`-feature) or does nothing (without it).
///
/// Used for per-rule events, which are far too chatty for anything but debugging the engine itself.
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! trace {
    ($($t:tt)*) => { ::log::trace!($($t)*) };
}
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! trace {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use trace;
