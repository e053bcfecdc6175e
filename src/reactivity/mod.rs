// ============================================================================
// spark-mvvm - Reactivity Module
// Dependencies, the scoped tracking cursor and write equality
// ============================================================================

pub mod dep;
pub mod equality;
pub mod tracking;

pub use dep::Dep;
pub use equality::{loose_equals, strict_equals, EqualsFn};
pub use tracking::{untrack, with_tracking};
