//! Page ordering.

/// Natural (numeric-aware) filename ordering.
pub mod natural;
