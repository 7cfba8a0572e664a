//! Tax calculation for the old and new income-tax regimes.
//!
//! The engine itself is pure and infallible; sanitization of raw input and
//! advice generation sit alongside it.

pub mod advice;
pub mod common;
pub mod engine;
pub mod sanitize;
pub mod slabs;

pub use advice::{Advice, AdviceKind, GENERAL_TIPS, Priority, advise};
pub use engine::TaxEngine;
pub use sanitize::{normalize_amount_input, parse_amount};
