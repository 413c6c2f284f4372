//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod catalog;
pub mod errors;
pub mod identity;
pub mod review;
pub mod shop;
#[cfg(test)]
pub mod test_support;
