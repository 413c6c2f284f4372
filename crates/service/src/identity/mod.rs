//! Identity module: three-layer architecture (domain, repository, service).
//!
//! This module centralizes sign-up, sign-in, profile and password business
//! logic, keeping PII encryption and password hashing at this boundary.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::IdentityService;
