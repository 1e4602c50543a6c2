//! Foundation - shared domain building blocks.

mod errors;

pub use errors::DomainError;
