//! Error types and result definitions for the LLKV schema bridge.
//!
//! This crate provides the unified error type ([`Error`]) and result type alias
//! ([`Result<T>`]) shared by every crate in the workspace. All operations that
//! could fail return `Result<T>`, where the error variant describes what went
//! wrong.
//!
//! # Error Philosophy
//!
//! A single error enum ([`Error`]) rather than crate-specific error types:
//! - Errors cross crate boundaries with `?` and no conversion glue
//! - The C boundary maps every variant onto one stable error code
//! - Callers can match on specific variants for programmatic handling
//!
//! # Error Categories
//!
//! - **Encoding errors** ([`Error::InvalidEncoding`]): name buffers that are not UTF-8
//! - **Malformed input** ([`Error::InvalidInput`]): null pointers, bad kind codes, bad projections
//! - **Resource ceilings** ([`Error::LimitExceeded`]): counts above the configured maximum
//! - **Handle errors** ([`Error::UnknownHandle`], [`Error::KindMismatch`]): dead or mistyped ids
//! - **Type errors** ([`Error::Arrow`]): Arrow rejected a type definition
//! - **Lookup failures** ([`Error::NotFound`]): missing columns
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
