//! Core types and pure logic for the CannaFlow compliance engine.
//!
//! This crate holds the jurisdiction rule table, the log entry model, the
//! sale validator and the report aggregator. It performs no I/O; storage
//! backends implement [`store::LogStore`] and the engine crate wires the
//! pieces together.

pub mod error;
pub mod jurisdiction;
pub mod limits;
pub mod log;
pub mod report;
pub mod settings;
pub mod store;
pub mod validate;
pub mod value;

pub use error::{Error, Result};
