//! psyreport-core — Result model, presentation mapping, and template engine.
//!
//! This crate turns a scored assessment result into report text: the
//! [`view`] module maps results to display values, [`template`] parses
//! report templates, and [`engine`] evaluates one against the other.

pub mod engine;
pub mod error;
pub mod model;
pub mod template;
pub mod view;

pub use error::TemplateError;
