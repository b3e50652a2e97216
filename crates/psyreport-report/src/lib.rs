//! psyreport-report — Report rendering facade.
//!
//! Ties the template store, the presentation mapper, and the template engine
//! together behind [`ReportRenderer::render`].

pub mod html;
pub mod renderer;

pub use renderer::{Clock, FixedClock, RenderError, ReportRenderer, SystemClock};
