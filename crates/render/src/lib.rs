//! Rendering side of formpage.
//!
//! The core crate decides *where* elements go; this crate decides how big
//! they are and how they look. [`TextMeasurer`] plugs into the paginator as
//! its measurement function, and the same wrapping drives both the plain-text
//! preview and the PDF output, so what was measured is what gets drawn.

use thiserror::Error;

pub mod measure;
pub mod metrics;
pub mod pdf;
pub mod text;
pub mod wrap;

pub use measure::TextMeasurer;
pub use metrics::Font;
pub use pdf::render_pdf;
pub use text::render_pages;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
