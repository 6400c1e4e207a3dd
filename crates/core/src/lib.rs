//! Core library for formpage
//!
//! This crate implements the **Functional Core** of formpage: everything
//! between raw template text and positioned pages, with zero I/O.
//!
//! # Architecture Overview
//!
//! - **`formpage_core`** (this crate): pure transformation functions
//! - **`formpage_render`**: text measurement and drawing (the rendering collaborator)
//! - **`formpage`**: file I/O, configuration and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: same input, same output
//! - **No shared state**: configuration is passed in, never read from globals
//! - **Injected measurement**: pagination asks a [`pagination::Measure`]
//!   implementation for heights, so tests use a deterministic fake
//!
//! # Module Organization
//!
//! - [`fields`]: multi-pass detection of fillable blanks in plain text
//! - [`element`]: layout units and their page-break directives
//! - [`pagination`]: assignment of measured elements to pages
//! - [`template`]: merging form values and cutting text into elements
//! - [`audit`]: content digest of the final pages
//! - [`config`]: page geometry and thresholds, loadable from TOML
//!
//! # Example Usage
//!
//! ```rust
//! use formpage_core::element::{ContentElement, TextStyle};
//! use formpage_core::fields::{extract, FieldKind};
//! use formpage_core::pagination::paginate;
//!
//! let fields = extract("Signature: ____\nDate: ____\nAmount: $____");
//! assert_eq!(fields[0].kind, FieldKind::Signature);
//!
//! let fixed = |_: &ContentElement, _: &TextStyle, _: f32| 200.0f32;
//! let elements = vec![
//!     ContentElement::paragraph("one"),
//!     ContentElement::paragraph("two"),
//!     ContentElement::paragraph("three"),
//! ];
//! let result = paginate(&elements, 500.0, &fixed).unwrap();
//! assert_eq!(result.page_count(), 2);
//! ```

pub mod audit;
pub mod config;
pub mod element;
pub mod error;
pub mod fields;
pub mod pagination;
pub mod template;

pub use config::{EngineConfig, ExtractorConfig, LayoutConfig, PageGeometry};
pub use element::{ContentElement, ElementKind, LayoutDirectives, TextStyle};
pub use error::EngineError;
pub use fields::{Extraction, ExtractionWarning, Field, FieldExtractor, FieldKind, SourceSpan};
pub use pagination::{Measure, Page, Pagination, PaginationWarning, Paginator, PlacedElement};
pub use template::FormValues;
