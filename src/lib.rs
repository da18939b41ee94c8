//! # rs-scrapy
//!
//! Structured data extraction from HTML documents.
//!
//! The library has two layers:
//!
//! - [`Crawly`], a fluent query cursor over one parsed document: CSS
//!   filtering, indexing, value coercion with caller defaults, and mapping
//!   over independent sub-documents.
//! - [`Scrapy`], a pipeline that reads HTML from a [`Source`], checks it,
//!   feeds it through an ordered list of [`Parser`]s and accumulates one
//!   JSON output map. A failing parser is recorded and skipped; the others
//!   still contribute.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_scrapy::{Error, ScrapyBuilder};
//!
//! let mut scrapy = ScrapyBuilder::make()
//!     .html("<div><h1>Hello</h1><h2>World</h2></div>")
//!     .function(|crawly, mut output, _| {
//!         output.insert("first".into(), crawly.filter("h1").string().into());
//!         Ok(output)
//!     })
//!     .function(|crawly, mut output, _| {
//!         output.insert("second".into(), crawly.filter("h2").string().into());
//!         Ok(output)
//!     })
//!     .function(|crawly, output, _| {
//!         crawly.filter("h3").require()?;
//!         Ok(output)
//!     })
//!     .build();
//!
//! let output = scrapy.scrape()?;
//! assert_eq!(output["first"], "Hello");
//! assert_eq!(output["second"], "World");
//! assert!(scrapy.failed());
//! # Ok::<(), Error>(())
//! ```
//!
//! ## Logging
//!
//! Sources and the pipeline emit `tracing` events. No subscriber is
//! installed by the library.

mod builder;
mod error;
mod options;
mod scrapy;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Character encoding detection for raw source bodies.
pub mod encoding;

/// Query engine over one parsed document.
pub mod crawly;

/// Extraction steps and their parameters.
pub mod parser;

/// HTML sources: null, literal string, file and URL.
pub mod source;

/// User agent presets for URL sources.
#[cfg(feature = "http")]
pub mod agents;

// Public API - re-exports
pub use builder::ScrapyBuilder;
pub use crawly::{Crawly, NODE_NAME, NODE_TEXT};
pub use error::{Error, Result, StepError};
pub use options::RequestOptions;
pub use parser::{FunctionParser, Output, Params, Parser, ParserEntry};
pub use scrapy::{AfterHook, BeforeHook, FailHook, ParserErrorHook, Scrapy, Validator};
#[cfg(feature = "http")]
pub use source::UrlSource;
pub use source::{FileSource, NullSource, Source, StringSource};
