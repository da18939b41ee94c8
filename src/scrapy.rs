//! Scraping pipeline.
//!
//! [`Scrapy`] wires a [`Source`], an ordered list of [`Parser`]s and a set
//! of optional hooks into one pass:
//!
//! 1. read the source (failure aborts the run)
//! 2. run the validity checker (rejection aborts the run)
//! 3. let the before hook rewrite the HTML
//! 4. run every parser in registration order on a freshly reset cursor;
//!    a failing parser is recorded and skipped, the others still run
//! 5. let the after hook rewrite the output
//! 6. if any parser failed, let the fail hook rewrite the output
//!
//! `scrape` takes `&mut self`, so a pipeline cannot be run twice at the same
//! time. Configuration is left intact between runs; the html, result and
//! error list describe the latest run only.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::crawly::Crawly;
use crate::error::{Error, Result, StepError};
use crate::parser::{Output, Params, Parser, ParserEntry};
use crate::source::{NullSource, Source};

/// Decides whether fetched HTML is worth scraping.
pub type Validator = Box<dyn Fn(&mut Crawly) -> bool + Send>;

/// Rewrites the raw HTML before parsing.
pub type BeforeHook = Box<dyn Fn(String) -> String + Send>;

/// Rewrites the accumulated output.
pub type AfterHook = Box<dyn Fn(Output) -> Output + Send>;

/// Notified of every failing parser.
pub type ParserErrorHook = Box<dyn Fn(&dyn Parser, &StepError) + Send>;

/// Rewrites the output of a run in which some parser failed.
pub type FailHook = Box<dyn Fn(Output, &[StepError]) -> Output + Send>;

/// Scraping pipeline: one source, ordered parsers, optional hooks.
pub struct Scrapy {
    source: Box<dyn Source>,
    parsers: Vec<Box<dyn Parser>>,
    params: Params,
    validator: Option<Validator>,
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
    on_parser_error: Option<ParserErrorHook>,
    on_fail: Option<FailHook>,
    html: String,
    result: Output,
    errors: Vec<StepError>,
}

impl Scrapy {
    /// Empty pipeline: null source, no parsers, no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: Box::new(NullSource),
            parsers: Vec::new(),
            params: Params::default(),
            validator: None,
            before: None,
            after: None,
            on_parser_error: None,
            on_fail: None,
            html: String::new(),
            result: Output::new(),
            errors: Vec::new(),
        }
    }

    /// Runs the pipeline once and returns the accumulated output.
    ///
    /// Parser failures do not fail the run; inspect [`Scrapy::errors`] or
    /// [`Scrapy::failed`] afterwards.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceUnavailable`] when the source cannot be read
    /// - [`Error::ValidationFailed`] when the validity checker rejects the HTML
    ///
    /// No parser runs in either case.
    pub fn scrape(&mut self) -> Result<Output> {
        self.errors.clear();
        self.result = Output::new();
        self.html.clear();

        debug!(source = self.source.locator(), parsers = self.parsers.len(), "scrape started");
        self.html = self.source.read()?;

        if let Some(validator) = &self.validator {
            if !validator(&mut Crawly::new(&self.html)) {
                warn!(source = self.source.locator(), "html rejected by validity checker");
                return Err(Error::ValidationFailed);
            }
        }

        if let Some(before) = &self.before {
            self.html = before(std::mem::take(&mut self.html));
        }

        let mut crawly = Crawly::new(&self.html);
        let mut output = Output::new();

        for parser in &self.parsers {
            crawly.reset();
            trace!(parser = parser.name(), "running parser");

            match parser.process(&mut crawly, output.clone()) {
                Ok(next) => output = next,
                Err(err) => {
                    let record = StepError::new(parser.name(), &err);
                    warn!(parser = parser.name(), code = record.code, "parser failed: {err}");
                    if let Some(hook) = &self.on_parser_error {
                        hook(&**parser, &record);
                    }
                    self.errors.push(record);
                }
            }
        }

        if let Some(after) = &self.after {
            output = after(output);
        }

        if !self.errors.is_empty() {
            if let Some(on_fail) = &self.on_fail {
                output = on_fail(output, &self.errors);
            }
        }

        debug!(fields = output.len(), failures = self.errors.len(), "scrape finished");
        self.result.clone_from(&output);
        Ok(output)
    }

    // === Configuration ===

    /// Registers a parser, injecting the current parameters into it.
    pub fn add_parser(&mut self, parser: impl Into<ParserEntry>) {
        let mut parser = parser.into().resolve();
        parser.set_params(self.params.clone());
        self.parsers.push(parser);
    }

    /// Replaces the parameters and pushes them into every registered parser.
    pub fn set_params(&mut self, params: impl Into<Params>) {
        self.params = params.into();
        for parser in &mut self.parsers {
            parser.set_params(self.params.clone());
        }
    }

    pub fn set_source(&mut self, source: impl Source + 'static) {
        self.source = Box::new(source);
    }

    pub fn set_boxed_source(&mut self, source: Box<dyn Source>) {
        self.source = source;
    }

    pub fn set_html_checker<F>(&mut self, checker: F)
    where
        F: Fn(&mut Crawly) -> bool + Send + 'static,
    {
        self.validator = Some(Box::new(checker));
    }

    pub fn set_before_scrape<F>(&mut self, hook: F)
    where
        F: Fn(String) -> String + Send + 'static,
    {
        self.before = Some(Box::new(hook));
    }

    pub fn set_after_scrape<F>(&mut self, hook: F)
    where
        F: Fn(Output) -> Output + Send + 'static,
    {
        self.after = Some(Box::new(hook));
    }

    pub fn set_on_parser_error<F>(&mut self, hook: F)
    where
        F: Fn(&dyn Parser, &StepError) + Send + 'static,
    {
        self.on_parser_error = Some(Box::new(hook));
    }

    pub fn set_on_fail<F>(&mut self, hook: F)
    where
        F: Fn(Output, &[StepError]) -> Output + Send + 'static,
    {
        self.on_fail = Some(Box::new(hook));
    }

    // === Accessors ===

    #[must_use]
    pub fn parsers(&self) -> &[Box<dyn Parser>] {
        &self.parsers
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[must_use]
    pub fn source(&self) -> &dyn Source {
        self.source.as_ref()
    }

    #[must_use]
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// HTML of the latest run, after the before hook.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Output of the latest successful run.
    #[must_use]
    pub fn result(&self) -> &Output {
        &self.result
    }

    /// Parser failures of the latest run.
    #[must_use]
    pub fn errors(&self) -> &[StepError] {
        &self.errors
    }

    /// Whether any parser failed in the latest run.
    #[must_use]
    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for Scrapy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scrapy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parsers: Vec<&str> = self.parsers.iter().map(|p| p.name()).collect();
        f.debug_struct("Scrapy")
            .field("source", &self.source.locator())
            .field("parsers", &parsers)
            .field("params", &self.params)
            .field("validator", &self.validator.is_some())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("on_parser_error", &self.on_parser_error.is_some())
            .field("on_fail", &self.on_fail.is_some())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
