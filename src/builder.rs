//! Fluent construction of a [`Scrapy`] pipeline.
//!
//! ```rust
//! use rs_scrapy::ScrapyBuilder;
//!
//! let mut scrapy = ScrapyBuilder::make()
//!     .html("<div><h1>Hello</h1></div>")
//!     .function(|crawly, mut output, _| {
//!         output.insert("heading".into(), crawly.filter("h1").string().into());
//!         Ok(output)
//!     })
//!     .build();
//!
//! let output = scrapy.scrape()?;
//! assert_eq!(output["heading"], "Hello");
//! # Ok::<(), rs_scrapy::Error>(())
//! ```

use std::path::Path;

#[cfg(feature = "http")]
use crate::agents::UserAgent;
use crate::crawly::Crawly;
use crate::error::{Result, StepError};
use crate::parser::{Output, Params, Parser, ParserEntry};
use crate::scrapy::Scrapy;
#[cfg(feature = "http")]
use crate::source::UrlSource;
use crate::source::{FileSource, Source, StringSource};

/// Builder for [`Scrapy`].
///
/// The source is resolved at [`ScrapyBuilder::build`]: an explicit source
/// wins, then a URL (fetched through the agent, if one is set). An agent
/// without a URL leaves the null source in place.
#[derive(Default)]
pub struct ScrapyBuilder {
    scrapy: Scrapy,
    explicit_source: bool,
    #[cfg(feature = "http")]
    agent: Option<Box<dyn UserAgent>>,
    #[cfg(feature = "http")]
    url: Option<String>,
}

impl ScrapyBuilder {
    #[must_use]
    pub fn make() -> Self {
        Self::default()
    }

    /// Discards everything configured so far.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::default()
    }

    #[must_use]
    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.scrapy.set_params(params);
        self
    }

    #[must_use]
    pub fn parser(mut self, parser: impl Into<ParserEntry>) -> Self {
        self.scrapy.add_parser(parser);
        self
    }

    #[must_use]
    pub fn parsers<I, P>(mut self, parsers: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParserEntry>,
    {
        for parser in parsers {
            self.scrapy.add_parser(parser);
        }
        self
    }

    /// Registers a parser type through its `Default` constructor.
    #[must_use]
    pub fn parser_type<P: Parser + Default + 'static>(self) -> Self {
        self.parser(ParserEntry::of::<P>())
    }

    /// Registers a closure as a parser.
    #[must_use]
    pub fn function<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Crawly, Output, &Params) -> Result<Output> + Send + 'static,
    {
        self.parser(ParserEntry::function(callback))
    }

    #[must_use]
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.scrapy.set_source(source);
        self.explicit_source = true;
        self
    }

    /// Scrapes a literal HTML string.
    #[must_use]
    pub fn html(self, html: impl Into<String>) -> Self {
        self.source(StringSource::new(html))
    }

    /// Scrapes a file.
    #[must_use]
    pub fn file(self, path: impl AsRef<Path>) -> Self {
        self.source(FileSource::new(path))
    }

    /// Scrapes a URL.
    #[cfg(feature = "http")]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Fetches the URL as this user agent.
    #[cfg(feature = "http")]
    #[must_use]
    pub fn agent(mut self, agent: impl UserAgent + 'static) -> Self {
        self.agent = Some(Box::new(agent));
        self
    }

    #[must_use]
    pub fn html_checker<F>(mut self, checker: F) -> Self
    where
        F: Fn(&mut Crawly) -> bool + Send + 'static,
    {
        self.scrapy.set_html_checker(checker);
        self
    }

    #[must_use]
    pub fn before_scrape<F>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> String + Send + 'static,
    {
        self.scrapy.set_before_scrape(hook);
        self
    }

    #[must_use]
    pub fn after_scrape<F>(mut self, hook: F) -> Self
    where
        F: Fn(Output) -> Output + Send + 'static,
    {
        self.scrapy.set_after_scrape(hook);
        self
    }

    #[must_use]
    pub fn on_parser_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Parser, &StepError) + Send + 'static,
    {
        self.scrapy.set_on_parser_error(hook);
        self
    }

    #[must_use]
    pub fn on_fail<F>(mut self, hook: F) -> Self
    where
        F: Fn(Output, &[StepError]) -> Output + Send + 'static,
    {
        self.scrapy.set_on_fail(hook);
        self
    }

    #[must_use]
    pub fn build(mut self) -> Scrapy {
        if !self.explicit_source {
            self.resolve_url_source();
        }
        self.scrapy
    }

    #[cfg(feature = "http")]
    fn resolve_url_source(&mut self) {
        if let Some(url) = self.url.take() {
            let source = match &self.agent {
                Some(agent) => agent.source(&url),
                None => UrlSource::new(url),
            };
            self.scrapy.set_source(source);
        }
    }

    #[cfg(not(feature = "http"))]
    fn resolve_url_source(&mut self) {}
}
