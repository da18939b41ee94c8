//! Extraction steps.
//!
//! A [`Parser`] is one unit of extraction work: it receives the query
//! cursor and the output accumulated so far and returns the updated output.
//! Parsers also hold the named parameters pushed into them by the
//! [`Scrapy`](crate::Scrapy) pipeline.
//!
//! Closures become parsers through [`FunctionParser`]. The closure receives
//! the parser's parameters as an explicit argument instead of reaching for
//! an implicit `self`.

use std::fmt;

use serde_json::{Map, Value};

use crate::crawly::Crawly;
use crate::error::Result;

/// Accumulated scraping result.
pub type Output = Map<String, Value>;

/// Named parameters shared by the pipeline with all of its parsers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the parameter `key`, if it is set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Whether `key` is set to a non-null value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets a parameter, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying JSON map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A single extraction step of a scraping pipeline.
///
/// Implementors keep a [`Params`] value and expose it through
/// [`Parser::params`] / [`Parser::set_params`]; the pipeline replaces it
/// wholesale whenever its own parameters change.
///
/// ```rust
/// use rs_scrapy::{Crawly, Output, Params, Parser, Result};
///
/// #[derive(Default)]
/// struct Heading {
///     params: Params,
/// }
///
/// impl Parser for Heading {
///     fn process(&self, crawly: &mut Crawly, mut output: Output) -> Result<Output> {
///         output.insert("heading".into(), crawly.filter("h1").first().string().into());
///         Ok(output)
///     }
///
///     fn params(&self) -> &Params {
///         &self.params
///     }
///
///     fn set_params(&mut self, params: Params) {
///         self.params = params;
///     }
/// }
/// ```
pub trait Parser: Send {
    /// Processes the document and returns the new output.
    ///
    /// The cursor is only valid for the duration of the call.
    ///
    /// # Errors
    ///
    /// An error marks this step as failed. The pipeline records it, keeps
    /// the output from before the call, and moves on to the next parser.
    fn process(&self, crawly: &mut Crawly, output: Output) -> Result<Output>;

    /// Parameters currently injected into this parser.
    fn params(&self) -> &Params;

    /// Replaces the injected parameters.
    fn set_params(&mut self, params: Params);

    /// Name used when recording failures.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Value of the parameter `key`, if it is set.
    fn param(&self, key: &str) -> Option<&Value> {
        self.params().get(key)
    }

    /// Whether the parameter `key` is set.
    fn has(&self, key: &str) -> bool {
        self.params().has(key)
    }
}

/// Callback wrapped by a [`FunctionParser`].
pub type ParserFn = Box<dyn Fn(&mut Crawly, Output, &Params) -> Result<Output> + Send>;

/// Parser backed by a closure.
pub struct FunctionParser {
    callback: Option<ParserFn>,
    params: Params,
    name: String,
}

impl FunctionParser {
    /// Wraps `callback` as a parser.
    ///
    /// The callback gets the parser's current parameters as its last
    /// argument.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut Crawly, Output, &Params) -> Result<Output> + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            params: Params::default(),
            name: "FunctionParser".to_string(),
        }
    }

    /// A parser without a callback; it returns the output unchanged.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            callback: None,
            params: Params::default(),
            name: "FunctionParser".to_string(),
        }
    }

    /// Sets the initial parameters.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets the name used in failure records.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Parser for FunctionParser {
    fn process(&self, crawly: &mut Crawly, output: Output) -> Result<Output> {
        match &self.callback {
            Some(callback) => callback(crawly, output, &self.params),
            None => Ok(output),
        }
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for FunctionParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionParser")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("callable", &self.callback.is_some())
            .finish()
    }
}

/// The ways a parser can be registered with a pipeline.
///
/// Resolved into a boxed parser once, at registration time.
pub enum ParserEntry {
    /// An already built parser.
    Instance(Box<dyn Parser>),
    /// A parser type, constructed on registration.
    Type(fn() -> Box<dyn Parser>),
    /// A closure, wrapped into a [`FunctionParser`].
    Function(ParserFn),
}

impl ParserEntry {
    /// Registers a parser type by its `Default` constructor.
    #[must_use]
    pub fn of<P: Parser + Default + 'static>() -> Self {
        Self::Type(boxed_default::<P>)
    }

    /// Registers a closure.
    pub fn function<F>(callback: F) -> Self
    where
        F: Fn(&mut Crawly, Output, &Params) -> Result<Output> + Send + 'static,
    {
        Self::Function(Box::new(callback))
    }

    /// Builds the parser this entry describes.
    #[must_use]
    pub fn resolve(self) -> Box<dyn Parser> {
        match self {
            Self::Instance(parser) => parser,
            Self::Type(make) => make(),
            Self::Function(callback) => Box::new(FunctionParser {
                callback: Some(callback),
                params: Params::default(),
                name: "FunctionParser".to_string(),
            }),
        }
    }
}

fn boxed_default<P: Parser + Default + 'static>() -> Box<dyn Parser> {
    Box::new(P::default())
}

impl<P: Parser + 'static> From<P> for ParserEntry {
    fn from(parser: P) -> Self {
        Self::Instance(Box::new(parser))
    }
}

impl From<Box<dyn Parser>> for ParserEntry {
    fn from(parser: Box<dyn Parser>) -> Self {
        Self::Instance(parser)
    }
}
