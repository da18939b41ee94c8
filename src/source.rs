//! Sources supplying the raw HTML of a scrape.
//!
//! A [`Source`] is anything with a blocking `read() -> String`. Failures are
//! reported as [`Error::SourceUnavailable`] naming the path or URL.

#[cfg(feature = "http")]
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::encoding;
use crate::error::{Error, Result};
#[cfg(feature = "http")]
use crate::options::RequestOptions;

/// Supplies the HTML to be scraped.
pub trait Source: Send {
    /// Reads the whole source into a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] when the resource cannot be read.
    fn read(&self) -> Result<String>;

    /// Path, URL or other identification of the source.
    fn locator(&self) -> &str;
}

/// Source that is always empty. Used when nothing else is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSource;

impl Source for NullSource {
    fn read(&self) -> Result<String> {
        Ok(String::new())
    }

    fn locator(&self) -> &str {
        "null"
    }
}

/// Source returning a fixed string.
#[derive(Debug, Clone, Default)]
pub struct StringSource {
    html: String,
}

impl StringSource {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

impl Source for StringSource {
    fn read(&self) -> Result<String> {
        Ok(self.html.clone())
    }

    fn locator(&self) -> &str {
        "string"
    }
}

/// Source reading a file from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    locator: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            locator: path.display().to_string(),
            path,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn read(&self) -> Result<String> {
        debug!(path = %self.locator, "reading file source");

        let bytes = std::fs::read(&self.path).map_err(|err| {
            let code = match err.kind() {
                io::ErrorKind::NotFound => 404,
                io::ErrorKind::PermissionDenied => 403,
                _ => 500,
            };
            Error::SourceUnavailable {
                locator: self.locator.clone(),
                reason: err.to_string(),
                code,
            }
        })?;

        Ok(encoding::decode(&bytes, None))
    }

    fn locator(&self) -> &str {
        &self.locator
    }
}

/// Source fetching a URL with a blocking HTTP GET.
///
/// Redirects are followed up to [`RequestOptions::max_redirects`]. 4xx and
/// 5xx responses fail with the status as code; transport failures use 503.
/// The body is decoded using the response's `Content-Type` charset or the
/// document's `<meta>` declaration.
#[cfg(feature = "http")]
#[derive(Clone)]
pub struct UrlSource {
    url: String,
    options: RequestOptions,
}

#[cfg(feature = "http")]
impl UrlSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_options(url, RequestOptions::default())
    }

    pub fn with_options(url: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            url: url.into(),
            options,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RequestOptions) {
        self.options = options;
    }

    fn unavailable(&self, reason: impl fmt::Display, code: u16) -> Error {
        Error::SourceUnavailable {
            locator: self.url.clone(),
            reason: reason.to_string(),
            code,
        }
    }

    fn client(&self) -> Result<reqwest::blocking::Client> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        let mut headers = HeaderMap::new();
        for (name, value) in &self.options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| self.unavailable(format!("invalid header name: {err}"), 400))?;
            let value = HeaderValue::from_bytes(value.as_bytes())
                .map_err(|err| self.unavailable(format!("invalid header value: {err}"), 400))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(self.options.max_redirects));
        if let Some(timeout) = self.options.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|err| self.unavailable(err, 500))
    }
}

#[cfg(feature = "http")]
impl Source for UrlSource {
    fn read(&self) -> Result<String> {
        debug!(url = %self.url, "reading url source");

        let url = url::Url::parse(&self.url).map_err(|err| self.unavailable(err, 400))?;
        let response = self
            .client()?
            .get(url)
            .send()
            .map_err(|err| self.unavailable(&err, err.status().map_or(503, |s| s.as_u16())))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(self.unavailable(format!("HTTP {status}"), status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().map_err(|err| self.unavailable(err, 503))?;

        Ok(encoding::decode(&body, content_type.as_deref()))
    }

    fn locator(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "http")]
impl fmt::Debug for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlSource")
            .field("url", &self.url)
            .field("options", &self.options)
            .finish()
    }
}
