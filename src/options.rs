//! Request configuration for URL sources.
//!
//! `RequestOptions` controls how a [`UrlSource`](crate::source::UrlSource)
//! performs its transfer. User-agent presets in [`crate::agents`] are just
//! pre-filled values of this struct.

use std::time::Duration;

/// Name of the user agent header.
pub const USER_AGENT: &str = "User-Agent";

/// Configuration of an HTTP transfer.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rs_scrapy::RequestOptions;
///
/// let options = RequestOptions {
///     timeout: Some(Duration::from_secs(5)),
///     ..RequestOptions::default()
/// }
/// .with_user_agent("my-bot/1.0");
///
/// assert_eq!(options.user_agent(), Some("my-bot/1.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Transfer is performed synchronously.
    ///
    /// The URL source only has a blocking transport, so this is informational
    /// for callers inspecting a preset.
    ///
    /// Default: `true`
    pub synchronous: bool,

    /// Extra request headers, sent in order.
    ///
    /// Default: empty
    pub headers: Vec<(String, String)>,

    /// Total time allowed for the request, `None` for no limit.
    ///
    /// Default: 30 seconds
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow.
    ///
    /// Default: `10`
    pub max_redirects: usize,
}

impl RequestOptions {
    /// Sets `name` to `value`, replacing an existing header of that name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(self, agent: impl Into<String>) -> Self {
        self.with_header(USER_AGENT, agent)
    }

    /// Value of the header `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of the `User-Agent` header.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.header(USER_AGENT)
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            synchronous: true,
            headers: Vec::new(),
            timeout: Some(Duration::from_secs(30)),
            max_redirects: 10,
        }
    }
}
