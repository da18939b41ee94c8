//! User agent presets.
//!
//! Each preset turns a URL into a [`UrlSource`] that identifies itself with a
//! fixed `User-Agent` header and performs a synchronous transfer.

use crate::options::RequestOptions;
use crate::source::UrlSource;

/// Googlebot user agent string.
pub const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Bingbot user agent string.
pub const BINGBOT: &str = "Mozilla/5.0 (compatible; Bingbot/2.0; +http://www.bing.com/bingbot.htm)";

/// DuckDuckBot user agent string.
pub const DUCKDUCKBOT: &str = "DuckDuckBot/1.0; (+http://duckduckgo.com/duckduckbot.html)";

/// Yahoo! Slurp user agent string.
pub const YAHOO_SLURP: &str =
    "Mozilla/5.0 (compatible; Yahoo! Slurp; http://help.yahoo.com/help/us/ysearch/slurp)";

/// Emulation of a crawler's user agent.
pub trait UserAgent {
    /// Request configuration identifying this agent.
    fn options(&self) -> RequestOptions;

    /// URL source for `url` that behaves as this agent.
    fn source(&self, url: &str) -> UrlSource {
        UrlSource::with_options(url, self.options())
    }
}

fn preset(agent: &str) -> RequestOptions {
    RequestOptions {
        synchronous: true,
        ..RequestOptions::default()
    }
    .with_user_agent(agent)
}

/// Googlebot.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleAgent;

impl UserAgent for GoogleAgent {
    fn options(&self) -> RequestOptions {
        preset(GOOGLEBOT)
    }
}

/// Googlebot rendering with an evergreen Chrome of the given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoogleChromeAgent {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub patch: u32,
}

impl GoogleChromeAgent {
    #[must_use]
    pub fn new(major: u32, minor: u32, build: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            build,
            patch,
        }
    }

    /// The full user agent string for this Chrome version.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!(
            "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; Googlebot/2.1; \
             +http://www.google.com/bot.html) Chrome/{}.{}.{}.{} Safari/537.36",
            self.major, self.minor, self.build, self.patch
        )
    }
}

impl UserAgent for GoogleChromeAgent {
    fn options(&self) -> RequestOptions {
        preset(&self.user_agent())
    }
}

/// Bingbot.
#[derive(Debug, Clone, Copy, Default)]
pub struct BingAgent;

impl UserAgent for BingAgent {
    fn options(&self) -> RequestOptions {
        preset(BINGBOT)
    }
}

/// DuckDuckBot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckAgent;

impl UserAgent for DuckAgent {
    fn options(&self) -> RequestOptions {
        preset(DUCKDUCKBOT)
    }
}

/// Yahoo! Slurp.
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooAgent;

impl UserAgent for YahooAgent {
    fn options(&self) -> RequestOptions {
        preset(YAHOO_SLURP)
    }
}
