//! Fluent query engine over one parsed HTML document.
//!
//! A [`Crawly`] owns a parsed document and a cursor: the currently active
//! node-set plus a trim flag. Narrowing methods (`filter`, `first`, `nth`)
//! mutate the cursor and return `&mut Self` for chaining; read methods
//! (`string`, `int`, `html`, `pluck`, ...) never change it.
//!
//! Read methods never fail. Absence of a selection, a selector that does not
//! parse, or a value that cannot be coerced all degrade to the caller's
//! default. The only way to turn absence into an error is [`Crawly::require`].
//!
//! ```rust
//! use rs_scrapy::Crawly;
//!
//! let mut crawly = Crawly::new("<ul><li>1</li><li>2</li><li>3</li></ul>");
//! assert_eq!(crawly.filter("li").count(), 3);
//! assert_eq!(crawly.filter("li").nth(2).int(), 3);
//! assert_eq!(crawly.filter("li").nth(9).int_or(-1), -1);
//! ```

use std::fmt;

use dom_query::NodeId;
use tracing::trace;

use crate::dom::{self, Document, NodeRef, Selection};
use crate::error::{Error, Result};

/// Pseudo-attribute for [`Crawly::pluck`] returning the node's text.
pub const NODE_TEXT: &str = "_text";

/// Pseudo-attribute for [`Crawly::pluck`] returning the node's tag name.
pub const NODE_NAME: &str = "_name";

/// Query cursor over a parsed HTML document.
pub struct Crawly {
    document: Document,
    html: String,
    /// Whole-document scope, restored by `reset`.
    root: Vec<NodeId>,
    active: Vec<NodeId>,
    /// Context element a sub-document was parsed into; filters stay inside it.
    scope: Option<NodeId>,
    trim: bool,
}

impl Crawly {
    /// Parses `html` and scopes the cursor to the whole document.
    ///
    /// Empty input gives an empty cursor. Input without any markup is
    /// wrapped into `<body>` first, so plain text can be read without a
    /// selector. Plain text reads back verbatim: `"AT&amp;T"` stays
    /// `"AT&amp;T"` rather than being decoded as a character reference.
    #[must_use]
    pub fn new(html: &str) -> Self {
        let (document, root) = if html.is_empty() {
            (dom::parse(""), Vec::new())
        } else if dom::is_markup(html) {
            let document = dom::parse(html);
            let root = ids(&document.select("html"));
            (document, root)
        } else {
            let document = dom::parse(&dom::wrap_text(html));
            let root = ids(&document.select("body"));
            (document, root)
        };

        Self {
            document,
            html: html.to_string(),
            active: root.clone(),
            root,
            scope: None,
            trim: false,
        }
    }

    /// Builds the cursor for one node's children, as `map` hands them out.
    ///
    /// Table rows, sections and `<select>` options only survive parsing
    /// inside their parent element, so those children are parsed inside a
    /// copy of it and the cursor is confined to that copy.
    fn sub_document(inner: &str, parent: &str) -> Self {
        let Some((open, close)) = dom::context_wrapper(parent) else {
            return Self::new(inner);
        };

        let document = dom::parse(&format!("{open}{inner}{close}"));
        let scope = document.select(parent).nodes().first().map(|node| node.id);
        let root: Vec<NodeId> = scope.into_iter().collect();

        Self {
            document,
            html: inner.to_string(),
            active: root.clone(),
            root,
            scope,
            trim: false,
        }
    }

    /// HTML this engine was built from.
    #[must_use]
    pub fn source_html(&self) -> &str {
        &self.html
    }

    // === Narrowing ===

    /// Replaces the active node-set with every node of the document
    /// matching `selector`.
    ///
    /// Filtering always starts from the document root: two calls in a row
    /// are two independent queries, not an intersection. Inside a `map`
    /// sub-document of a table-family node the root is that node.
    pub fn filter(&mut self, selector: &str) -> &mut Self {
        let matched = match self.scope {
            _ if self.root.is_empty() => None,
            Some(scope) => {
                Selection::from(NodeRef::new(scope, &self.document.tree)).try_select(selector)
            }
            None => self.document.try_select(selector),
        };

        self.active = if let Some(sel) = matched {
            ids(&sel)
        } else {
            trace!(selector, "selector is invalid or matched nothing");
            Vec::new()
        };
        self
    }

    /// Narrows the active node-set to its first node.
    pub fn first(&mut self) -> &mut Self {
        self.active.truncate(1);
        self
    }

    /// Narrows the active node-set to the node at `position` (0-based).
    ///
    /// Out of range positions leave the cursor empty.
    pub fn nth(&mut self, position: usize) -> &mut Self {
        self.active = self.active.get(position).copied().into_iter().collect();
        self
    }

    /// Collapse whitespace in every following string read.
    pub fn trim(&mut self) -> &mut Self {
        self.trim = true;
        self
    }

    /// Restores the whole-document scope and clears the trim flag.
    pub fn reset(&mut self) {
        self.active.clone_from(&self.root);
        self.trim = false;
    }

    // === Reading ===

    /// Number of nodes in the active node-set.
    #[must_use]
    pub fn count(&self) -> usize {
        self.active.len()
    }

    /// Text of the active node-set, or `""` when it is empty.
    #[must_use]
    pub fn string(&self) -> String {
        self.string_or("")
    }

    /// Text of the active node-set, or `default` when it is empty.
    ///
    /// The text of all matched nodes is concatenated. With [`Crawly::trim`]
    /// set, whitespace runs collapse to one space and both ends are stripped.
    #[must_use]
    pub fn string_or(&self, default: &str) -> String {
        if self.active.is_empty() {
            return default.to_string();
        }

        let text = dom::text_content(&self.selection());
        if self.trim {
            dom::collapse_whitespace(&text)
        } else {
            text.to_string()
        }
    }

    /// Integer value of the selection, `0` when not numeric.
    #[must_use]
    pub fn int(&self) -> i64 {
        self.int_or(0)
    }

    /// Integer value of the selection, `default` when not numeric.
    ///
    /// Decimal values are truncated toward zero: `"15.25"` reads as `15`.
    #[must_use]
    pub fn int_or(&self, default: i64) -> i64 {
        let text = self.string();
        let text = text.trim();
        if let Ok(value) = text.parse::<i64>() {
            return value;
        }
        numeric(text).map_or(default, |value| value.trunc() as i64)
    }

    /// Float value of the selection, `0.0` when not numeric.
    #[must_use]
    pub fn float(&self) -> f64 {
        self.float_or(0.0)
    }

    /// Float value of the selection, `default` when not numeric.
    #[must_use]
    pub fn float_or(&self, default: f64) -> f64 {
        numeric(self.string().trim()).unwrap_or(default)
    }

    /// Outer HTML of the first active node, or `""`.
    #[must_use]
    pub fn html(&self) -> String {
        self.html_or("")
    }

    /// Outer HTML of the first active node, or `default`.
    #[must_use]
    pub fn html_or(&self, default: &str) -> String {
        if self.active.is_empty() {
            return default.to_string();
        }
        dom::outer_html(&self.selection()).to_string()
    }

    /// HTML of the first active node's children, or `""`.
    #[must_use]
    pub fn inner_html(&self) -> String {
        self.inner_html_or("")
    }

    /// HTML of the first active node's children, or `default`.
    #[must_use]
    pub fn inner_html_or(&self, default: &str) -> String {
        if self.active.is_empty() {
            return default.to_string();
        }
        dom::inner_html(&self.selection()).to_string()
    }

    /// Whether the active node-set yields any text.
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.active.is_empty() && !dom::text_content(&self.selection()).is_empty()
    }

    /// Like [`Crawly::exists`], but absence is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectionNotFound`] when the selection yields no text.
    pub fn require(&mut self) -> Result<&mut Self> {
        if self.exists() {
            Ok(self)
        } else {
            Err(Error::SelectionNotFound)
        }
    }

    /// Value of one attribute of the first active node.
    ///
    /// [`NODE_TEXT`] and [`NODE_NAME`] read the node's text and tag name.
    #[must_use]
    pub fn pluck(&self, attribute: &str) -> Option<String> {
        let first = dom::first(&self.selection());
        if first.is_empty() {
            return None;
        }

        match attribute {
            NODE_TEXT => Some(dom::text_content(&first).to_string()),
            NODE_NAME => dom::tag_name(&first),
            name => dom::get_attribute(&first, name),
        }
    }

    /// Values of several attributes of the first active node, in order.
    ///
    /// Missing attributes read as `""`. Empty when nothing is selected.
    #[must_use]
    pub fn pluck_all(&self, attributes: &[&str]) -> Vec<String> {
        if self.active.is_empty() {
            return Vec::new();
        }
        attributes
            .iter()
            .map(|attribute| self.pluck(attribute).unwrap_or_default())
            .collect()
    }

    // === Sub-documents ===

    /// Calls `f` with an independent cursor for each active node.
    ///
    /// See [`Crawly::map_limit`].
    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: FnMut(&mut Crawly, usize) -> Option<T>,
    {
        self.map_limit(self.count(), f)
    }

    /// Calls `f` exactly `limit` times, with a fresh cursor built from the
    /// inner HTML of the node at each index, and keeps the `Some` results.
    ///
    /// Indices past the last active node still get a call, with a cursor
    /// built from the empty string. Children of table-family nodes keep
    /// their structure: mapping over `tr` yields cursors whose `td` cells
    /// can be filtered.
    pub fn map_limit<T, F>(&self, limit: usize, mut f: F) -> Vec<T>
    where
        F: FnMut(&mut Crawly, usize) -> Option<T>,
    {
        let selection = self.selection();
        let nodes = selection.nodes();

        (0..limit)
            .filter_map(|index| {
                let mut sub = match nodes.get(index) {
                    Some(node) => {
                        let node = Selection::from(*node);
                        let tag = dom::tag_name(&node).unwrap_or_default();
                        Crawly::sub_document(&dom::inner_html(&node), &tag)
                    }
                    None => Crawly::new(""),
                };
                f(&mut sub, index)
            })
            .collect()
    }

    // === Escape hatches ===

    /// First raw node of the active node-set.
    #[must_use]
    pub fn node(&self) -> Option<NodeRef<'_>> {
        self.active
            .first()
            .map(|id| NodeRef::new(*id, &self.document.tree))
    }

    /// The active node-set as a `dom_query` selection.
    #[must_use]
    pub fn raw(&self) -> Selection<'_> {
        self.selection()
    }

    fn selection(&self) -> Selection<'_> {
        let nodes: Vec<NodeRef<'_>> = self
            .active
            .iter()
            .map(|id| NodeRef::new(*id, &self.document.tree))
            .collect();
        Selection::from(nodes)
    }
}

impl From<&str> for Crawly {
    fn from(html: &str) -> Self {
        Self::new(html)
    }
}

impl fmt::Debug for Crawly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crawly")
            .field("html_len", &self.html.len())
            .field("count", &self.active.len())
            .field("trim", &self.trim)
            .finish_non_exhaustive()
    }
}

fn ids(sel: &Selection) -> Vec<NodeId> {
    sel.nodes().iter().map(|node| node.id).collect()
}

/// Parses a numeric literal: optional sign, digits, fraction, exponent.
///
/// Rejects the words Rust's float parser accepts (`inf`, `NaN`).
fn numeric(text: &str) -> Option<f64> {
    let literal = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !literal {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}
