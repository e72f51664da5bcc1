//! Typed query interface over a fetched HTML page.
//!
//! Wraps `scraper::Html` so detectors ask for "elements by tag",
//! "attribute value" and "text content" instead of walking the DOM
//! themselves. `scraper` types are `!Send`, so a [`PageDocument`] is built
//! after the last await point of acquisition and only read synchronously.

use scraper::{ElementRef, Html, Selector};

/// A document query could not be expressed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct QueryError {
    pub selector: String,
    pub reason: String,
}

/// Parsed page plus its lower-cased body text.
pub struct PageDocument {
    html: Html,
    raw_text: String,
}

impl std::fmt::Debug for PageDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageDocument")
            .field("raw_text_len", &self.raw_text.len())
            .finish()
    }
}

/// A single element of a [`PageDocument`].
#[derive(Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub fn tag(&self) -> &'a str {
        self.inner.value().name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.inner.text().collect()
    }
}

impl PageDocument {
    /// Parse an HTML body. Parsing is lenient and never fails.
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
            raw_text: body.to_lowercase(),
        }
    }

    /// Full response body, lower-cased, for substring checks.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// All elements with the given tag name, in document order.
    pub fn elements(&self, tag: &str) -> Result<Vec<Element<'_>>, QueryError> {
        let selector = selector(tag)?;
        Ok(self
            .html
            .select(&selector)
            .map(|inner| Element { inner })
            .collect())
    }

    /// Elements with tag `tag` nested inside any `scope` element.
    pub fn elements_within(&self, scope: &str, tag: &str) -> Result<Vec<Element<'_>>, QueryError> {
        let scope_sel = selector(scope)?;
        let tag_sel = selector(tag)?;
        Ok(self
            .html
            .select(&scope_sel)
            .flat_map(|s| s.select(&tag_sel))
            .map(|inner| Element { inner })
            .collect())
    }

    /// Values of `attr` on every `tag` element that carries it.
    pub fn attr_values(&self, tag: &str, attr: &str) -> Result<Vec<&str>, QueryError> {
        Ok(self
            .elements(tag)?
            .into_iter()
            .filter_map(|el| el.attr(attr))
            .collect())
    }

    pub fn has(&self, tag: &str) -> Result<bool, QueryError> {
        let selector = selector(tag)?;
        Ok(self.html.select(&selector).next().is_some())
    }

    /// Text bodies of every `<script>` element. External scripts yield an
    /// empty string.
    pub fn inline_scripts(&self) -> Result<Vec<String>, QueryError> {
        Ok(self
            .elements("script")?
            .into_iter()
            .map(|el| el.text())
            .collect())
    }
}

fn selector(css: &str) -> Result<Selector, QueryError> {
    Selector::parse(css).map_err(|e| QueryError {
        selector: css.to_string(),
        reason: format!("{e:?}"),
    })
}
