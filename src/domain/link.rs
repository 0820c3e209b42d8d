use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// `amazon.<tld>/.../dp/<ASIN>` followed by end of string or path/query noise.
static PRODUCT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"amazon\.[^/?#]+/(?:[^?#]*/)?dp/([A-Za-z0-9]{10})(?:[/?#]|$)")
        .expect("valid product path regex")
});

/// Vendor product identifier (ASIN) embedded in a product link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    /// Extract the product identifier from a raw link.
    ///
    /// Returns `None` when the link does not follow the product path pattern;
    /// callers treat that as "cannot resolve this link".
    pub fn from_link(link: &str) -> Option<Self> {
        PRODUCT_PATH
            .captures(link.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
