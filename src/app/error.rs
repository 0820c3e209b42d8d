use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricefloorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sheet request failed ({status}): {message}")]
    Sheet { status: u16, message: String },

    #[error("Authorization invalidated: {0}")]
    AuthInvalidated(String),

    #[error("No stored authorization at {0}; run `pricefloor authorize` first")]
    AuthMissing(PathBuf),

    #[error("Group {index} failed on {link}: {source}")]
    Group {
        index: usize,
        link: String,
        #[source]
        source: Box<PricefloorError>,
    },

    #[error("{0}")]
    Other(String),
}

impl PricefloorError {
    /// True when the failure is an invalidated sheet authorization, even when
    /// wrapped in a group context.
    pub fn is_auth_invalidated(&self) -> bool {
        match self {
            Self::AuthInvalidated(_) => true,
            Self::Group { source, .. } => source.is_auth_invalidated(),
            _ => false,
        }
    }

    pub(crate) fn in_group(self, index: usize, link: &str) -> Self {
        Self::Group {
            index,
            link: link.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PricefloorError>;
