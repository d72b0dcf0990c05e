use std::fmt::Display;

use serde::{de, ser};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while parsing, binding or stringifying a querystring.
///
/// Parser-layer errors abort the whole call. Binder errors abort on the
/// first failing field and carry the offending field path, dot-joined for
/// nested structs and bracket-indexed for sequence elements.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed percent-encoding, or bytes invalid for the configured
    /// charset, in a key segment or value.
    #[error("failed to decode `{segment}`: {msg}")]
    Decode { segment: String, msg: String },

    /// A configured limit was exceeded while `throw_on_limit_exceeded`
    /// is set.
    #[error("{kind} limit exceeded: maximum of {limit}")]
    LimitExceeded { kind: &'static str, limit: usize },

    /// A type-coercion failure, scoped to the field it occurred at.
    #[error("failed to deserialize `{path}`: {msg}")]
    Field { path: String, msg: String },

    /// The top-level value cannot be represented as key/value pairs.
    #[error("cannot serialize {0} at the top level: try a struct or map")]
    TopLevel(&'static str),

    /// The value cannot be used as a querystring key.
    #[error("unsupported key type")]
    UnsupportedKey,

    #[error("{0}")]
    Custom(String),

    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    FromUtf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn decode(segment: impl Into<String>, msg: impl Display) -> Self {
        Error::Decode {
            segment: segment.into(),
            msg: msg.to_string(),
        }
    }

    pub(crate) fn limit(kind: &'static str, limit: usize) -> Self {
        Error::LimitExceeded { kind, limit }
    }

    /// Prefixes a field name onto the path carried by the error, turning a
    /// bare coercion failure into a field-scoped one.
    pub(crate) fn scoped(self, field: &str) -> Self {
        match self {
            Error::Field { path, msg } => {
                // bracket-indexed segments attach without a separating dot
                let path = if path.starts_with('[') {
                    format!("{field}{path}")
                } else {
                    format!("{field}.{path}")
                };
                Error::Field { path, msg }
            }
            Error::Custom(msg) => Error::Field {
                path: field.to_string(),
                msg,
            },
            other => other,
        }
    }

    pub(crate) fn scoped_index(self, index: usize) -> Self {
        match self {
            Error::Field { path, msg } => {
                let sep = if path.starts_with('[') { "" } else { "." };
                Error::Field {
                    path: format!("[{index}]{sep}{path}"),
                    msg,
                }
            }
            Error::Custom(msg) => Error::Field {
                path: format!("[{index}]"),
                msg,
            },
            other => other,
        }
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}
