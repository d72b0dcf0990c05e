//! Serde support for bracket-notation querystrings.
//!
//! Flat `key=value` pairs can encode nested structure through brackets in
//! the key: `user[name]=John&user[roles][0]=admin` describes a map holding
//! a map and a sequence. This crate transcodes both directions, either
//! through a dynamic [`Node`] tree or directly to and from any type
//! implementing serde's traits.
//!
//! ## Typed binding
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct Address {
//!     city: String,
//!     postcode: String,
//! }
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct QueryParams {
//!     id: u64,
//!     address: Address,
//!     user_ids: Vec<u8>,
//! }
//!
//! let params = QueryParams {
//!     id: 42,
//!     address: Address {
//!         city: "Carrot City".to_string(),
//!         postcode: "12345".to_string(),
//!     },
//!     user_ids: vec![1, 2, 3],
//! };
//!
//! let encoded = bracket_qs::to_string(&params).unwrap();
//! assert_eq!(
//!     encoded,
//!     "id=42&address[city]=Carrot+City&address[postcode]=12345&\
//!      user_ids[0]=1&user_ids[1]=2&user_ids[2]=3"
//! );
//! // bracket keys may arrive in any order
//! let decoded: QueryParams = bracket_qs::from_str(
//!     "user_ids[1]=2&address[city]=Carrot+City&id=42&\
//!      user_ids[0]=1&address[postcode]=12345&user_ids[2]=3",
//! )
//! .unwrap();
//! assert_eq!(decoded, params);
//! ```
//!
//! ## Dynamic trees
//!
//! When the shape is not known ahead of time, [`parse()`] produces a
//! [`Node`] tree directly:
//!
//! ```
//! use bracket_qs::Node;
//!
//! let tree = bracket_qs::parse("filters[price][min]=10&tags[]=a&tags[]=b").unwrap();
//! let Node::Mapping(root) = tree else { unreachable!() };
//! assert!(matches!(root["tags"], Node::Sequence(ref tags) if tags.len() == 2));
//! ```
//!
//! ## Configuration
//!
//! Every knob lives on [`Options`], constructed per call; there is no
//! global state. See the [`Options`] docs for the full surface: dot
//! notation, array output formats, duplicates policies, charset handling,
//! strict null handling, custom encoder/decoder hooks, and the resource
//! limits applied to untrusted input.
//!
//! ```
//! use std::collections::HashMap;
//!
//! use bracket_qs::Options;
//!
//! let options = Options::new().allow_dots(true);
//! let map: HashMap<String, HashMap<String, String>> =
//!     options.deserialize_str("user.name=John").unwrap();
//! assert_eq!(map["user"]["name"], "John");
//! ```

mod de;
mod error;
mod merge;
mod options;
mod parse;
mod ser;
mod value;

pub mod helpers;
pub mod text;

pub use crate::de::Deserializer;
pub use crate::error::{Error, Result};
pub use crate::options::{ArrayFormat, Charset, DecodeFn, Duplicates, EncodeFn, Options};
pub use crate::ser::Serializer;
pub use crate::text::TextCodec;
pub use crate::value::{Map, Node};

use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parses a querystring into a dynamic [`Node`] tree with the default
/// [`Options`]. The root is always a [`Node::Mapping`].
///
/// ```
/// let tree = bracket_qs::parse("a[b]=c").unwrap();
/// assert_eq!(bracket_qs::to_string(&tree).unwrap(), "a[b]=c");
/// ```
pub fn parse(input: &str) -> Result<Node> {
    Options::new().parse_str(input)
}

/// Deserializes a querystring from a `&str` with the default [`Options`].
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Query {
///     name: String,
///     age: u8,
/// }
///
/// assert_eq!(
///     bracket_qs::from_str::<Query>("name=Alice&age=24").unwrap(),
///     Query {
///         name: "Alice".to_owned(),
///         age: 24,
///     }
/// );
/// ```
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    Options::new().deserialize_str(input)
}

/// Deserializes a querystring from a `&[u8]` with the default [`Options`].
pub fn from_bytes<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    Options::new().deserialize_bytes(input)
}

/// Serializes a value into a querystring with the default [`Options`].
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Query {
///     name: String,
///     age: u8,
/// }
///
/// let q = Query {
///     name: "Alice".to_owned(),
///     age: 24,
/// };
///
/// assert_eq!(bracket_qs::to_string(&q).unwrap(), "name=Alice&age=24");
/// ```
pub fn to_string<T: Serialize>(input: &T) -> Result<String> {
    Options::new().serialize_string(input)
}

/// Serializes a value into a generic writer with the default [`Options`].
pub fn to_writer<T: Serialize, W: Write>(input: &T, writer: &mut W) -> Result<()> {
    Options::new().serialize_to_writer(input, writer)
}
