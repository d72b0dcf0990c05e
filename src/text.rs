//! Field-level text codecs.
//!
//! The binding layer converts between querystring text and Rust values
//! generically. A field type with its own wire text (a compact id, a color
//! code, a timestamp format) can implement [`TextCodec`] and opt in with
//! `#[serde(with = "bracket_qs::text")]`, keeping the conversion out of the
//! generic machinery.

use std::borrow::Cow;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Custom value-to-text conversion for a single querystring value.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use bracket_qs::TextCodec;
///
/// #[derive(Debug, PartialEq)]
/// struct Rgb(u8, u8, u8);
///
/// impl TextCodec for Rgb {
///     fn encode_text(&self) -> String {
///         format!("{:02x}{:02x}{:02x}", self.0, self.1, self.2)
///     }
///
///     fn decode_text(text: &str) -> Result<Self, String> {
///         if !text.is_ascii() || text.len() != 6 {
///             return Err("expected 6 hex digits".to_string());
///         }
///         let byte = |r| u8::from_str_radix(&text[r], 16).map_err(|e| e.to_string());
///         Ok(Rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?))
///     }
/// }
///
/// #[derive(Debug, PartialEq, Deserialize, Serialize)]
/// struct Query {
///     #[serde(with = "bracket_qs::text")]
///     color: Rgb,
/// }
///
/// let query = Query { color: Rgb(255, 0, 127) };
/// let serialized = bracket_qs::to_string(&query).unwrap();
/// assert_eq!(serialized, "color=ff007f");
/// assert_eq!(bracket_qs::from_str::<Query>(&serialized).unwrap(), query);
/// ```
pub trait TextCodec: Sized {
    fn encode_text(&self) -> String;

    /// Decoding failures are reported as field-scoped errors naming the
    /// field this codec is attached to.
    fn decode_text(text: &str) -> Result<Self, String>;
}

pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: TextCodec,
    S: Serializer,
{
    serializer.serialize_str(&value.encode_text())
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: TextCodec,
    D: Deserializer<'de>,
{
    let text: Cow<'_, str> = Deserialize::deserialize(deserializer)?;
    T::decode_text(&text).map_err(de::Error::custom)
}

struct AsText<'a, T>(&'a T);

impl<T: TextCodec> Serialize for AsText<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.encode_text())
    }
}

/// The [`TextCodec`] adapter for optional fields, usable as
/// `#[serde(with = "bracket_qs::text::option")]`.
pub mod option {
    use super::*;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: TextCodec,
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&AsText(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: TextCodec,
        D: Deserializer<'de>,
    {
        let text: Option<Cow<'_, str>> = Deserialize::deserialize(deserializer)?;
        text.map(|text| T::decode_text(&text).map_err(de::Error::custom))
            .transpose()
    }
}
