//! Serde adapters for delimiter-joined sequence values.

/// Serialize/deserialize a sequence joined by an arbitrary delimiter.
///
/// ## Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use bracket_qs::helpers::generic_delimiter::{deserialize, serialize};
///
/// #[derive(Debug, PartialEq, Deserialize, Serialize)]
/// struct Query {
///     #[serde(deserialize_with = "deserialize::<_, _, ';'>")]
///     #[serde(serialize_with = "serialize::<_, _, ';'>")]
///     values: Vec<u8>,
/// }
///
/// let query = Query { values: vec![1, 2, 3] };
/// let serialized = bracket_qs::to_string(&query).unwrap();
/// assert_eq!(serialized, "values=1;2;3");
/// assert_eq!(bracket_qs::from_str::<Query>(&serialized).unwrap(), query);
/// ```
pub mod generic_delimiter {
    use std::{borrow::Cow, str::FromStr};

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T, const DELIM: char>(vec: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: ToString,
    {
        let joined = vec
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(&DELIM.to_string());
        serializer.serialize_str(&joined)
    }

    pub fn deserialize<'de, D, T, const DELIM: char>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        let text: Cow<'_, str> = Deserialize::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(vec![]);
        }
        text.split(DELIM)
            .map(|x| x.parse::<T>().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Serialize/deserialize comma-separated values, the `style=form` layout of
/// [OpenAPI 3.0](https://swagger.io/docs/specification/v3_0/serialization/#query-parameters).
///
/// Unlike the [`comma`](crate::Options::comma) option, which applies to
/// every value in the input, this adapter scopes the convention to one
/// field.
///
/// ## Example
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Deserialize, Serialize)]
/// struct Query {
///     #[serde(with = "bracket_qs::helpers::comma_separated")]
///     values: Vec<u8>,
/// }
///
/// let query = Query { values: vec![1, 2, 3] };
/// let serialized = bracket_qs::to_string(&query).unwrap();
/// assert_eq!(serialized, "values=1,2,3");
/// assert_eq!(bracket_qs::from_str::<Query>(&serialized).unwrap(), query);
/// ```
pub mod comma_separated {
    use std::str::FromStr;

    use serde::{Deserializer, Serializer};

    pub fn serialize<S, T>(vec: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: ToString,
    {
        super::generic_delimiter::serialize::<S, T, ','>(vec, serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        super::generic_delimiter::deserialize::<D, T, ','>(deserializer)
    }
}
