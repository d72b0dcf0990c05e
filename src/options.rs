use std::io::Write;

use serde::de;

use crate::error::Result;
use crate::value::Node;
use crate::{Deserializer, Serializer};

/// How sequences are laid out in a generated querystring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArrayFormat {
    /// `a[0]=1&a[1]=2`
    #[default]
    Indices,
    /// `a[]=1&a[]=2`
    Brackets,
    /// `a=1&a=2`
    Repeat,
}

/// Resolution policy for a raw key that appears more than once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Duplicates {
    /// Merge the values: two scalars become a two-element sequence.
    #[default]
    Combine,
    /// Keep the first value, drop the rest.
    First,
    /// Keep the last value.
    Last,
}

/// Character set used to interpret percent-decoded bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is its own code point. Decoding never fails.
    Latin1,
}

/// A custom scalar decoder, replacing the built-in percent-decoder for key
/// segments and values. Receives the raw text and the configured charset;
/// an `Err` message is reported as a field-scoped decode error.
pub type DecodeFn = fn(&[u8], Charset) -> std::result::Result<String, String>;

/// A custom scalar encoder, replacing the built-in percent-encoder for key
/// segments and values during serialization.
pub type EncodeFn = fn(&str) -> String;

/// Configuration for one parse or stringify call.
///
/// An `Options` value is immutable once constructed and consumed read-only
/// by a single call; there is no process-wide configuration. All knobs have
/// `const` builder-style setters:
///
/// ```
/// use bracket_qs::Options;
/// use std::collections::HashMap;
///
/// let options = Options::new().depth(0);
/// let map: HashMap<String, String> = options.deserialize_str("a[b][c]=1").unwrap();
/// assert_eq!(map.get("a[b][c]").unwrap(), "1");
/// ```
///
/// ## Resource limits
///
/// Query strings are untrusted input, so three limits are enforced before
/// any unbounded work is done: `parameter_limit` bounds the number of
/// `key=value` pairs, `array_limit` bounds per-key sequence growth, and
/// `depth` bounds bracket nesting (excess segments fold into one literal
/// segment rather than being dropped). By default exceeding a limit
/// truncates deterministically; with `throw_on_limit_exceeded(true)` the
/// call fails fast instead.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    pub(crate) allow_dots: bool,
    pub(crate) allow_empty_arrays: bool,
    pub(crate) allow_prototypes: bool,
    pub(crate) allow_sparse: bool,
    pub(crate) array_format: ArrayFormat,
    pub(crate) array_limit: usize,
    pub(crate) charset: Charset,
    pub(crate) comma: bool,
    pub(crate) decoder: Option<DecodeFn>,
    pub(crate) delimiter: char,
    pub(crate) depth: usize,
    pub(crate) duplicates: Duplicates,
    pub(crate) encoder: Option<EncodeFn>,
    pub(crate) parameter_limit: usize,
    pub(crate) strict_null_handling: bool,
    pub(crate) throw_on_limit_exceeded: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    pub const fn new() -> Self {
        Self {
            allow_dots: false,
            allow_empty_arrays: false,
            allow_prototypes: false,
            allow_sparse: false,
            array_format: ArrayFormat::Indices,
            array_limit: 20,
            charset: Charset::Utf8,
            comma: false,
            decoder: None,
            delimiter: '&',
            depth: 5,
            duplicates: Duplicates::Combine,
            encoder: None,
            parameter_limit: 1000,
            strict_null_handling: false,
            throw_on_limit_exceeded: false,
        }
    }

    /// Rewrite `a.b` to `a[b]` when parsing (dots inside brackets are left
    /// alone), and emit `a.b=1` instead of `a[b]=1` when serializing.
    /// Default is `false`.
    pub const fn allow_dots(mut self, allow_dots: bool) -> Self {
        self.allow_dots = allow_dots;
        self
    }

    /// Admit empty arrays: `a[]=` parses to an empty sequence, and an empty
    /// sequence serializes to `a[]` instead of `a=`. Default is `false`.
    pub const fn allow_empty_arrays(mut self, allow_empty_arrays: bool) -> Self {
        self.allow_empty_arrays = allow_empty_arrays;
        self
    }

    /// When `false` (the default), pairs whose key path contains
    /// `__proto__`, `constructor` or `prototype` are silently dropped.
    /// These keys are only dangerous to consumers that splice decoded data
    /// into prototype-based object models, but dropping them here keeps the
    /// wire contract identical for every caller.
    pub const fn allow_prototypes(mut self, allow_prototypes: bool) -> Self {
        self.allow_prototypes = allow_prototypes;
        self
    }

    /// Keep holes as absent scalars when index notation skips positions
    /// (`a[1]=x` with no `a[0]`). When `false` (the default) the sequence
    /// is compacted.
    pub const fn allow_sparse(mut self, allow_sparse: bool) -> Self {
        self.allow_sparse = allow_sparse;
        self
    }

    /// Specifies how sequences are formatted during serialization.
    /// The default is `Indices`, producing keys like `a[0]=1&a[1]=2`.
    pub const fn array_format(mut self, array_format: ArrayFormat) -> Self {
        self.array_format = array_format;
        self
    }

    /// Bounds how far a single key's sequence may grow. Past the limit,
    /// elements are dropped, or the call fails when
    /// [`throw_on_limit_exceeded`](Self::throw_on_limit_exceeded) is set.
    /// Default is 20.
    pub const fn array_limit(mut self, array_limit: usize) -> Self {
        self.array_limit = array_limit;
        self
    }

    /// Character set for interpreting percent-decoded bytes. Default is
    /// UTF-8; `Latin1` maps every byte to its ISO-8859-1 code point.
    pub const fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Split scalar values on commas: `a=b,c` parses as `{a: ["b", "c"]}`.
    /// Default is `false`.
    pub const fn comma(mut self, comma: bool) -> Self {
        self.comma = comma;
        self
    }

    /// Replaces the built-in scalar decoder.
    pub const fn decoder(mut self, decoder: DecodeFn) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// The pair separator. Default is `&`.
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The maximum bracket-nesting depth. Segments beyond the limit are
    /// folded into a single literal key such as `[x][y]` rather than
    /// recursed into, so no information is lost. Default is 5.
    ///
    /// ```
    /// use bracket_qs::Options;
    /// use std::collections::HashMap;
    ///
    /// let options = Options::new().depth(10);
    /// let map: HashMap<String, HashMap<String, HashMap<String, String>>> =
    ///     options.deserialize_str("a[b][c]=1").unwrap();
    /// assert_eq!(map["a"]["b"]["c"], "1");
    /// ```
    pub const fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Resolution policy for repeated raw keys. Default is
    /// [`Duplicates::Combine`].
    pub const fn duplicates(mut self, duplicates: Duplicates) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Replaces the built-in percent-encoder.
    pub const fn encoder(mut self, encoder: EncodeFn) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Bounds the number of `key=value` pairs read from the input. Past the
    /// limit the remainder is dropped, or the call fails when
    /// [`throw_on_limit_exceeded`](Self::throw_on_limit_exceeded) is set.
    /// Default is 1000.
    pub const fn parameter_limit(mut self, parameter_limit: usize) -> Self {
        self.parameter_limit = parameter_limit;
        self
    }

    /// Distinguish keys with no `=` from keys with an empty value: `a&b=`
    /// parses to an absent value for `a` and `""` for `b`, and absent
    /// values serialize back to a bare key. Default is `false`.
    pub const fn strict_null_handling(mut self, strict_null_handling: bool) -> Self {
        self.strict_null_handling = strict_null_handling;
        self
    }

    /// Fail fast instead of truncating when `parameter_limit` or
    /// `array_limit` is exceeded. Default is `false`.
    pub const fn throw_on_limit_exceeded(mut self, throw_on_limit_exceeded: bool) -> Self {
        self.throw_on_limit_exceeded = throw_on_limit_exceeded;
        self
    }

    /// Parses a querystring into a dynamic [`Node`] tree using this
    /// `Options`. The root is always a `Node::Mapping`.
    pub fn parse_str(&self, input: &str) -> Result<Node> {
        crate::parse::parse(input, self).map(Node::Mapping)
    }

    /// Deserializes a querystring from a `&str` using this `Options`.
    pub fn deserialize_str<T: de::DeserializeOwned>(&self, input: &str) -> Result<T> {
        let map = crate::parse::parse(input, self)?;
        T::deserialize(Deserializer::from_map(map))
    }

    /// Deserializes a querystring from a `&[u8]` using this `Options`.
    pub fn deserialize_bytes<T: de::DeserializeOwned>(&self, input: &[u8]) -> Result<T> {
        self.deserialize_str(std::str::from_utf8(input)?)
    }

    /// Serializes an object to a querystring using this `Options`.
    pub fn serialize_string<T: serde::Serialize>(&self, input: &T) -> Result<String> {
        // initialize the buffer with 128 bytes, a guess based on what
        // serde_json does
        let mut buffer = Vec::with_capacity(128);
        let mut serializer = Serializer::new(&mut buffer, *self);
        input.serialize(&mut serializer)?;
        String::from_utf8(buffer).map_err(crate::Error::from)
    }

    /// Serializes an object to a writer using this `Options`.
    pub fn serialize_to_writer<T: serde::Serialize, W: Write>(
        &self,
        input: &T,
        writer: &mut W,
    ) -> Result<()> {
        let mut serializer = Serializer::new(writer, *self);
        input.serialize(&mut serializer)
    }
}
