//! Typed binding: deserializing parsed trees into Rust types.
//!
//! Bracket keys can arrive in any order, so `a[1]=2&b=x&a[0]=1` must still
//! bind `a` as a two-element sequence. The input is therefore parsed into a
//! [`Map`] of [`Node`] trees first, and deserialization walks that tree
//! rather than the raw text.
//!
//! [`Deserializer`] is the top-level entry point and only supports map-like
//! outputs, since the wire format is a list of key/value pairs. Each value
//! is a [`Node`] deserialized by the internal `NodeDeserializer`, which
//! recurses for nested mappings and sequences and hands leaf text to
//! `ScalarDeserializer` for primitive coercion. Coercion failures are
//! scoped with the path of the field being bound as they propagate up.

mod scalar;

use indexmap::map::IntoIter;
use serde::de;

use crate::de::scalar::ScalarDeserializer;
use crate::error::{Error, Result};
use crate::value::{Map, Node};

/// A deserializer over a parsed querystring.
///
/// Supported top-level outputs are structs, maps and enums; anything that
/// cannot be expressed as key/value pairs fails with a top-level error.
pub struct Deserializer {
    iter: IntoIter<String, Node>,
    value: Option<(String, Node)>,
}

impl Deserializer {
    pub fn from_map(map: Map) -> Self {
        Deserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TopLevel("a primitive"))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(self)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TopLevel("a sequence"))
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TopLevel("a tuple"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TopLevel("a tuple struct"))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64
        char str string
        bytes byte_buf option unit unit_struct
        identifier ignored_any
    }
}

impl<'de> de::MapAccess<'de> for Deserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some((key, node)) = self.iter.next() else {
            return Ok(None);
        };
        let parsed = seed.deserialize(ScalarDeserializer(key.clone()))?;
        self.value = Some((key, node));
        Ok(Some(parsed))
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let Some((key, node)) = self.value.take() else {
            return Err(de::Error::custom("value requested before a key"));
        };
        seed.deserialize(NodeDeserializer(node))
            .map_err(|e| e.scoped(&key))
    }
}

impl<'de> de::EnumAccess<'de> for Deserializer {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(mut self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let Some((key, node)) = self.iter.next() else {
            return Err(de::Error::custom("no variant name in the input"));
        };
        let parsed = seed.deserialize(ScalarDeserializer(key.clone()))?;
        self.value = Some((key, node));
        Ok((parsed, self))
    }
}

impl<'de> de::VariantAccess<'de> for Deserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        let Some((key, node)) = self.value else {
            return Err(de::Error::custom("no value for the newtype variant"));
        };
        seed.deserialize(NodeDeserializer(node))
            .map_err(|e| e.scoped(&key))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let Some((key, node)) = self.value else {
            return Err(de::Error::custom("no value for the tuple variant"));
        };
        de::Deserializer::deserialize_seq(NodeDeserializer(node), visitor)
            .map_err(|e| e.scoped(&key))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let Some((key, node)) = self.value else {
            return Err(de::Error::custom("no value for the struct variant"));
        };
        de::Deserializer::deserialize_map(NodeDeserializer(node), visitor)
            .map_err(|e| e.scoped(&key))
    }
}

/// Deserializes one subtree. Recurses through `Deserializer` for nested
/// mappings and through `NodeSeq` for sequences.
struct NodeDeserializer(Node);

impl NodeDeserializer {
    /// Unwraps a present scalar, reporting the requested type on mismatch.
    fn into_scalar(self, expected: &'static str) -> Result<String> {
        match self.0 {
            Node::Scalar(Some(text)) => Ok(text),
            Node::Scalar(None) => Err(de::Error::custom(format!(
                "expected {expected}, got an absent value"
            ))),
            Node::Sequence(_) => Err(de::Error::custom(format!(
                "expected {expected}, got a sequence"
            ))),
            Node::Mapping(_) => Err(de::Error::custom(format!(
                "expected {expected}, got a map"
            ))),
        }
    }
}

macro_rules! deserialize_scalar {
    ($ty:ident, $method:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            ScalarDeserializer(self.into_scalar(stringify!($ty))?).$method(visitor)
        }
    };
}

impl<'de> de::Deserializer<'de> for NodeDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Node::Scalar(None) => visitor.visit_unit(),
            Node::Scalar(Some(text)) => ScalarDeserializer(text).deserialize_any(visitor),
            Node::Sequence(_) => self.deserialize_seq(visitor),
            Node::Mapping(_) => self.deserialize_map(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Node::Scalar(None) => visitor.visit_none(),
            Node::Scalar(Some(ref text)) if text.is_empty() => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.0.is_empty_value() {
            visitor.visit_unit()
        } else {
            Err(de::Error::custom("expected no value"))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Node::Sequence(seq) => visitor.visit_seq(NodeSeq::new(seq)),
            Node::Mapping(map) => {
                if Node::is_index_mapping(&map) {
                    visitor.visit_seq(NodeSeq::new(Node::into_ordered_sequence(map)))
                } else {
                    Err(de::Error::custom("expected a sequence, got a map"))
                }
            }
            // a single occurrence of the key still satisfies a one-element
            // sequence
            scalar @ Node::Scalar(Some(_)) => visitor.visit_seq(NodeSeq::new(vec![scalar])),
            Node::Scalar(None) => visitor.visit_seq(NodeSeq::new(Vec::new())),
        }
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Node::Mapping(map) => Deserializer::from_map(map).deserialize_map(visitor),
            Node::Sequence(_) => Err(de::Error::custom("expected a map, got a sequence")),
            Node::Scalar(_) => Err(de::Error::custom("expected a map, got a scalar")),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Node::Mapping(map) => {
                Deserializer::from_map(map).deserialize_enum(name, variants, visitor)
            }
            Node::Scalar(Some(text)) => visitor.visit_enum(ScalarDeserializer(text)),
            Node::Scalar(None) => Err(de::Error::custom("expected a variant name, got nothing")),
            Node::Sequence(_) => {
                Err(de::Error::custom("expected a variant name, got a sequence"))
            }
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.into_scalar("bytes")?.into_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    deserialize_scalar!(bool, deserialize_bool);
    deserialize_scalar!(i8, deserialize_i8);
    deserialize_scalar!(i16, deserialize_i16);
    deserialize_scalar!(i32, deserialize_i32);
    deserialize_scalar!(i64, deserialize_i64);
    deserialize_scalar!(u8, deserialize_u8);
    deserialize_scalar!(u16, deserialize_u16);
    deserialize_scalar!(u32, deserialize_u32);
    deserialize_scalar!(u64, deserialize_u64);
    deserialize_scalar!(f32, deserialize_f32);
    deserialize_scalar!(f64, deserialize_f64);

    serde::forward_to_deserialize_any! {
        char str string identifier ignored_any
    }
}

/// Sequence access that scopes element errors with their index.
struct NodeSeq {
    iter: std::vec::IntoIter<Node>,
    index: usize,
}

impl NodeSeq {
    fn new(seq: Vec<Node>) -> Self {
        NodeSeq {
            iter: seq.into_iter(),
            index: 0,
        }
    }
}

impl<'de> de::SeqAccess<'de> for NodeSeq {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        let Some(node) = self.iter.next() else {
            return Ok(None);
        };
        let index = self.index;
        self.index += 1;
        seed.deserialize(NodeDeserializer(node))
            .map(Some)
            .map_err(|e| e.scoped_index(index))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}
