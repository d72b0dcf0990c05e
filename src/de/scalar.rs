//! Coercion of decoded scalar text into primitive values.

use std::fmt;

use serde::de::{self, Unexpected};

use crate::error::Result;

/// Deserializes a single decoded scalar. Coercion failures report the
/// requested type and the offending text; the caller attaches the field
/// path.
pub(crate) struct ScalarDeserializer(pub(crate) String);

macro_rules! deserialize_parsed {
    ($ty:ident, $method:ident, $visit_method:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            match self.0.parse::<$ty>() {
                Ok(value) => visitor.$visit_method(value),
                Err(_) => Err(de::Error::custom(format!(
                    concat!("invalid ", stringify!($ty), ": `{}`"),
                    self.0
                ))),
            }
        }
    };
}

impl<'de> de::Deserializer<'de> for ScalarDeserializer {
    type Error = crate::Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.0)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(de::Error::custom(format!("invalid char: `{}`", self.0))),
        }
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

    deserialize_parsed!(bool, deserialize_bool, visit_bool);
    deserialize_parsed!(i8, deserialize_i8, visit_i8);
    deserialize_parsed!(i16, deserialize_i16, visit_i16);
    deserialize_parsed!(i32, deserialize_i32, visit_i32);
    deserialize_parsed!(i64, deserialize_i64, visit_i64);
    deserialize_parsed!(u8, deserialize_u8, visit_u8);
    deserialize_parsed!(u16, deserialize_u16, visit_u16);
    deserialize_parsed!(u32, deserialize_u32, visit_u32);
    deserialize_parsed!(u64, deserialize_u64, visit_u64);
    deserialize_parsed!(f32, deserialize_f32, visit_f32);
    deserialize_parsed!(f64, deserialize_f64, visit_f64);

    serde::forward_to_deserialize_any! {
        str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

impl<'de> de::EnumAccess<'de> for ScalarDeserializer {
    type Error = crate::Error;
    type Variant = UnitOnly;

    fn variant_seed<T>(self, seed: T) -> Result<(T::Value, Self::Variant)>
    where
        T: de::DeserializeSeed<'de>,
    {
        Ok((seed.deserialize(self)?, UnitOnly))
    }
}

impl fmt::Debug for ScalarDeserializer {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .debug_tuple("ScalarDeserializer")
            .field(&self.0)
            .finish()
    }
}

/// A scalar can only name a unit variant; data-carrying variants need
/// nested keys.
pub(crate) struct UnitOnly;

impl<'de> de::VariantAccess<'de> for UnitOnly {
    type Error = crate::Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, _seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        Err(de::Error::invalid_type(
            Unexpected::UnitVariant,
            &"newtype variant",
        ))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(de::Error::invalid_type(
            Unexpected::UnitVariant,
            &"tuple variant",
        ))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(de::Error::invalid_type(
            Unexpected::UnitVariant,
            &"struct variant",
        ))
    }
}
