//! Stringifying: serializing Rust values into bracket-notation
//! querystrings.

mod encode;

use std::io::Write;

use serde::ser;

use crate::error::{Error, Result};
use crate::options::{ArrayFormat, Options};
use crate::ser::encode::encode;

/// A serializer for the bracket-notation querystring format.
///
/// Nested structures serialize as `parent[child]=value` (or `parent.child`
/// with dot notation enabled), and sequences per the configured
/// [`ArrayFormat`].
///
/// A key stack tracks the path to the value currently being serialized.
/// Serializing `{user: {name: "John"}}` pushes `user`, then `name` arrives
/// as the pre-bracketed segment `[name]`, and the leaf writes
/// `user[name]=John`. Segments are encoded as they are pushed, so each is
/// written out verbatim, possibly several times for sibling leaves.
pub struct Serializer<W: Write> {
    writer: W,
    first_kv: bool,
    key: Vec<Vec<u8>>,
    options: Options,
}

impl<W: Write> Serializer<W> {
    pub fn new(writer: W, options: Options) -> Self {
        Self {
            writer,
            first_kv: true,
            key: Vec::with_capacity(4),
            options,
        }
    }

    /// Pushes one key segment onto the stack. The first segment is written
    /// bare; later segments are bracketed, or dot-prefixed when dot
    /// notation is enabled and the segment is not a sequence index.
    fn push_key(&mut self, newkey: &[u8], index_segment: bool) -> Result<()> {
        let first = self.key.is_empty();
        let dotted = !first && !index_segment && self.options.allow_dots;

        let mut segment = Vec::with_capacity(newkey.len() + 2);
        if !first {
            segment.push(if dotted { b'.' } else { b'[' });
        }

        if let Some(encoder) = self.options.encoder {
            segment.extend_from_slice(encoder(&String::from_utf8_lossy(newkey)).as_bytes());
        } else if newkey
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        {
            // common case: the segment needs no percent-encoding
            segment.extend_from_slice(newkey);
        } else {
            for chunk in encode(newkey) {
                segment.extend_from_slice(&chunk);
            }
        }

        if !first && !dotted {
            segment.push(b']');
        }
        self.key.push(segment);
        Ok(())
    }

    fn pop_key(&mut self) -> Result<()> {
        if self.key.pop().is_none() {
            return Err(Error::Custom("internal error: no key found".to_string()));
        }
        Ok(())
    }

    fn write_delimiter(&mut self) -> Result<()> {
        if self.first_kv {
            self.first_kv = false;
        } else {
            let mut buf = [0; 4];
            self.writer
                .write_all(self.options.delimiter.encode_utf8(&mut buf).as_bytes())?;
        }
        Ok(())
    }

    fn write_key_stack(&mut self) -> Result<()> {
        self.write_delimiter()?;
        for segment in &self.key {
            self.writer.write_all(segment)?;
        }
        Ok(())
    }

    /// Writes a bare key with no surrounding path, used for top-level unit
    /// variants.
    fn write_bare_key(&mut self, raw: &[u8]) -> Result<()> {
        self.write_delimiter()?;
        self.write_encoded(raw)
    }

    fn write_encoded(&mut self, raw: &[u8]) -> Result<()> {
        if let Some(encoder) = self.options.encoder {
            self.writer
                .write_all(encoder(&String::from_utf8_lossy(raw)).as_bytes())?;
        } else {
            for chunk in encode(raw) {
                self.writer.write_all(&chunk)?;
            }
        }
        Ok(())
    }

    fn write_value(&mut self, value: &[u8]) -> Result<()> {
        self.write_key_stack()?;
        self.writer.write_all(b"=")?;
        self.write_encoded(value)
    }

    /// `key=` with nothing after it.
    fn write_unit(&mut self) -> Result<()> {
        self.write_key_stack()?;
        self.writer.write_all(b"=")?;
        Ok(())
    }

    /// A bare key with no `=`, the strict-null rendering of an absent
    /// value.
    fn write_no_value(&mut self) -> Result<()> {
        self.write_key_stack()
    }

    fn write_empty_array(&mut self) -> Result<()> {
        self.write_key_stack()?;
        self.writer.write_all(b"[]")?;
        Ok(())
    }
}

// Most primitives cannot stand alone at the top level since the format has
// no key to attach them to. The zero values (empty string, false, 0, 0.0)
// serialize to an empty querystring instead of failing, so that skipped or
// defaulted top-level wrappers stay representable.
macro_rules! serialize_itoa {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                if self.key.is_empty() {
                    return if v == 0 { Ok(()) } else { Err(Error::TopLevel("a number")) };
                }
                let mut buffer = itoa::Buffer::new();
                self.write_value(buffer.format(v).as_bytes())
            }
        )*
    };
}

macro_rules! serialize_ryu {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                if self.key.is_empty() {
                    return if v == 0.0 { Ok(()) } else { Err(Error::TopLevel("a number")) };
                }
                let mut buffer = ryu::Buffer::new();
                self.write_value(buffer.format(v).as_bytes())
            }
        )*
    };
}

impl<'a, W: Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = SeqSerializer<'a, W>;
    type SerializeTuple = SeqSerializer<'a, W>;
    type SerializeTupleStruct = SeqSerializer<'a, W>;
    type SerializeTupleVariant = SeqSerializer<'a, W>;
    type SerializeMap = MapSerializer<'a, W>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    serialize_itoa! {
        u8  => serialize_u8,
        u16 => serialize_u16,
        u32 => serialize_u32,
        u64 => serialize_u64,
        i8  => serialize_i8,
        i16 => serialize_i16,
        i32 => serialize_i32,
        i64 => serialize_i64,
    }
    serialize_ryu! {
        f32 => serialize_f32,
        f64 => serialize_f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        if self.key.is_empty() {
            return if v {
                Err(Error::TopLevel("a boolean"))
            } else {
                Ok(())
            };
        }
        let text: &[u8] = if v { b"true" } else { b"false" };
        self.write_value(text)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut b = [0; 4];
        let text = v.encode_utf8(&mut b);
        self.serialize_str(text)
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        if self.key.is_empty() {
            return if v.is_empty() {
                Ok(())
            } else {
                Err(Error::TopLevel("a string"))
            };
        }
        self.write_value(v.as_bytes())
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Self::Ok> {
        if self.key.is_empty() {
            return if value.is_empty() {
                Ok(())
            } else {
                Err(Error::TopLevel("bytes"))
            };
        }
        self.write_value(value)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        if self.key.is_empty() {
            return Ok(());
        }
        if self.options.strict_null_handling {
            self.write_no_value()
        } else {
            self.write_unit()
        }
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        if self.key.is_empty() {
            self.write_bare_key(variant.as_bytes())
        } else {
            self.write_value(variant.as_bytes())
        }
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        self.push_key(variant.as_bytes(), false)?;
        value.serialize(&mut *self)?;
        self.pop_key()
    }

    /// A missing value writes nothing at all, not even its key.
    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(&mut *self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        if self.key.is_empty() {
            return Err(Error::TopLevel("a sequence"));
        }
        Ok(SeqSerializer::new(self))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        if self.key.is_empty() {
            return Err(Error::TopLevel("a tuple"));
        }
        Ok(SeqSerializer::new(self))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        if self.key.is_empty() {
            return Err(Error::TopLevel("a tuple struct"));
        }
        Ok(SeqSerializer::new(self))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.push_key(variant.as_bytes(), false)?;
        Ok(SeqSerializer::new(self))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer::new(self))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.push_key(variant.as_bytes(), false)?;
        Ok(self)
    }
}

#[doc(hidden)]
pub struct SeqSerializer<'s, W: Write> {
    qs: &'s mut Serializer<W>,
    counter: usize,
}

impl<'a, W: Write> SeqSerializer<'a, W> {
    fn new(qs: &'a mut Serializer<W>) -> Self {
        Self { qs, counter: 0 }
    }

    fn push_element_key(&mut self) -> Result<()> {
        match self.qs.options.array_format {
            ArrayFormat::Indices => {
                let mut buffer = itoa::Buffer::new();
                let key = buffer.format(self.counter);
                self.qs.push_key(key.as_bytes(), true)?;
            }
            ArrayFormat::Brackets => {
                self.qs.push_key(b"", true)?;
            }
            ArrayFormat::Repeat => {
                // the bare parent key repeats for every element
            }
        }
        self.counter += 1;
        Ok(())
    }

    fn pop_element_key(&mut self) -> Result<()> {
        if matches!(
            self.qs.options.array_format,
            ArrayFormat::Indices | ArrayFormat::Brackets
        ) {
            self.qs.pop_key()?;
        }
        Ok(())
    }

    fn serialize_one<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.push_element_key()?;
        value.serialize(&mut *self.qs)?;
        self.pop_element_key()
    }

    fn end_elements(self) -> Result<()> {
        if self.counter > 0 {
            return Ok(());
        }
        if self.qs.options.allow_empty_arrays {
            self.qs.write_empty_array()
        } else {
            self.qs.write_unit()
        }
    }
}

impl<W: Write> ser::SerializeSeq for SeqSerializer<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.serialize_one(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.end_elements()
    }
}

impl<W: Write> ser::SerializeTuple for SeqSerializer<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.serialize_one(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.end_elements()
    }
}

impl<W: Write> ser::SerializeTupleStruct for SeqSerializer<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.serialize_one(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.end_elements()
    }
}

impl<W: Write> ser::SerializeTupleVariant for SeqSerializer<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.serialize_one(value)
    }

    fn end(self) -> Result<Self::Ok> {
        // the variant key pushed by `serialize_tuple_variant`
        self.qs.pop_key()
    }
}

impl<W: Write> ser::SerializeStruct for &mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.push_key(key.as_bytes(), false)?;
        value.serialize(&mut **self)?;
        self.pop_key()
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<W: Write> ser::SerializeStructVariant for &mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.push_key(key.as_bytes(), false)?;
        value.serialize(&mut **self)?;
        self.pop_key()
    }

    fn end(self) -> Result<Self::Ok> {
        self.pop_key()
    }
}

#[doc(hidden)]
pub struct MapSerializer<'s, W: Write> {
    qs: &'s mut Serializer<W>,
    empty: bool,
}

impl<'a, W: Write> MapSerializer<'a, W> {
    fn new(qs: &'a mut Serializer<W>) -> Self {
        Self { qs, empty: true }
    }
}

impl<W: Write> ser::SerializeMap for MapSerializer<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.empty = false;
        key.serialize(KeySerializer { qs: &mut *self.qs })
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        value.serialize(&mut *self.qs)?;
        self.qs.pop_key()
    }

    fn end(self) -> Result<Self::Ok> {
        // an empty map still needs its key to appear, except at the top
        // level where the whole output is empty
        if self.empty && !self.qs.key.is_empty() {
            self.qs.write_unit()?;
        }
        Ok(())
    }
}

macro_rules! serialize_key_itoa {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = itoa::Buffer::new();
                self.qs.push_key(buffer.format(v).as_bytes(), false)
            }
        )*
    };
}

macro_rules! serialize_key_ryu {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = ryu::Buffer::new();
                self.qs.push_key(buffer.format(v).as_bytes(), false)
            }
        )*
    };
}

/// Serializes map keys by pushing them onto the key stack. Only values
/// with a natural text form are usable as keys.
struct KeySerializer<'a, W: Write> {
    qs: &'a mut Serializer<W>,
}

impl<W: Write> ser::Serializer for KeySerializer<'_, W> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = ser::Impossible<Self::Ok, Error>;
    type SerializeTuple = ser::Impossible<Self::Ok, Error>;
    type SerializeTupleStruct = ser::Impossible<Self::Ok, Error>;
    type SerializeTupleVariant = ser::Impossible<Self::Ok, Error>;
    type SerializeMap = ser::Impossible<Self::Ok, Error>;
    type SerializeStruct = ser::Impossible<Self::Ok, Error>;
    type SerializeStructVariant = ser::Impossible<Self::Ok, Error>;

    serialize_key_itoa! {
        u8  => serialize_u8,
        u16 => serialize_u16,
        u32 => serialize_u32,
        u64 => serialize_u64,
        i8  => serialize_i8,
        i16 => serialize_i16,
        i32 => serialize_i32,
        i64 => serialize_i64,
    }
    serialize_key_ryu! {
        f32 => serialize_f32,
        f64 => serialize_f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        let text: &[u8] = if v { b"true" } else { b"false" };
        self.qs.push_key(text, false)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut b = [0; 4];
        self.qs.push_key(v.encode_utf8(&mut b).as_bytes(), false)
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        self.qs.push_key(v.as_bytes(), false)
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Self::Ok> {
        self.qs.push_key(value, false)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.qs.push_key(variant.as_bytes(), false)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, _value: &T) -> Result<Self::Ok> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::UnsupportedKey)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::UnsupportedKey)
    }
}
