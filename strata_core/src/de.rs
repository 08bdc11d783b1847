//! Weakly typed serde decoding of `Value` trees.
//!
//! Scalars are coerced to whatever the target type asks for (`"8080"` into a
//! `u16`, `"yes"` into a `bool`, `5` into a `String`), a single scalar is
//! lifted into a one-element sequence, and `Nil` decodes as an empty map or
//! sequence so `#[serde(default)]` fields fill in.

use crate::cast;
use crate::types::{format_duration, format_time, Value};
use errors::ConfigError;
use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{DeserializeOwned, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

/// Decode `value` into `T` with weak type coercion.
pub fn from_value<T: DeserializeOwned>(value: Value) -> errors::Result<T> {
    T::deserialize(WeakDeserializer::new(value))
}

pub struct WeakDeserializer {
    value: Value
}

impl WeakDeserializer {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    fn mismatch(&self, expected: &str) -> ConfigError {
        ConfigError::decode(format!(
            "expected {expected}, found {} `{}`",
            self.value.kind(),
            self.value
        ))
    }
}

impl<'de> IntoDeserializer<'de, ConfigError> for Value {
    type Deserializer = WeakDeserializer;

    fn into_deserializer(self) -> Self::Deserializer {
        WeakDeserializer::new(self)
    }
}

macro_rules! deserialize_signed {
    ($($method:ident),*) => {
        $(fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            match cast::to_i64(&self.value) {
                Some(i) => visitor.visit_i64(i),
                None => Err(self.mismatch("an integer"))
            }
        })*
    };
}

macro_rules! deserialize_unsigned {
    ($($method:ident),*) => {
        $(fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            match cast::to_i64(&self.value).and_then(|i| u64::try_from(i).ok()) {
                Some(u) => visitor.visit_u64(u),
                None => Err(self.mismatch("an unsigned integer"))
            }
        })*
    };
}

impl<'de> serde::Deserializer<'de> for WeakDeserializer {
    type Error = ConfigError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Nil => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Time(t) => visitor.visit_string(format_time(&t)),
            Value::Duration(d) => visitor.visit_string(format_duration(d)),
            Value::List(items) => {
                let mut seq: SeqDeserializer<_, ConfigError> =
                    SeqDeserializer::new(items.into_iter());
                let out = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(out)
            }
            Value::Map(map) => {
                let mut access: MapDeserializer<'de, _, ConfigError> =
                    MapDeserializer::new(map.into_iter());
                let out = visitor.visit_map(&mut access)?;
                access.end()?;
                Ok(out)
            }
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match cast::to_bool(&self.value) {
            Some(b) => visitor.visit_bool(b),
            None => Err(self.mismatch("a boolean"))
        }
    }

    deserialize_signed!(deserialize_i8, deserialize_i16, deserialize_i32, deserialize_i64);
    deserialize_unsigned!(deserialize_u8, deserialize_u16, deserialize_u32, deserialize_u64);

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match cast::to_f64(&self.value) {
            Some(f) => visitor.visit_f64(f),
            None => Err(self.mismatch("a number"))
        }
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_string(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::String(s) => visitor.visit_string(s),
            Value::Nil => visitor.visit_string(String::new()),
            Value::List(_) | Value::Map(_) => Err(self.mismatch("a string")),
            other => visitor.visit_string(other.to_string())
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::String(s) => visitor.visit_byte_buf(s.into_bytes()),
            _ => self.deserialize_any(visitor)
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Nil => visitor.visit_none(),
            _ => visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::List(_) => self.deserialize_any(visitor),
            Value::Nil => {
                let empty: SeqDeserializer<_, ConfigError> =
                    SeqDeserializer::new(std::iter::empty::<Value>());
                visitor.visit_seq(empty)
            }
            Value::Map(_) => Err(self.mismatch("a sequence")),
            scalar => {
                let mut seq: SeqDeserializer<_, ConfigError> =
                    SeqDeserializer::new(std::iter::once(scalar));
                let out = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(out)
            }
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Map(_) => self.deserialize_any(visitor),
            Value::Nil => {
                let empty: MapDeserializer<'de, _, ConfigError> =
                    MapDeserializer::new(std::iter::empty::<(String, Value)>());
                visitor.visit_map(empty)
            }
            _ => Err(self.mismatch("a map"))
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::String(s) => {
                let variant: serde::de::value::StringDeserializer<ConfigError> =
                    s.into_deserializer();
                visitor.visit_enum(variant)
            }
            _ => Err(self.mismatch("an enum variant name"))
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(
        self,
        visitor: V
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        i128 u128
    }
}
