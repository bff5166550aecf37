//! Permissive decoding of the argument bag into handler input structs.
//!
//! Request arguments arrive as strings far more often than as typed JSON, so
//! the decoder coerces scalars in whichever direction the target asks for,
//! matches field names case-insensitively and keeps defaults for anything the
//! request did not supply.

use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeOwned, Deserializer, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use serde::Serialize;
use serde_json::{Error, Map, Value};

/// Decode `args` into `T`, starting from `T::default()`.
///
/// Unknown keys are ignored. Fields not present in `args` keep their default.
pub fn weak_decode<T>(args: &Map<String, Value>) -> Result<T, Error>
where
    T: DeserializeOwned + Serialize + Default,
{
    match serde_json::to_value(T::default())? {
        Value::Object(mut target) => {
            overlay(&mut target, args);
            T::deserialize(WeakValue(Value::Object(target)))
        }
        // Map-like or otherwise unstructured targets take the bag as-is.
        _ => T::deserialize(WeakValue(Value::Object(args.clone()))),
    }
}

fn overlay(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        let canonical = target
            .keys()
            .find(|existing| existing.eq_ignore_ascii_case(key))
            .cloned()
            .unwrap_or_else(|| key.clone());

        match (target.get_mut(&canonical), value) {
            (Some(Value::Object(nested)), Value::Object(incoming)) => overlay(nested, incoming),
            _ => {
                target.insert(canonical, value.clone());
            }
        }
    }
}

fn canonical_fields(fields: Map<String, Value>, names: &'static [&'static str]) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| {
            let key = match names.iter().find(|name| name.eq_ignore_ascii_case(&key)) {
                Some(name) => (*name).to_string(),
                None => key,
            };
            (key, value)
        })
        .collect()
}

fn parse_signed(s: &str) -> Result<i64, Error> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }
    s.parse()
        .map_err(|_| de::Error::custom(format!("cannot read {s:?} as a signed integer")))
}

fn parse_unsigned(s: &str) -> Result<u64, Error> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }
    s.parse()
        .map_err(|_| de::Error::custom(format!("cannot read {s:?} as an unsigned integer")))
}

fn parse_float(s: &str) -> Result<f64, Error> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    s.parse()
        .map_err(|_| de::Error::custom(format!("cannot read {s:?} as a number")))
}

fn parse_bool(s: &str) -> Result<bool, Error> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "f" | "false" => Ok(false),
        "1" | "t" | "true" => Ok(true),
        other => Err(de::Error::custom(format!("cannot read {other:?} as a bool"))),
    }
}

/// A JSON value deserialized with weak typing.
struct WeakValue(Value);

impl WeakValue {
    fn visit_array<'de, V: Visitor<'de>>(items: Vec<Value>, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_seq(SeqDeserializer::new(items.into_iter().map(WeakValue)))
    }

    fn visit_object<'de, V: Visitor<'de>>(fields: Map<String, Value>, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_map(MapDeserializer::new(
            fields.into_iter().map(|(key, value)| (key, WeakValue(value))),
        ))
    }
}

impl<'de> IntoDeserializer<'de, Error> for WeakValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

macro_rules! weak_signed {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            match self.0 {
                Value::String(s) => visitor.visit_i64(parse_signed(&s)?),
                Value::Bool(b) => visitor.visit_i64(i64::from(b)),
                Value::Null => visitor.visit_i64(0),
                Value::Number(n) if n.is_f64() => visitor.visit_i64(n.as_f64().unwrap_or_default() as i64),
                other => WeakValue(other).deserialize_any(visitor),
            }
        }
    )*};
}

macro_rules! weak_unsigned {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            match self.0 {
                Value::String(s) => visitor.visit_u64(parse_unsigned(&s)?),
                Value::Bool(b) => visitor.visit_u64(u64::from(b)),
                Value::Null => visitor.visit_u64(0),
                Value::Number(n) if n.is_f64() => visitor.visit_u64(n.as_f64().unwrap_or_default() as u64),
                other => WeakValue(other).deserialize_any(visitor),
            }
        }
    )*};
}

macro_rules! weak_float {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            match self.0 {
                Value::String(s) => visitor.visit_f64(parse_float(&s)?),
                Value::Bool(b) => visitor.visit_f64(if b { 1.0 } else { 0.0 }),
                Value::Null => visitor.visit_f64(0.0),
                other => WeakValue(other).deserialize_any(visitor),
            }
        }
    )*};
}

impl<'de> Deserializer<'de> for WeakValue {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else {
                    visitor.visit_f64(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => Self::visit_array(items, visitor),
            Value::Object(fields) => Self::visit_object(fields, visitor),
        }
    }

    weak_signed! { deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 }
    weak_unsigned! { deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 }
    weak_float! { deserialize_f32 deserialize_f64 }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::String(s) => visitor.visit_bool(parse_bool(&s)?),
            Value::Number(n) => visitor.visit_bool(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::Null => visitor.visit_bool(false),
            other => WeakValue(other).deserialize_any(visitor),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Number(n) => visitor.visit_string(n.to_string()),
            Value::Bool(b) => visitor.visit_string(b.to_string()),
            Value::Null => visitor.visit_string(String::new()),
            other => WeakValue(other).deserialize_any(visitor),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_string(visitor)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_string(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(WeakValue(other)),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Null => visitor.visit_unit(),
            other => WeakValue(other).deserialize_any(visitor),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    // A lone value where a list is expected becomes a one-element list.
    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Array(items) => Self::visit_array(items, visitor),
            Value::Null => Self::visit_array(Vec::new(), visitor),
            other => Self::visit_array(vec![other], visitor),
        }
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Null => Self::visit_object(Map::new(), visitor),
            other => WeakValue(other).deserialize_any(visitor),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        match self.0 {
            Value::Object(map) => Self::visit_object(canonical_fields(map, fields), visitor),
            Value::Null => Self::visit_object(Map::new(), visitor),
            other => WeakValue(other).deserialize_any(visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        match self.0 {
            Value::String(s) => visitor.visit_enum(<String as IntoDeserializer<'de, Error>>::into_deserializer(s)),
            other => other.deserialize_enum(name, variants, visitor),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bytes byte_buf unit_struct tuple tuple_struct identifier
    }
}
