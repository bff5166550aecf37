//! Handler results on their way to the response encoder.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::service::Error;

/// What kind of data a result stands for, kept even when the data itself is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A list; encodes as `[]` when absent.
    Sequence,
    /// A keyed map or struct; encodes as `{}` when absent.
    Mapping,
    /// Plain text written to the body unquoted.
    Text,
    /// Any other JSON value.
    Scalar,
    /// No result at all.
    Empty,
}

/// The result of a request as seen by out-filters and the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    value: Option<Value>,
    shape: Shape,
}

impl Output {
    /// A result carrying nothing; encodes to an empty body.
    pub fn empty() -> Self {
        Self { value: None, shape: Shape::Empty }
    }

    /// Wrap a JSON value, deriving the shape from it.
    pub fn new(value: Value) -> Self {
        let shape = match value {
            Value::Array(_) => Shape::Sequence,
            Value::Object(_) => Shape::Mapping,
            _ => Shape::Scalar,
        };
        Self { value: Some(value), shape }
    }

    /// Plain-text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            value: Some(Value::String(text.into())),
            shape: Shape::Text,
        }
    }

    pub fn with_shape(value: Option<Value>, shape: Shape) -> Self {
        Self { value, shape }
    }

    /// Serialize `data` with a known shape.
    ///
    /// A serialization failure is logged and leaves the value absent, so the
    /// encoder can still emit the empty token for the shape.
    pub fn serialize<T: Serialize + ?Sized>(data: &T, shape: Shape) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self { value: Some(value), shape },
            Err(e) => {
                warn!("Failed to serialize result: {e}");
                Self { value: None, shape }
            }
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}

/// Serialize any value as a JSON result whose shape follows the serialized form.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

/// Conversion of a handler's return value into an [`Output`].
///
/// `Err` values of a returned `Result` surface as [`Error::Handler`].
pub trait IntoOutput {
    fn into_output(self) -> Result<Output, Error>;
}

impl IntoOutput for Output {
    fn into_output(self) -> Result<Output, Error> {
        Ok(self)
    }
}

impl IntoOutput for () {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::empty())
    }
}

impl IntoOutput for Value {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::new(self))
    }
}

impl IntoOutput for String {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::text(self))
    }
}

impl IntoOutput for &'static str {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::text(self))
    }
}

macro_rules! scalar_output {
    ($($ty:ty)*) => {$(
        impl IntoOutput for $ty {
            fn into_output(self) -> Result<Output, Error> {
                Ok(Output::serialize(&self, Shape::Scalar))
            }
        }
    )*};
}

scalar_output! { bool i8 i16 i32 i64 u8 u16 u32 u64 usize isize f32 f64 }

impl<T: Serialize> IntoOutput for Json<T> {
    fn into_output(self) -> Result<Output, Error> {
        match serde_json::to_value(&self.0) {
            Ok(value) => Ok(Output::new(value)),
            Err(e) => {
                warn!("Failed to serialize result: {e}");
                Ok(Output::with_shape(None, Shape::Scalar))
            }
        }
    }
}

impl<T: Serialize> IntoOutput for Vec<T> {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::serialize(&self, Shape::Sequence))
    }
}

impl<T: Serialize> IntoOutput for Option<Vec<T>> {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::serialize(&self, Shape::Sequence))
    }
}

impl<K: Serialize + Eq + Hash, V: Serialize> IntoOutput for HashMap<K, V> {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::serialize(&self, Shape::Mapping))
    }
}

impl<K: Serialize + Eq + Hash, V: Serialize> IntoOutput for Option<HashMap<K, V>> {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::serialize(&self, Shape::Mapping))
    }
}

impl<K: Serialize + Ord, V: Serialize> IntoOutput for BTreeMap<K, V> {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::serialize(&self, Shape::Mapping))
    }
}

impl<K: Serialize + Ord, V: Serialize> IntoOutput for Option<BTreeMap<K, V>> {
    fn into_output(self) -> Result<Output, Error> {
        Ok(Output::serialize(&self, Shape::Mapping))
    }
}

impl<T, E> IntoOutput for Result<T, E>
where
    T: IntoOutput,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn into_output(self) -> Result<Output, Error> {
        match self {
            Ok(value) => value.into_output(),
            Err(e) => Err(Error::Handler(e.into())),
        }
    }
}
