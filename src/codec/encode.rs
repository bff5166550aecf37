//! Response body encoding.

use serde_json::Value;

use crate::codec::output::{Output, Shape};

/// An encoded response body and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub body: Vec<u8>,
    pub content_type: Option<&'static str>,
}

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Encode a result for the wire.
///
/// Lists and maps that are absent (null, or failed to serialize) encode as
/// `[]` and `{}` instead of `null`.
pub fn encode(output: &Output) -> Encoded {
    let json = |body: Vec<u8>| Encoded { body, content_type: Some(JSON) };
    let nothing = || Encoded { body: Vec::new(), content_type: None };

    match (output.shape(), output.value()) {
        (Shape::Empty, _) => nothing(),
        (Shape::Sequence, None | Some(Value::Null)) => json(b"[]".to_vec()),
        (Shape::Mapping, None | Some(Value::Null)) => json(b"{}".to_vec()),
        (_, None) => nothing(),
        (Shape::Text, Some(Value::String(text))) => Encoded {
            body: text.clone().into_bytes(),
            content_type: Some(TEXT),
        },
        (_, Some(value)) => json(serde_json::to_vec(value).unwrap_or_default()),
    }
}
