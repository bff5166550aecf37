//! Body decoding and response encoding collaborators of the dispatcher.

mod decode;
mod encode;
mod output;

pub use decode::weak_decode;
pub use encode::{encode, Encoded};
pub use output::{IntoOutput, Json, Output, Shape};
