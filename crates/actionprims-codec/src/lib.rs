//! Bidirectional codec between nested structured values and a flat,
//! form-style key/value transport.
//!
//! Every leaf of a [`Value`] becomes one [`FlatTransport`] entry whose key
//! encodes its position:
//! - nested map keys chain with `.` (`user.profile.age`)
//! - list indices follow their parent as `[n]` (`tags[0]`, `files[2].name`)
//! - binary attachments are carried as-is, everything else as text
//!
//! Decoding walks the keys back into containers and re-infers scalar types
//! from text. That inference is deliberately lossy: a string that looks like a
//! number, boolean or ISO-8601 date-time comes back as one.

pub mod decode;
pub mod encode;
pub mod error;
pub mod infer;
pub mod transport;
pub mod value;

pub use decode::{decode, split_key, try_decode};
pub use encode::{encode, encode_with_prefix};
pub use error::{CodecError, Result};
pub use infer::{format_date, format_number, infer_value};
pub use transport::{FieldValue, FlatTransport};
pub use value::{Attachment, Value};
