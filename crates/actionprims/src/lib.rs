//! Flat transport codec, tagged action results and request sessions.
//!
//! actionprims sits between a UI layer and asynchronous actions that take one
//! structured payload and answer with a tagged success or failure.
//!
//! # Crate Structure
//!
//! - [`codec`]: structured values to and from a flat multipart-style transport
//! - [`result`]: tagged results and normalization of raw action outcomes
//! - [`session`]: request orchestration with caching, deduplication and cancellation
//!
//! # Example
//!
//! ```
//! use actionprims::codec::{decode, encode, Value};
//!
//! let value = Value::map([("tags", Value::list([Value::from("a"), Value::from("b")]))]);
//! let transport = encode(&value);
//! assert_eq!(transport.get("tags[1]").and_then(|f| f.as_text()), Some("b"));
//! assert_eq!(decode(&transport), value);
//! ```

/// Re-export codec types.
pub mod codec {
    pub use actionprims_codec::*;
}

/// Re-export result types.
pub mod result {
    pub use actionprims_result::*;
}

/// Re-export session types.
pub mod session {
    pub use actionprims_session::*;
}

pub use actionprims_codec::{decode, encode, FlatTransport, Value};
pub use actionprims_result::{wrap_action, ActionResult};
pub use actionprims_session::{Session, SessionConfig};
