use actionprims_codec::{encode, FlatTransport, Value};

/// Request payload: either structured, or already flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Structured(Value),
    Flat(FlatTransport),
}

impl Payload {
    /// Flatten for the action. Flat payloads pass through unchanged.
    pub fn to_transport(&self) -> FlatTransport {
        match self {
            Payload::Flat(transport) => transport.clone(),
            Payload::Structured(value) => encode(value),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

impl From<FlatTransport> for Payload {
    fn from(transport: FlatTransport) -> Self {
        Payload::Flat(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_payload_passes_through() {
        let mut transport = FlatTransport::new();
        transport.append("a[0]", "x");
        transport.append("a[0]", "y");
        assert_eq!(Payload::from(transport.clone()).to_transport(), transport);
    }

    #[test]
    fn structured_payload_is_encoded() {
        let payload = Payload::from(Value::map([("q", Value::from("rust"))]));
        let transport = payload.to_transport();
        assert_eq!(transport.get("q").and_then(|v| v.as_text()), Some("rust"));
    }
}
