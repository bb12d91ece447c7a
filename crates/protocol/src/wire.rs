//! Structural validation of streamed events.
//!
//! Each frame of an event stream has a name and a JSON payload. A frame is
//! accepted only when the name is a member of the taxonomy and the payload
//! parses to the variant with that same name. Anything else is a
//! [`DecodeError`], which consumers log and drop without tearing down the
//! stream.

use crate::pipeline_events::{PipelineEvent, PipelineEventType};
use crate::run_events::{RunEvent, RunEventType};
use thiserror::Error;

/// Why a streamed frame was rejected.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The frame name is not part of the taxonomy.
    #[error("unknown event type: {name}")]
    UnknownEventType { name: String },

    /// The payload is not a valid event of the named type.
    #[error("malformed {name} payload: {source}")]
    Malformed {
        name: String,
        source: serde_json::Error,
    },

    /// The payload decoded, but its own `type` disagrees with the frame name.
    #[error("event named {name} carries a {actual} payload")]
    TypeMismatch { name: String, actual: String },
}

/// An event type that can be decoded from a named stream frame.
pub trait WireEvent: Sized + Send + 'static {
    /// Decode a frame's payload.
    ///
    /// # Arguments
    ///
    /// * `name` - The frame's event name
    /// * `data` - The frame's JSON payload
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` when the name is unknown, the payload does not
    /// parse, or the payload's `type` differs from `name`.
    fn decode(name: &str, data: &str) -> Result<Self, DecodeError>;

    /// The event's own type name.
    fn type_name(&self) -> &'static str;
}

impl WireEvent for RunEvent {
    fn decode(name: &str, data: &str) -> Result<Self, DecodeError> {
        let expected: RunEventType = name.parse().map_err(|_| DecodeError::UnknownEventType {
            name: name.to_string(),
        })?;
        let event: RunEvent = serde_json::from_str(data).map_err(|source| DecodeError::Malformed {
            name: name.to_string(),
            source,
        })?;
        if event.event_type() != expected {
            return Err(DecodeError::TypeMismatch {
                name: name.to_string(),
                actual: event.event_type().to_string(),
            });
        }
        Ok(event)
    }

    fn type_name(&self) -> &'static str {
        self.event_type().as_str()
    }
}

impl WireEvent for PipelineEvent {
    fn decode(name: &str, data: &str) -> Result<Self, DecodeError> {
        let expected: PipelineEventType =
            name.parse().map_err(|_| DecodeError::UnknownEventType {
                name: name.to_string(),
            })?;
        let event: PipelineEvent =
            serde_json::from_str(data).map_err(|source| DecodeError::Malformed {
                name: name.to_string(),
                source,
            })?;
        if event.event_type() != expected {
            return Err(DecodeError::TypeMismatch {
                name: name.to_string(),
                actual: event.event_type().to_string(),
            });
        }
        Ok(event)
    }

    fn type_name(&self) -> &'static str {
        self.event_type().as_str()
    }
}
