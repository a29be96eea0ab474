//! Plugin channel surface.
//!
//! A host runtime talks to the inspector with loosely-typed method calls:
//! a method name plus a JSON argument object. [`MediaInspector::handle_call`]
//! dispatches them and turns results into [`ChannelReply`] values. Errors
//! cross the boundary as a channel label and a message, nothing more.
//!
//! | Method | Aliases | Arguments | Success reply |
//! |--------|---------|-----------|---------------|
//! | `getMediaInfo` | | `path` | info object |
//! | `getFrame` | `getByteThumbnail` | `path`, `position`, `maxWidth`, `maxHeight`, `quality` | JPEG bytes or empty |
//! | `deriveGifName` | `getGifName` | `path` | string |
//! | `purgeCache` | `deleteAllCache` | | bool or null |

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde_json::{Value, json};

use crate::{
    decoder::MediaDecoder, error::InspectError, frame, frame::FrameOutcome,
    frame::FrameRequest, inspector::MediaInspector,
};

/// Message sent when a frame could not be decoded.
pub const CORRUPT_SOURCE_MESSAGE: &str = "Assume this is a corrupt video file";

/// Message sent when releasing a retriever failed.
pub const CLEANUP_FAILURE_MESSAGE: &str = "Ignore failures while cleaning up";

/// One incoming call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// Method name.
    pub method: String,
    /// Argument object (`Value::Null` when there are none).
    pub arguments: Value,
}

impl MethodCall {
    /// Build a call from a method name and its arguments.
    pub fn new<S: Into<String>>(method: S, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    fn string_argument(&self, name: &str) -> Result<&str, InspectError> {
        self.arguments
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| InspectError::InvalidArgument {
                name: name.to_string(),
                reason: "expected a string".to_string(),
            })
    }

    fn integer_argument(&self, name: &str, default: i64) -> Result<i64, InspectError> {
        match self.arguments.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value.as_i64().ok_or_else(|| InspectError::InvalidArgument {
                name: name.to_string(),
                reason: format!("expected an integer, got {value}"),
            }),
        }
    }
}

/// An error as seen by the host: a channel label and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelError {
    /// Channel the error was reported on.
    pub channel: String,
    /// Human-readable message.
    pub message: String,
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}] {}", self.channel, self.message)
    }
}

/// Reply to one call.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelReply {
    /// A JSON result.
    Success(Value),
    /// Encoded image bytes.
    Bytes(Vec<u8>),
    /// The call succeeded but produced nothing (no frame decoded).
    Empty,
    /// The call failed.
    Error(ChannelError),
}

/// Everything the host is told about one call.
///
/// `cleanup` carries a retriever release failure. It is reported alongside
/// `reply` and never replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelResponse {
    /// Primary reply.
    pub reply: ChannelReply,
    /// Release failure, if one happened.
    pub cleanup: Option<ChannelError>,
}

impl ChannelResponse {
    fn reply(reply: ChannelReply) -> Self {
        Self {
            reply,
            cleanup: None,
        }
    }
}

impl<D: MediaDecoder> MediaInspector<D> {
    /// Dispatch one channel call.
    pub fn handle_call(&self, call: &MethodCall) -> ChannelResponse {
        log::debug!("Channel call {}", call.method);
        let outcome = match call.method.as_str() {
            "getMediaInfo" => self.call_media_info(call),
            "getFrame" | "getByteThumbnail" => return self.call_frame(call),
            "deriveGifName" | "getGifName" => call
                .string_argument("path")
                .map(|path| ChannelReply::Success(json!(self.derive_gif_name(path)))),
            "purgeCache" | "deleteAllCache" => Ok(ChannelReply::Success(match self.purge_cache() {
                Some(purged) => Value::Bool(purged),
                None => Value::Null,
            })),
            other => Err(InspectError::UnknownMethod(other.to_string())),
        };

        ChannelResponse::reply(outcome.unwrap_or_else(|error| self.error_reply(error.to_string())))
    }

    fn call_media_info(&self, call: &MethodCall) -> Result<ChannelReply, InspectError> {
        let path = call.string_argument("path")?;
        let info = self.get_media_info(path)?;
        Ok(ChannelReply::Success(info.to_json()))
    }

    fn call_frame(&self, call: &MethodCall) -> ChannelResponse {
        let arguments = call.string_argument("path").and_then(|path| {
            let request = FrameRequest {
                position_ms: call.integer_argument("position", 0)?,
                max_width: clamp_to_i32(call.integer_argument("maxWidth", 0)?),
                max_height: clamp_to_i32(call.integer_argument("maxHeight", 0)?),
            };
            let quality = call.integer_argument("quality", i64::from(self.options.jpeg_quality()))?;
            Ok((path, request, quality.clamp(1, 100) as u8))
        });
        let (path, request, quality) = match arguments {
            Ok(arguments) => arguments,
            Err(error) => return ChannelResponse::reply(self.error_reply(error.to_string())),
        };

        let report = self.frame_report(path, &request);

        let reply = match report.decode {
            Ok(FrameOutcome::Decoded(image)) => match frame::encode_jpeg(&image, quality) {
                Ok(bytes) => ChannelReply::Bytes(bytes),
                Err(error) => self.error_reply(error.to_string()),
            },
            Ok(FrameOutcome::Empty) => ChannelReply::Empty,
            Err(error) => {
                log::warn!("{error}");
                self.error_reply(CORRUPT_SOURCE_MESSAGE.to_string())
            }
        };

        let cleanup = report.release.err().map(|error| {
            log::warn!("{error}");
            self.channel_error(CLEANUP_FAILURE_MESSAGE.to_string())
        });

        ChannelResponse { reply, cleanup }
    }

    fn channel_error(&self, message: String) -> ChannelError {
        ChannelError {
            channel: self.options.channel_name().to_string(),
            message,
        }
    }

    fn error_reply(&self, message: String) -> ChannelReply {
        ChannelReply::Error(self.channel_error(message))
    }
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
