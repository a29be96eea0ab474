//! Scriptable in-memory decoder shared by the integration tests.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use image::{DynamicImage, RgbImage};
use vidinspect::{InspectError, MediaDecoder, MediaSource, MetadataField, frame::scaled_dimensions};

/// Decoder whose behaviour is set up field by field and which records every
/// call made against it.
#[derive(Default)]
pub struct FakeDecoder {
    pub fields: HashMap<MetadataField, String>,
    /// Native frame size; `None` means the decoder yields no frame.
    pub frame_size: Option<(u32, u32)>,
    pub scaled_frames: bool,
    pub fail_open: bool,
    pub fail_decode: bool,
    pub fail_close: bool,

    pub opened: RefCell<Vec<MediaSource>>,
    pub open_handles: Cell<usize>,
    pub closed: Cell<usize>,
    pub frame_calls: RefCell<Vec<(i64, Option<(u32, u32)>)>>,
}

pub struct FakeHandle {
    pub source: MediaSource,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: MetadataField, value: &str) -> Self {
        self.fields.insert(field, value.to_string());
        self
    }

    pub fn with_frame(mut self, width: u32, height: u32) -> Self {
        self.frame_size = Some((width, height));
        self
    }

    pub fn with_scaled_frames(mut self) -> Self {
        self.scaled_frames = true;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_decode(mut self) -> Self {
        self.fail_decode = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn last_opened(&self) -> Option<MediaSource> {
        self.opened.borrow().last().cloned()
    }

    /// Every successfully opened handle has been closed exactly once.
    pub fn assert_balanced(&self) {
        assert_eq!(
            self.open_handles.get(),
            self.closed.get(),
            "open/close calls are unbalanced",
        );
    }
}

impl MediaDecoder for FakeDecoder {
    type Handle = FakeHandle;

    fn open(&self, source: &MediaSource) -> Result<FakeHandle, InspectError> {
        self.opened.borrow_mut().push(source.clone());
        if self.fail_open {
            return Err(InspectError::SourceOpen {
                path: source.display(),
                reason: "unsupported container".to_string(),
            });
        }
        self.open_handles.set(self.open_handles.get() + 1);
        Ok(FakeHandle {
            source: source.clone(),
        })
    }

    fn extract_field(&self, _handle: &mut FakeHandle, field: MetadataField) -> Option<String> {
        self.fields.get(&field).cloned()
    }

    fn supports_scaled_frames(&self) -> bool {
        self.scaled_frames
    }

    fn frame_at(
        &self,
        handle: &mut FakeHandle,
        position_ms: i64,
        bounds: Option<(u32, u32)>,
    ) -> Result<Option<DynamicImage>, InspectError> {
        self.frame_calls.borrow_mut().push((position_ms, bounds));
        if self.fail_decode {
            return Err(InspectError::CorruptSource {
                path: handle.source.display(),
                reason: "invalid data found when processing input".to_string(),
            });
        }
        let Some((width, height)) = self.frame_size else {
            return Ok(None);
        };
        let (width, height) = match bounds {
            Some((max_width, max_height)) => {
                scaled_dimensions(width, height, max_width as i32, max_height as i32)?
                    .unwrap_or((width, height))
            }
            None => (width, height),
        };
        Ok(Some(DynamicImage::ImageRgb8(RgbImage::new(width, height))))
    }

    fn close(&self, handle: FakeHandle) -> Result<(), InspectError> {
        self.closed.set(self.closed.get() + 1);
        if self.fail_close {
            return Err(InspectError::Cleanup {
                path: handle.source.display(),
                reason: "release threw".to_string(),
            });
        }
        Ok(())
    }
}
