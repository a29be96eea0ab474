//! MediaInspector behaviour against a scripted decoder.
//!
//! These tests need no media files: the fake decoder reports whatever
//! metadata and frame sizes each scenario calls for.

mod common;

use std::{fs, path::PathBuf};

use common::FakeDecoder;
use vidinspect::{
    ErrorKind, FrameOutcome, FrameRequest, InspectError, InspectorOptions, MediaInspector,
    MediaSource, MetadataField, Retriever,
};

fn inspector(decoder: FakeDecoder) -> MediaInspector<FakeDecoder> {
    MediaInspector::new(decoder, InspectorOptions::new())
}

fn hd_decoder() -> FakeDecoder {
    FakeDecoder::new()
        .with_field(MetadataField::VideoWidth, "1920")
        .with_field(MetadataField::VideoHeight, "1080")
}

fn decoded_size(outcome: FrameOutcome) -> (u32, u32) {
    let image = outcome.into_image().expect("Expected a decoded frame");
    (image.width(), image.height())
}

// ── Metadata ─────────────────────────────────────────────────────

#[test]
fn rotated_clip_reports_display_dimensions() {
    let inspector = inspector(
        hd_decoder()
            .with_field(MetadataField::Rotation, "90")
            .with_field(MetadataField::Duration, "5000")
            .with_field(MetadataField::Title, "Beach")
            .with_field(MetadataField::Author, "Sam"),
    );

    let info = inspector
        .get_media_info("/sdcard/clip.mp4")
        .expect("Failed to read info");

    assert_eq!(info.path, "/sdcard/clip.mp4");
    assert_eq!((info.width, info.height), (1080, 1920));
    assert_eq!(info.orientation, Some(90));
    assert_eq!(info.duration, 5000);
    assert_eq!(info.title, "Beach");
    assert_eq!(info.author, "Sam");
    inspector.decoder().assert_balanced();
}

#[test]
fn only_quarter_turns_swap_dimensions() {
    for (orientation, expected) in [
        ("0", (1920, 1080)),
        ("90", (1080, 1920)),
        ("180", (1920, 1080)),
        ("270", (1080, 1920)),
    ] {
        let inspector = inspector(hd_decoder().with_field(MetadataField::Rotation, orientation));
        let info = inspector.get_media_info("/v.mp4").expect("Failed to read info");
        assert_eq!(
            (info.width, info.height),
            expected,
            "orientation {orientation}",
        );
        assert_eq!(info.orientation, orientation.parse::<i32>().ok());
    }
}

#[test]
fn missing_metadata_uses_defaults() {
    let inspector = inspector(FakeDecoder::new());
    let info = inspector
        .get_media_info("content://media/external/video/7")
        .expect("Missing fields must not fail");

    assert_eq!(info.title, "");
    assert_eq!(info.author, "");
    assert_eq!(info.width, 0);
    assert_eq!(info.height, 0);
    assert_eq!(info.duration, 0);
    assert_eq!(info.filesize, 0);
    assert_eq!(info.orientation, None);
    assert!(info.to_json().get("orientation").is_none());
    inspector.decoder().assert_balanced();
}

#[test]
fn unparseable_orientation_is_omitted() {
    let inspector = inspector(hd_decoder().with_field(MetadataField::Rotation, "sideways"));
    let info = inspector.get_media_info("/v.mp4").expect("Failed to read info");
    assert_eq!(info.orientation, None);
    assert_eq!((info.width, info.height), (1920, 1080));
}

#[test]
fn metadata_goes_through_the_resolver() {
    let inspector = inspector(FakeDecoder::new());
    inspector
        .get_media_info("/sdcard/clip.mp4")
        .expect("Failed to read info");
    assert_eq!(
        inspector.decoder().last_opened(),
        Some(MediaSource::Resolver("/sdcard/clip.mp4".to_string())),
    );
}

#[test]
fn filesize_comes_from_the_filesystem() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video = directory.path().join("clip.mp4");
    fs::write(&video, vec![0_u8; 1234]).expect("Failed to write file");

    let inspector = inspector(FakeDecoder::new());
    let info = inspector
        .get_media_info(video.to_str().expect("utf-8 path"))
        .expect("Failed to read info");
    assert_eq!(info.filesize, 1234);
}

#[test]
fn unopenable_source_is_a_source_error() {
    let inspector = inspector(FakeDecoder::new().failing_open());
    let error = inspector
        .get_media_info("/broken.mp4")
        .expect_err("Open failure must propagate");

    assert_eq!(error.kind(), ErrorKind::Source);
    assert!(
        error.to_string().contains("Failed to open media source"),
        "unexpected message: {error}",
    );
    assert_eq!(inspector.decoder().closed.get(), 0);
}

#[test]
fn metadata_release_failure_still_returns_record() {
    let inspector = inspector(hd_decoder().failing_close());
    let info = inspector.get_media_info("/v.mp4").expect("Record expected");
    assert_eq!(info.width, 1920);
    assert_eq!(inspector.decoder().closed.get(), 1);
}

// ── Frames ───────────────────────────────────────────────────────

#[test]
fn file_uri_uses_local_fast_path() {
    let inspector = inspector(FakeDecoder::new().with_frame(64, 48));
    inspector
        .get_frame("file:///tmp/x.mov", &FrameRequest::at(0))
        .expect("Frame expected");
    assert_eq!(
        inspector.decoder().last_opened(),
        Some(MediaSource::LocalFile(PathBuf::from("/tmp/x.mov"))),
    );
}

#[test]
fn other_uris_use_the_resolver() {
    let inspector = inspector(FakeDecoder::new().with_frame(64, 48));
    inspector
        .get_frame("content://media/7", &FrameRequest::at(0))
        .expect("Frame expected");
    assert_eq!(
        inspector.decoder().last_opened(),
        Some(MediaSource::Resolver("content://media/7".to_string())),
    );
}

#[test]
fn unbounded_request_returns_native_frame() {
    let inspector = inspector(FakeDecoder::new().with_frame(1920, 1080).with_scaled_frames());
    let outcome = inspector
        .get_frame("/v.mp4", &FrameRequest::at(1_000).with_bounds(0, -1))
        .expect("Frame expected");

    assert_eq!(decoded_size(outcome), (1920, 1080));
    assert_eq!(*inspector.decoder().frame_calls.borrow(), vec![(1_000, None)]);
}

#[test]
fn width_bound_resamples_native_frame() {
    let inspector = inspector(FakeDecoder::new().with_frame(1920, 1080));
    let outcome = inspector
        .get_frame("/v.mp4", &FrameRequest::at(0).with_bounds(480, 0))
        .expect("Frame expected");

    assert_eq!(decoded_size(outcome), (480, 270));
    assert_eq!(*inspector.decoder().frame_calls.borrow(), vec![(0, None)]);
}

#[test]
fn height_bound_resamples_native_frame() {
    let inspector = inspector(FakeDecoder::new().with_frame(1000, 333).with_scaled_frames());
    let outcome = inspector
        .get_frame("/v.mp4", &FrameRequest::at(0).with_bounds(0, 111))
        .expect("Frame expected");

    assert_eq!(decoded_size(outcome), (333, 111));
    // A single bound never uses decoder-side scaling.
    assert_eq!(*inspector.decoder().frame_calls.borrow(), vec![(0, None)]);
}

#[test]
fn both_bounds_use_decoder_scaling_when_supported() {
    let inspector = inspector(FakeDecoder::new().with_frame(1920, 1080).with_scaled_frames());
    let outcome = inspector
        .get_frame("/v.mp4", &FrameRequest::at(2_500).with_bounds(320, 320))
        .expect("Frame expected");

    assert_eq!(decoded_size(outcome), (320, 180));
    assert_eq!(
        *inspector.decoder().frame_calls.borrow(),
        vec![(2_500, Some((320, 320)))],
    );
}

#[test]
fn both_bounds_resample_when_decoder_cannot_scale() {
    let inspector = inspector(FakeDecoder::new().with_frame(1920, 1080));
    let outcome = inspector
        .get_frame("/v.mp4", &FrameRequest::at(0).with_bounds(320, 320))
        .expect("Frame expected");

    assert_eq!(decoded_size(outcome), (320, 180));
    assert_eq!(*inspector.decoder().frame_calls.borrow(), vec![(0, None)]);
}

#[test]
fn missing_frame_is_an_explicit_empty_outcome() {
    let inspector = inspector(FakeDecoder::new());
    let outcome = inspector
        .get_frame("/audio_only.mp4", &FrameRequest::at(0))
        .expect("No frame is not an error");

    assert!(outcome.is_empty());
    inspector.decoder().assert_balanced();
}

#[test]
fn decode_failure_is_corrupt_source_and_still_releases() {
    let inspector = inspector(FakeDecoder::new().with_frame(64, 48).failing_decode());
    let error = inspector
        .get_frame("/v.mp4", &FrameRequest::at(0))
        .expect_err("Decode failure must propagate");

    assert!(matches!(error, InspectError::CorruptSource { .. }));
    assert!(error.to_string().starts_with("Assume this is a corrupt video file"));
    assert_eq!(inspector.decoder().closed.get(), 1);
}

#[test]
fn oversized_bounds_fail_before_resampling() {
    let inspector = inspector(FakeDecoder::new().with_frame(2, 2));
    let error = inspector
        .get_frame("/v.mp4", &FrameRequest::at(0).with_bounds(i32::MAX, 0))
        .expect_err("Oversized target must be rejected");

    assert!(matches!(error, InspectError::CorruptSource { .. }), "{error}");
    assert!(error.to_string().contains("pixel limit"), "{error}");
    inspector.decoder().assert_balanced();
}

#[test]
fn oversized_bounds_fail_in_decoder_scaling() {
    let inspector = inspector(FakeDecoder::new().with_frame(2, 2).with_scaled_frames());
    let report = inspector.frame_report(
        "/v.mp4",
        &FrameRequest::at(0).with_bounds(i32::MAX, i32::MAX),
    );

    assert!(matches!(report.decode, Err(InspectError::CorruptSource { .. })));
    assert!(report.release.is_ok());
    assert_eq!(inspector.decoder().closed.get(), 1);
}

#[test]
fn open_failure_during_frame_extraction_is_corrupt_source() {
    let inspector = inspector(FakeDecoder::new().failing_open());
    let report = inspector.frame_report("/v.mp4", &FrameRequest::at(0));

    assert!(matches!(report.decode, Err(InspectError::CorruptSource { .. })));
    assert!(report.release.is_ok());
    assert_eq!(inspector.decoder().closed.get(), 0);
}

#[test]
fn release_failure_does_not_mask_decode_failure() {
    let inspector = inspector(
        FakeDecoder::new()
            .with_frame(64, 48)
            .failing_decode()
            .failing_close(),
    );
    let report = inspector.frame_report("/v.mp4", &FrameRequest::at(0));

    assert!(matches!(report.decode, Err(InspectError::CorruptSource { .. })));
    let release_error = report.release.as_ref().expect_err("Release error expected");
    assert_eq!(release_error.kind(), ErrorKind::Cleanup);
    assert_eq!(inspector.decoder().closed.get(), 1);

    let error = report.into_result().expect_err("Decode error wins");
    assert_eq!(error.kind(), ErrorKind::Source);
}

#[test]
fn release_failure_after_success_is_reported_separately() {
    let inspector = inspector(FakeDecoder::new().with_frame(64, 48).failing_close());
    let report = inspector.frame_report("/v.mp4", &FrameRequest::at(0));

    assert!(report.release.is_err());
    let outcome = report.decode.expect("Frame expected");
    assert_eq!(decoded_size(outcome), (64, 48));
}

#[test]
fn every_call_releases_exactly_once() {
    let inspector = inspector(hd_decoder().with_frame(64, 48));
    for position in [0, 100, 200] {
        inspector
            .get_frame("/v.mp4", &FrameRequest::at(position))
            .expect("Frame expected");
    }
    inspector.get_media_info("/v.mp4").expect("Info expected");

    assert_eq!(inspector.decoder().open_handles.get(), 4);
    inspector.decoder().assert_balanced();
}

#[test]
fn dropped_retriever_closes_its_handle() {
    let decoder = FakeDecoder::new();
    {
        let mut retriever = Retriever::open(&decoder, &MediaSource::from_path("/v.mp4"))
            .expect("Open expected");
        assert_eq!(retriever.field(MetadataField::Title), None);
    }
    assert_eq!(decoder.closed.get(), 1);

    let retriever =
        Retriever::open(&decoder, &MediaSource::from_path("/v.mp4")).expect("Open expected");
    retriever.release().expect("Release expected");
    assert_eq!(decoder.closed.get(), 2);
    decoder.assert_balanced();
}

// ── Helpers ──────────────────────────────────────────────────────

#[test]
fn gif_name_and_cache_helpers() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video = directory.path().join("video.mp4");
    fs::write(&video, b"").expect("Failed to write file");

    let configured = MediaInspector::new(
        FakeDecoder::new(),
        InspectorOptions::new().with_cache_root(directory.path()),
    );
    assert_eq!(
        configured.derive_gif_name(video.to_str().expect("utf-8 path")),
        "video.gif"
    );
    assert_eq!(configured.derive_gif_name("/a/b/video.mp4"), "");

    let cache = directory.path().join(vidinspect::CACHE_DIRECTORY_NAME);
    fs::create_dir_all(cache.join("nested")).expect("Failed to create cache");
    fs::write(cache.join("nested/out.mp4"), b"x").expect("Failed to write");
    assert_eq!(configured.purge_cache(), Some(true));
    assert!(!cache.exists());
    assert!(video.exists());

    assert_eq!(inspector(FakeDecoder::new()).purge_cache(), None);
}
