// Tests for the capture seam: PCM shaping and the synthetic backend.

use serenity_companion::error::CompanionError;
use serenity_companion::media::backend::AudioFrame;
use serenity_companion::media::pcm;
use serenity_companion::media::{MediaBackend, MediaConstraints, SyntheticBackend, SyntheticConfig};

fn frame(samples: Vec<i16>, sample_rate: u32, channels: u16) -> AudioFrame {
    AudioFrame {
        samples,
        sample_rate,
        channels,
        timestamp_ms: 0,
    }
}

#[test]
fn test_downsample_decimates_to_target_rate() {
    let shaped = pcm::shape_frame(frame((0..48).collect(), 48000, 1), 16000, 1);

    assert_eq!(shaped.sample_rate, 16000);
    assert_eq!(shaped.samples.len(), 16);
    assert_eq!(&shaped.samples[..4], &[0, 3, 6, 9], "every 3rd sample kept");
}

#[test]
fn test_stereo_folds_to_mono_by_summing() {
    let shaped = pcm::shape_frame(frame(vec![100, 200, -50, 25], 16000, 2), 16000, 1);

    assert_eq!(shaped.channels, 1);
    assert_eq!(shaped.samples, vec![300, -25]);
}

#[test]
fn test_mono_summing_saturates() {
    let shaped = pcm::stereo_to_mono(frame(vec![i16::MAX, i16::MAX], 16000, 2));
    assert_eq!(shaped.samples, vec![i16::MAX]);
}

#[test]
fn test_frame_already_in_target_format_passes_through() {
    let original = frame(vec![1, 2, 3], 16000, 1);
    let shaped = pcm::shape_frame(original.clone(), 16000, 1);
    assert_eq!(shaped.samples, original.samples);
}

#[test]
fn test_le_byte_view_and_duration() {
    let bytes = pcm::to_le_bytes(&[1, -1]);
    assert_eq!(bytes, vec![0x01, 0x00, 0xFF, 0xFF]);

    // 16000 mono samples at 16kHz is exactly one second.
    assert_eq!(pcm::pcm_duration_secs(32000, 16000, 1), 1.0);
    // Degenerate formats never divide by zero.
    assert_eq!(pcm::pcm_duration_secs(32000, 0, 1), 0.0);
}

#[tokio::test]
async fn test_synthetic_backend_emits_ordered_frames() {
    let mut backend = SyntheticBackend::new(SyntheticConfig {
        frames: 4,
        samples_per_frame: 8,
        ..SyntheticConfig::default()
    });

    let stream = backend
        .start(MediaConstraints::AUDIO_VIDEO)
        .await
        .expect("synthetic backend starts");
    assert!(backend.is_capturing());

    let mut audio = stream.audio.expect("audio requested");
    for expected in 0..4i16 {
        let frame = audio.recv().await.expect("frame arrives");
        assert_eq!(frame.samples[0], expected);
        assert_eq!(frame.samples.len(), 8);
    }
    assert!(audio.recv().await.is_none(), "stream closes after last frame");

    let mut camera = stream.video.expect("video requested");
    let first = camera.next_frame().await.expect("still grabbed");
    assert_eq!((first.width, first.height), (320, 240));
    assert_eq!(&first.jpeg[..2], &[0xFF, 0xD8]);

    backend.stop().await.expect("backend stops");
    assert!(!backend.is_capturing());
}

#[tokio::test]
async fn test_synthetic_backend_can_deny_access() {
    let mut backend = SyntheticBackend::new(SyntheticConfig {
        deny_access: true,
        ..SyntheticConfig::default()
    });

    let err = backend
        .start(MediaConstraints::AUDIO_VIDEO)
        .await
        .expect_err("denied");
    assert!(matches!(err, CompanionError::DeviceAccess(_)));
    assert!(!backend.is_capturing());
}
