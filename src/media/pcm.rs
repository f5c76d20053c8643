//! PCM frame shaping for the outbound audio path.

use super::backend::AudioFrame;

/// Shape a captured frame to the wire format: downsample and fold to
/// mono as needed.
pub fn shape_frame(frame: AudioFrame, target_sample_rate: u32, target_channels: u16) -> AudioFrame {
    let mut processed = frame;

    if processed.sample_rate != target_sample_rate {
        processed = downsample_frame(processed, target_sample_rate);
    }

    if processed.channels != target_channels && target_channels == 1 {
        processed = stereo_to_mono(processed);
    }

    processed
}

/// Downsample by decimation
pub fn downsample_frame(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    if frame.sample_rate == target_rate {
        return frame;
    }

    let ratio = frame.sample_rate / target_rate;
    if ratio <= 1 {
        return frame; // Can't upsample
    }

    // Decimate: take every Nth sample
    let downsampled: Vec<i16> = frame
        .samples
        .iter()
        .step_by(ratio as usize)
        .copied()
        .collect();

    AudioFrame {
        samples: downsampled,
        sample_rate: target_rate,
        channels: frame.channels,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Convert stereo to mono by summing channels
pub fn stereo_to_mono(frame: AudioFrame) -> AudioFrame {
    if frame.channels == 1 {
        return frame;
    }

    if frame.channels != 2 {
        return frame; // Only support stereo -> mono
    }

    let mut mono_samples = Vec::with_capacity(frame.samples.len() / 2);

    // Sum left and right channels (no division to preserve volume)
    for chunk in frame.samples.chunks_exact(2) {
        let left = chunk[0] as i32;
        let right = chunk[1] as i32;
        let sum = left + right;
        let mono = sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        mono_samples.push(mono);
    }

    AudioFrame {
        samples: mono_samples,
        sample_rate: frame.sample_rate,
        channels: 1,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Little-endian byte view of the samples, ready for base64 encoding.
pub fn to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Playback duration of a raw 16-bit PCM byte buffer.
pub fn pcm_duration_secs(byte_len: usize, sample_rate: u32, channels: u16) -> f64 {
    if sample_rate == 0 || channels == 0 {
        return 0.0;
    }

    let samples = byte_len / 2;
    let frames = samples / channels as usize;
    frames as f64 / sample_rate as f64
}
