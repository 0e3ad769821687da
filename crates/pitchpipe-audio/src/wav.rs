//! WAV encoding via hound.

use std::io::Cursor;

use crate::decode::DecodedAudio;
use crate::error::WavError;

/// Encode a decoded clip as a 16-bit PCM mono WAV, in memory.
///
/// The source sample rate is preserved; samples are clamped to
/// [-1.0, 1.0] before quantization.
pub fn encode_wav(audio: &DecodedAudio) -> Result<Vec<u8>, WavError> {
    if audio.samples.is_empty() {
        return Err(WavError::Empty);
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in &audio.samples {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(quantized)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    /// In-memory 16-bit mono WAV from float samples, for decoder and
    /// handler tests.
    pub(crate) fn wav_bytes_mono_i16(samples: &[f32], sample_rate: u32) -> Vec<u8> {
        encode_wav(&DecodedAudio {
            samples: samples.to_vec(),
            sample_rate,
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_through_hound() {
        let audio = DecodedAudio {
            samples: (0..441).map(|i| (i as f32 * 0.07).sin() * 0.4).collect(),
            sample_rate: 44100,
        };
        let bytes = encode_wav(&audio).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 441);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let audio = DecodedAudio {
            samples: vec![2.0, -2.0],
            sample_rate: 8000,
        };
        let bytes = encode_wav(&audio).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
    }

    #[test]
    fn empty_clip_is_rejected() {
        let audio = DecodedAudio {
            samples: vec![],
            sample_rate: 44100,
        };
        assert!(matches!(encode_wav(&audio), Err(WavError::Empty)));
    }
}
