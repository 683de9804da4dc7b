//! Symphonia-backed decoding for FLAC, MP3, OGG/Vorbis and friends

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::convert::{map_frame_between_rates, FrameConverter};
use super::{AudioFileError, AudioFileResult, DecodeProvider, ReadStatus, SampleSource};
use crate::sample::CancelToken;
use crate::types::{LoadTarget, SampleInfo};

/// Opens anything symphonia's default probe recognizes.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompressedDecodeProvider;

impl DecodeProvider for CompressedDecodeProvider {
    fn open(&self, path: &Path, target: &LoadTarget) -> AudioFileResult<Box<dyn SampleSource>> {
        Ok(Box::new(CompressedSource::open(path, target)?))
    }
}

/// Packet-by-packet symphonia decoder.
pub struct CompressedSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    channels: u16,
    sample_rate: u32,
    bitdepth: u16,
    total_frames: Option<u64>,
    consumed_frames: u64,
    target_rate: u32,
    converter: FrameConverter,
    sample_buf: Option<SampleBuffer<f32>>,
    ended: bool,
    flushed: bool,
}

impl CompressedSource {
    pub fn open(path: &Path, target: &LoadTarget) -> AudioFileResult<Self> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint with the file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| AudioFileError::UnsupportedFormat(e.to_string()))?;

        let format = probed.format;

        // Find the first audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioFileError::UnsupportedFormat("No audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioFileError::UnsupportedFormat("Unknown sample rate".to_string()))?;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(2);
        let bitdepth = track.codec_params.bits_per_sample.unwrap_or(0) as u16;
        let total_frames = track.codec_params.n_frames;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioFileError::UnsupportedFormat(e.to_string()))?;

        let target_rate = if target.samplerate == 0 {
            sample_rate
        } else {
            target.samplerate
        };

        log::debug!(
            "CompressedSource::open: {:?} {} ch, {} Hz, {:?} frames",
            path,
            channels,
            sample_rate,
            total_frames
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            channels,
            sample_rate,
            bitdepth,
            total_frames,
            consumed_frames: 0,
            target_rate,
            converter: FrameConverter::new(channels, sample_rate, target),
            sample_buf: None,
            ended: false,
            flushed: false,
        })
    }

    fn flush(&mut self, out: &mut Vec<i16>) -> ReadStatus {
        if self.flushed {
            return ReadStatus::Finished;
        }
        self.flushed = true;
        ReadStatus::Data(self.converter.finish(out))
    }
}

impl SampleSource for CompressedSource {
    fn info(&self) -> SampleInfo {
        SampleInfo {
            channels: self.channels,
            samplerate: self.target_rate,
            source_samplerate: self.sample_rate,
            bitdepth: self.bitdepth,
            frames: self
                .total_frames
                .map(|n| map_frame_between_rates(n, self.sample_rate, self.target_rate) as usize)
                .unwrap_or(0),
            loop_start: None,
            loop_end: None,
        }
    }

    fn channels(&self) -> u16 {
        self.converter.out_channels()
    }

    fn progress(&self) -> f64 {
        if self.ended {
            return 1.0;
        }
        match self.total_frames {
            Some(total) if total > 0 => (self.consumed_frames as f64 / total as f64).min(1.0),
            _ => 0.0,
        }
    }

    fn read_block(&mut self, out: &mut Vec<i16>, cancel: &CancelToken) -> AudioFileResult<ReadStatus> {
        loop {
            if self.ended {
                return Ok(self.flush(out));
            }
            if cancel.is_cancelled() {
                return Ok(ReadStatus::Finished);
            }

            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    self.ended = true;
                    continue;
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.ended = true;
                    continue;
                }
                Err(e) => return Err(AudioFileError::Decode(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("CompressedSource: skipping bad packet: {}", e);
                    continue;
                }
                Err(e) => return Err(AudioFileError::Decode(e.to_string())),
            };

            self.consumed_frames += decoded.frames() as u64;

            // Initialize sample buffer on first decode
            if self.sample_buf.is_none() {
                let spec = *decoded.spec();
                let duration = decoded.capacity() as u64;
                self.sample_buf = Some(SampleBuffer::new(duration, spec));
            }

            if let Some(ref mut buf) = self.sample_buf {
                buf.copy_interleaved_ref(decoded);
                return Ok(ReadStatus::Data(self.converter.push(buf.samples(), out)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::write_wav_16;
    use super::*;

    #[test]
    fn test_decodes_wav_through_symphonia() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..2000).map(|i| (i as i16) - 1000).collect();
        write_wav_16(&path, 1, 44100, &samples, None);

        let mut source = CompressedSource::open(&path, &LoadTarget::new(2, 44100)).unwrap();
        assert_eq!(source.channels(), 1);
        assert_eq!(source.info().frames, 2000);

        let cancel = CancelToken::new();
        let mut out = Vec::new();
        while let ReadStatus::Data(_) = source.read_block(&mut out, &cancel).unwrap() {}
        assert_eq!(out, samples);
        assert_eq!(source.progress(), 1.0);
    }

    #[test]
    fn test_rejects_unknown_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.bin");
        std::fs::write(&path, vec![0x5Au8; 512]).unwrap();
        assert!(matches!(
            CompressedSource::open(&path, &LoadTarget::new(2, 48000)),
            Err(AudioFileError::UnsupportedFormat(_))
        ));
    }
}
