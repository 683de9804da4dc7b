//! RIFF/WAVE reader
//!
//! Supports PCM 8/16/24/32-bit and IEEE float 32-bit with any channel
//! count. The header pass walks every chunk (so `smpl` after `data` is
//! still found), then the reader seeks back to the data and decodes one
//! block of frames per `read_block` call.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::convert::{map_frame_between_rates, FrameConverter};
use super::{AudioFileError, AudioFileResult, DecodeProvider, ReadStatus, SampleSource};
use crate::sample::CancelToken;
use crate::types::{LoadTarget, SampleInfo};

/// Source frames decoded per block
const BLOCK_FRAMES: usize = 4096;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Audio format information from the fmt chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub channels: u16,
    pub sample_rate: u32,
    /// Bits per sample (8, 16, 24 or 32)
    pub bits_per_sample: u16,
    /// Bytes per sample frame
    pub block_align: u16,
    /// 1 = PCM, 3 = IEEE float (resolved from the sub-format for extensible files)
    pub format_tag: u16,
}

impl WavFormat {
    fn validate(&self) -> AudioFileResult<()> {
        if self.channels == 0 {
            return Err(AudioFileError::Corrupted("zero channels".into()));
        }
        if self.format_tag != FORMAT_PCM && self.format_tag != FORMAT_IEEE_FLOAT {
            return Err(AudioFileError::UnsupportedFormat(format!(
                "format tag {:#06x}",
                self.format_tag
            )));
        }
        match (self.format_tag, self.bits_per_sample) {
            (FORMAT_PCM, 8 | 16 | 24 | 32) | (FORMAT_IEEE_FLOAT, 32) => {}
            (_, bits) => return Err(AudioFileError::UnsupportedBitDepth(bits)),
        }
        let min_align = self.channels as u32 * (self.bits_per_sample as u32 / 8);
        if (self.block_align as u32) < min_align {
            return Err(AudioFileError::Corrupted(format!(
                "block align {} smaller than {} bytes",
                self.block_align, min_align
            )));
        }
        Ok(())
    }

    fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }
}

/// Opens RIFF/WAVE files.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecodeProvider;

impl DecodeProvider for WavDecodeProvider {
    fn open(&self, path: &Path, target: &LoadTarget) -> AudioFileResult<Box<dyn SampleSource>> {
        Ok(Box::new(WavSource::open(path, target)?))
    }
}

/// Progressive reader positioned at the data chunk.
pub struct WavSource {
    reader: BufReader<File>,
    format: WavFormat,
    data_frames: u64,
    frames_read: u64,
    sample_loop: Option<(u32, u32)>,
    converter: FrameConverter,
    target_rate: u32,
    bytes: Vec<u8>,
    samples: Vec<f32>,
    flushed: bool,
}

impl WavSource {
    pub fn open(path: &Path, target: &LoadTarget) -> AudioFileResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut riff_id = [0u8; 4];
        reader.read_exact(&mut riff_id)?;
        if &riff_id != b"RIFF" {
            return Err(AudioFileError::InvalidFormat("Not a RIFF file".into()));
        }

        // RIFF size is not trusted; chunks are walked until EOF.
        let mut size_bytes = [0u8; 4];
        reader.read_exact(&mut size_bytes)?;

        let mut wave_id = [0u8; 4];
        reader.read_exact(&mut wave_id)?;
        if &wave_id != b"WAVE" {
            return Err(AudioFileError::InvalidFormat("Not a WAVE file".into()));
        }

        let mut format: Option<WavFormat> = None;
        let mut data_offset: Option<u64> = None;
        let mut data_size: Option<u64> = None;
        let mut sample_loop: Option<(u32, u32)> = None;

        loop {
            let mut chunk_id = [0u8; 4];
            if reader.read_exact(&mut chunk_id).is_err() {
                break;
            }

            let mut chunk_size_bytes = [0u8; 4];
            if reader.read_exact(&mut chunk_size_bytes).is_err() {
                break;
            }
            let chunk_size = u32::from_le_bytes(chunk_size_bytes);

            match &chunk_id {
                b"fmt " => {
                    format = Some(read_fmt_chunk(&mut reader, chunk_size)?);
                }
                b"data" => {
                    data_offset = Some(reader.stream_position()?);
                    data_size = Some(chunk_size as u64);
                    reader.seek(SeekFrom::Current(chunk_size as i64))?;
                }
                b"smpl" => {
                    sample_loop = read_smpl_chunk(&mut reader, chunk_size)?;
                }
                _ => {
                    reader.seek(SeekFrom::Current(chunk_size as i64))?;
                }
            }

            // Pad to word boundary
            if chunk_size % 2 != 0 {
                reader.seek(SeekFrom::Current(1))?;
            }
        }

        let format = format.ok_or(AudioFileError::MissingChunk("fmt"))?;
        let data_offset = data_offset.ok_or(AudioFileError::MissingChunk("data"))?;
        let data_size = data_size.ok_or(AudioFileError::MissingChunk("data"))?;
        format.validate()?;

        // A truncated file declares more data than it holds.
        let file_len = reader.seek(SeekFrom::End(0))?;
        let data_size = data_size.min(file_len.saturating_sub(data_offset));
        reader.seek(SeekFrom::Start(data_offset))?;

        let target_rate = if target.samplerate == 0 {
            format.sample_rate
        } else {
            target.samplerate
        };

        log::debug!(
            "WavSource::open: {:?} {} ch, {} Hz, {} bit, {} frames",
            path,
            format.channels,
            format.sample_rate,
            format.bits_per_sample,
            data_size / format.block_align as u64
        );

        Ok(Self {
            reader,
            format,
            data_frames: data_size / format.block_align as u64,
            frames_read: 0,
            sample_loop,
            converter: FrameConverter::new(format.channels, format.sample_rate, target),
            target_rate,
            bytes: Vec::new(),
            samples: Vec::new(),
            flushed: false,
        })
    }

    pub fn format(&self) -> &WavFormat {
        &self.format
    }

    /// Frames in the data chunk, at the source rate
    pub fn frame_count(&self) -> u64 {
        self.data_frames
    }

    fn decode_block(&mut self, frames: usize) {
        let channels = self.format.channels as usize;
        let width = self.format.bytes_per_sample();
        let align = self.format.block_align as usize;
        self.samples.clear();
        self.samples.reserve(frames * channels);

        for frame in self.bytes.chunks_exact(align).take(frames) {
            for c in 0..channels {
                let b = &frame[c * width..(c + 1) * width];
                self.samples.push(decode_sample(b, &self.format));
            }
        }
    }
}

impl SampleSource for WavSource {
    fn info(&self) -> SampleInfo {
        let src_rate = self.format.sample_rate;
        let map = |f: u32| map_frame_between_rates(f as u64, src_rate, self.target_rate) as usize;
        SampleInfo {
            channels: self.format.channels,
            samplerate: self.target_rate,
            source_samplerate: src_rate,
            bitdepth: self.format.bits_per_sample,
            frames: map_frame_between_rates(self.data_frames, src_rate, self.target_rate) as usize,
            loop_start: self.sample_loop.map(|(start, _)| map(start)),
            loop_end: self.sample_loop.map(|(_, end)| map(end)),
        }
    }

    fn channels(&self) -> u16 {
        self.converter.out_channels()
    }

    fn progress(&self) -> f64 {
        if self.data_frames == 0 {
            return 1.0;
        }
        self.frames_read as f64 / self.data_frames as f64
    }

    fn read_block(&mut self, out: &mut Vec<i16>, _cancel: &CancelToken) -> AudioFileResult<ReadStatus> {
        let remaining = self.data_frames - self.frames_read;
        if remaining == 0 {
            if self.flushed {
                return Ok(ReadStatus::Finished);
            }
            self.flushed = true;
            return Ok(ReadStatus::Data(self.converter.finish(out)));
        }

        let frames = (remaining as usize).min(BLOCK_FRAMES);
        self.bytes.resize(frames * self.format.block_align as usize, 0);
        self.reader
            .read_exact(&mut self.bytes)
            .map_err(|e| AudioFileError::Corrupted(format!("data chunk: {}", e)))?;
        self.frames_read += frames as u64;

        self.decode_block(frames);
        Ok(ReadStatus::Data(self.converter.push(&self.samples, out)))
    }
}

/// Read the fmt chunk, resolving WAVE_FORMAT_EXTENSIBLE to its sub-format.
fn read_fmt_chunk<R: Read>(reader: &mut R, size: u32) -> AudioFileResult<WavFormat> {
    if size < 16 {
        return Err(AudioFileError::Corrupted("fmt chunk too small".into()));
    }

    let mut fmt_data = vec![0u8; size as usize];
    reader.read_exact(&mut fmt_data)?;

    let mut format_tag = u16::from_le_bytes([fmt_data[0], fmt_data[1]]);
    let channels = u16::from_le_bytes([fmt_data[2], fmt_data[3]]);
    let sample_rate = u32::from_le_bytes([fmt_data[4], fmt_data[5], fmt_data[6], fmt_data[7]]);
    let block_align = u16::from_le_bytes([fmt_data[12], fmt_data[13]]);
    let bits_per_sample = u16::from_le_bytes([fmt_data[14], fmt_data[15]]);

    if format_tag == FORMAT_EXTENSIBLE {
        // cbSize(2) validBits(2) channelMask(4) then the sub-format GUID
        if fmt_data.len() < 26 {
            return Err(AudioFileError::Corrupted("extensible fmt chunk too small".into()));
        }
        format_tag = u16::from_le_bytes([fmt_data[24], fmt_data[25]]);
    }

    Ok(WavFormat {
        channels,
        sample_rate,
        bits_per_sample,
        block_align,
        format_tag,
    })
}

/// Read the first loop of a `smpl` chunk, if any.
fn read_smpl_chunk<R: Read>(reader: &mut R, size: u32) -> AudioFileResult<Option<(u32, u32)>> {
    let mut data = vec![0u8; size as usize];
    reader.read_exact(&mut data)?;

    let word = |offset: usize| -> Option<u32> {
        data.get(offset..offset + 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    };

    let loops = word(28).unwrap_or(0);
    if loops == 0 {
        return Ok(None);
    }
    // 36-byte header, then 24-byte loop records: id, type, start, end, fraction, count
    Ok(word(36 + 8).zip(word(36 + 12)))
}

/// Decode one little-endian sample to [-1, 1].
fn decode_sample(b: &[u8], format: &WavFormat) -> f32 {
    match (format.format_tag, format.bits_per_sample) {
        (_, 8) => (b[0] as f32 - 128.0) / 128.0,
        (_, 16) => i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0,
        (_, 24) => {
            let val = (b[0] as i32) | ((b[1] as i32) << 8) | ((b[2] as i32) << 16);
            // Sign extend
            let val = if val & 0x800000 != 0 { val | !0xFFFFFF } else { val };
            val as f32 / 8388608.0
        }
        (FORMAT_IEEE_FLOAT, 32) => f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        (_, 32) => i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / 2147483648.0,
        _ => 0.0,
    }
}
