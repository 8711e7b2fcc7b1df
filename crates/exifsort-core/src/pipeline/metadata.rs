//! Capture-time extraction from embedded image metadata.
//!
//! The classifier only needs two calls: decode a tag set from an open file,
//! then ask that tag set for its capture timestamp. [`ExifDecoder`] provides
//! them on top of `kamadak-exif`; tests swap in their own decoder.

use chrono::{NaiveDate, NaiveDateTime};
use exif::{Field, In, Reader, Tag, Value};
use std::io::{BufRead, Seek};

use crate::error::MetadataError;

/// Decodes a tag set from an open file.
pub trait MetadataDecoder: Send + Sync + 'static {
    /// Decoded tag set
    type Tags: CaptureTime;

    /// Decode embedded metadata from the start of `reader`.
    fn decode<R: BufRead + Seek>(&self, reader: &mut R) -> Result<Self::Tags, MetadataError>;
}

/// A decoded tag set that may carry a capture timestamp.
pub trait CaptureTime {
    /// When the picture was taken.
    fn capture_date_time(&self) -> Result<NaiveDateTime, MetadataError>;
}

/// EXIF decoder for any container `kamadak-exif` understands (JPEG, TIFF, HEIF, PNG, WebP).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifDecoder;

/// EXIF fields read from one file.
pub struct ExifTags {
    exif: exif::Exif,
}

impl MetadataDecoder for ExifDecoder {
    type Tags = ExifTags;

    fn decode<R: BufRead + Seek>(&self, reader: &mut R) -> Result<ExifTags, MetadataError> {
        let exif = Reader::new().read_from_container(reader)?;
        Ok(ExifTags { exif })
    }
}

impl CaptureTime for ExifTags {
    /// Prefers `DateTimeOriginal`, falling back to `DateTime`.
    fn capture_date_time(&self) -> Result<NaiveDateTime, MetadataError> {
        let field = self
            .exif
            .get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .or_else(|| self.exif.get_field(Tag::DateTime, In::PRIMARY))
            .ok_or(MetadataError::MissingTimestamp)?;
        parse_datetime(field)
    }
}

/// Convert an EXIF ASCII date/time field ("YYYY:MM:DD HH:MM:SS") to a naive timestamp.
fn parse_datetime(field: &Field) -> Result<NaiveDateTime, MetadataError> {
    let ascii = match &field.value {
        Value::Ascii(parts) => parts.first().ok_or(MetadataError::MissingTimestamp)?,
        other => {
            return Err(MetadataError::InvalidTimestamp(format!(
                "expected ASCII, got {:?}",
                other
            )))
        }
    };

    let dt = exif::DateTime::from_ascii(ascii)
        .map_err(|e| MetadataError::InvalidTimestamp(e.to_string()))?;

    NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())
        .and_then(|date| date.and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into()))
        .ok_or_else(|| MetadataError::InvalidTimestamp(dt.to_string()))
}

/// Synthetic EXIF-bearing JPEGs for tests and benches.
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures {
    /// IFD0 `DateTime`
    pub const DATE_TIME: u16 = 0x0132;
    /// IFD0 `Make`
    pub const MAKE: u16 = 0x010F;
    /// Exif IFD `DateTimeOriginal`
    pub const DATE_TIME_ORIGINAL: u16 = 0x9003;

    const EXIF_IFD_POINTER: u16 = 0x8769;
    const TYPE_ASCII: u16 = 2;
    const TYPE_LONG: u16 = 4;

    /// Build a minimal JPEG whose APP1 segment holds the given ASCII fields.
    ///
    /// `primary` lands in IFD0; `exif` lands in an Exif sub-IFD linked from IFD0.
    pub fn jpeg(primary: &[(u16, &str)], exif: &[(u16, &str)]) -> Vec<u8> {
        let tiff = tiff(primary, exif);

        let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
        let segment_len = (2 + 6 + tiff.len()) as u16;
        out.extend_from_slice(&segment_len.to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(&tiff);
        out.extend_from_slice(&[0xFF, 0xD9]);
        out
    }

    /// A JPEG carrying `DateTimeOriginal`, e.g. "2023:03:05 14:07:09".
    pub fn jpeg_taken_at(datetime: &str) -> Vec<u8> {
        jpeg(&[(MAKE, "TestCam")], &[(DATE_TIME_ORIGINAL, datetime)])
    }

    fn ifd_len(entries: usize) -> u32 {
        (2 + 12 * entries + 4) as u32
    }

    // Big-endian TIFF body: header, IFD0, optional Exif IFD, then value data.
    fn tiff(primary: &[(u16, &str)], exif: &[(u16, &str)]) -> Vec<u8> {
        let ifd0_entries = primary.len() + usize::from(!exif.is_empty());
        let ifd0_offset = 8u32;
        let exif_offset = ifd0_offset + ifd_len(ifd0_entries);
        let mut data_offset = exif_offset
            + if exif.is_empty() {
                0
            } else {
                ifd_len(exif.len())
            };

        let mut ifds = Vec::new();
        let mut data = Vec::new();

        let mut write_ascii = |ifds: &mut Vec<u8>, tag: u16, value: &str| {
            let mut bytes = value.as_bytes().to_vec();
            bytes.push(0);
            ifds.extend_from_slice(&tag.to_be_bytes());
            ifds.extend_from_slice(&TYPE_ASCII.to_be_bytes());
            ifds.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            if bytes.len() <= 4 {
                bytes.resize(4, 0);
                ifds.extend_from_slice(&bytes);
            } else {
                ifds.extend_from_slice(&data_offset.to_be_bytes());
                data_offset += bytes.len() as u32;
                data.extend_from_slice(&bytes);
            }
        };

        ifds.extend_from_slice(&(ifd0_entries as u16).to_be_bytes());
        for (tag, value) in primary {
            write_ascii(&mut ifds, *tag, *value);
        }
        if !exif.is_empty() {
            ifds.extend_from_slice(&EXIF_IFD_POINTER.to_be_bytes());
            ifds.extend_from_slice(&TYPE_LONG.to_be_bytes());
            ifds.extend_from_slice(&1u32.to_be_bytes());
            ifds.extend_from_slice(&exif_offset.to_be_bytes());
        }
        ifds.extend_from_slice(&0u32.to_be_bytes());

        if !exif.is_empty() {
            ifds.extend_from_slice(&(exif.len() as u16).to_be_bytes());
            for (tag, value) in exif {
                write_ascii(&mut ifds, *tag, *value);
            }
            ifds.extend_from_slice(&0u32.to_be_bytes());
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"MM");
        out.extend_from_slice(&42u16.to_be_bytes());
        out.extend_from_slice(&ifd0_offset.to_be_bytes());
        out.extend_from_slice(&ifds);
        out.extend_from_slice(&data);
        out
    }
}
