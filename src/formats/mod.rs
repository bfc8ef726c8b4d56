//! Format embedding transforms.
//!
//! Each submodule folds an encrypted volume into one host container format
//! and returns a combined buffer that still parses as that format. The
//! transforms share a hard layout contract: every volume byte from the
//! format's skip prefix onward lands at its own offset in the output, so the
//! encrypted body occupies `[512, ..)` unchanged and only the leading 64
//! bytes (the future salt) are host-controlled. The re-keying pass then
//! rewrites bytes `[0, 512)` and nothing else.

use std::fmt;

use crate::crypto::VOLUME_HEADER_LEN;

pub mod bmp;
pub mod ico;
pub mod markup;
pub mod png;
pub mod tiff;
pub mod wav;
pub mod zip;

/// Closed set of supported host container formats.
///
/// Replaces the original plugin-per-extension discovery with a static
/// registry: adding a format means adding a variant here and a transform
/// module next to the existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Bmp,
    Png,
    Wav,
    Zip,
    Tiff,
    Html,
    Svg,
    Ico,
}

impl FormatTag {
    pub const ALL: [FormatTag; 8] = [
        FormatTag::Bmp,
        FormatTag::Png,
        FormatTag::Wav,
        FormatTag::Zip,
        FormatTag::Tiff,
        FormatTag::Html,
        FormatTag::Svg,
        FormatTag::Ico,
    ];

    /// Resolves a file extension (without the dot) to a tag.
    ///
    /// Matching is ASCII-case-insensitive but otherwise exact; aliases such
    /// as `tif` or `htm` are not recognized.
    pub fn from_extension(ext: &str) -> Option<FormatTag> {
        FormatTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.extension().eq_ignore_ascii_case(ext))
    }

    /// Canonical file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            FormatTag::Bmp => "bmp",
            FormatTag::Png => "png",
            FormatTag::Wav => "wav",
            FormatTag::Zip => "zip",
            FormatTag::Tiff => "tiff",
            FormatTag::Html => "html",
            FormatTag::Svg => "svg",
            FormatTag::Ico => "ico",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Structural failure while splicing a volume into a host file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The volume is shorter than the 512 byte salt + header region.
    VolumeTooShort { len: usize },
    /// A combined buffer handed to re-keying is shorter than 512 bytes.
    CombinedTooShort { len: usize },
    /// The host ends before the fixed-layout region the transform rewrites.
    HostTooShort { len: usize, needed: usize },
    /// The host does not start with the format's signature.
    BadSignature { expected: &'static str },
    /// A structural anchor the transform searches for is missing.
    AnchorNotFound { anchor: &'static str },
    /// The insertion point sits so deep in the host that the host prefix
    /// would not survive inside the 64 byte salt region.
    InsertionPastSalt { offset: usize },
    /// A directory structure points outside the host buffer.
    DirectoryOutOfBounds { offset: usize },
    /// The directory chain revisits an offset and would never terminate.
    DirectoryLoop { offset: usize },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatError::VolumeTooShort { len } => {
                write!(f, "volume is {} bytes, need at least 512", len)
            }
            FormatError::CombinedTooShort { len } => {
                write!(f, "combined buffer is {} bytes, need at least 512", len)
            }
            FormatError::HostTooShort { len, needed } => {
                write!(f, "host file is {} bytes, need at least {}", len, needed)
            }
            FormatError::BadSignature { expected } => {
                write!(f, "host file does not start with {}", expected)
            }
            FormatError::AnchorNotFound { anchor } => {
                write!(f, "host file has no {}", anchor)
            }
            FormatError::InsertionPastSalt { offset } => {
                write!(
                    f,
                    "first insertion point at byte {} does not fit inside the 64 byte salt region",
                    offset
                )
            }
            FormatError::DirectoryOutOfBounds { offset } => {
                write!(f, "directory structure points outside the file at byte {}", offset)
            }
            FormatError::DirectoryLoop { offset } => {
                write!(f, "directory chain loops back to byte {}", offset)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Runs the embedding transform registered for `tag`.
pub fn embed(tag: FormatTag, volume: &[u8], host: &[u8]) -> Result<Vec<u8>, FormatError> {
    log::debug!(
        "embedding {} byte volume into {} byte {} host",
        volume.len(),
        host.len(),
        tag
    );
    match tag {
        FormatTag::Bmp => bmp::embed(volume, host),
        FormatTag::Png => png::embed(volume, host),
        FormatTag::Wav => wav::embed(volume, host),
        FormatTag::Zip => zip::embed(volume, host),
        FormatTag::Tiff => tiff::embed(volume, host),
        FormatTag::Html | FormatTag::Svg => markup::embed(volume, host),
        FormatTag::Ico => ico::embed(volume, host),
    }
}

pub(crate) fn check_volume(volume: &[u8]) -> Result<(), FormatError> {
    if volume.len() < VOLUME_HEADER_LEN {
        return Err(FormatError::VolumeTooShort { len: volume.len() });
    }
    Ok(())
}
