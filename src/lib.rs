//! Polyglot builder for password-protected encrypted volumes.
//!
//! A polyglot is one byte buffer that parses as a common container format
//! (image, audio, archive, markup) and at the same time mounts as an
//! encrypted volume under the original password. Construction runs in two
//! steps: a format embedding transform splices the volume into the host
//! file without breaking the host's structural invariants, then the
//! re-keying pass re-encrypts the volume header under the salt bytes the
//! host format dictated.
//!
//! The crate works on in-memory buffers only; reading the inputs and
//! writing the result is the caller's business, as is mapping a host file
//! name to a [`FormatTag`].

pub mod crypto;
pub mod formats;
pub mod rekey;

use std::fmt;

pub use formats::{FormatError, FormatTag};
pub use rekey::reencrypt;

/// Terminal failure of a polyglot pipeline run. No partial output is ever
/// produced alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolyglotError {
    /// The volume header did not decrypt to the expected magic marker.
    /// Wrong password and not-a-volume are deliberately indistinguishable.
    AuthenticationFailed,
    /// The host file could not structurally accommodate the volume.
    Format(FormatError),
    /// No embedding transform is registered for the given extension.
    UnsupportedFormat(String),
}

impl fmt::Display for PolyglotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PolyglotError::AuthenticationFailed => {
                write!(f, "wrong password or not a recognized volume")
            }
            PolyglotError::Format(err) => err.fmt(f),
            PolyglotError::UnsupportedFormat(ext) => {
                write!(f, "no embedding transform registered for '{}'", ext)
            }
        }
    }
}

impl std::error::Error for PolyglotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PolyglotError::Format(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormatError> for PolyglotError {
    fn from(err: FormatError) -> Self {
        PolyglotError::Format(err)
    }
}

impl From<crypto::HeaderError> for PolyglotError {
    fn from(err: crypto::HeaderError) -> Self {
        match err {
            crypto::HeaderError::AuthenticationFailed => PolyglotError::AuthenticationFailed,
        }
    }
}

/// Builds a polyglot from an encrypted volume and a host file.
///
/// Runs the embedding transform for `tag`, then re-encrypts the volume
/// header under the combined buffer's leading 64 bytes. The result parses
/// as the host format and still unlocks with `password`.
pub fn create_polyglot(
    volume: &[u8],
    host: &[u8],
    password: &str,
    tag: FormatTag,
) -> Result<Vec<u8>, PolyglotError> {
    let combined = formats::embed(tag, volume, host)?;
    let polyglot = rekey::reencrypt(volume, &combined, password)?;
    log::info!("built {} polyglot, {} bytes", tag, polyglot.len());
    Ok(polyglot)
}

/// [`create_polyglot`] with the format resolved from a file extension.
///
/// The extension is given without the dot, e.g. `"png"`; unknown extensions
/// fail with [`PolyglotError::UnsupportedFormat`].
pub fn create_polyglot_for_extension(
    volume: &[u8],
    host: &[u8],
    password: &str,
    extension: &str,
) -> Result<Vec<u8>, PolyglotError> {
    let tag = FormatTag::from_extension(extension)
        .ok_or_else(|| PolyglotError::UnsupportedFormat(extension.to_string()))?;
    create_polyglot(volume, host, password, tag)
}
