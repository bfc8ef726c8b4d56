//! Volume header re-keying.
//!
//! An embedding transform rewrites the first 64 bytes of the buffer to
//! satisfy its host format, which invalidates the header encryption: the
//! header keys are derived from those very bytes. This module decrypts the
//! original header with the original salt and re-encrypts it under the
//! host-constrained salt, so the finished polyglot still unlocks with the
//! unchanged password.

use crate::crypto::{self, SALT_LEN, VOLUME_HEADER_LEN};
use crate::formats::FormatError;
use crate::PolyglotError;

/// Builds the final polyglot from the original volume and a combined buffer.
///
/// The output is `combined[..64]` (the new salt), the re-encrypted header,
/// and `combined[512..]` untouched. Decrypting the output's header region
/// with the original password reproduces the original header plaintext
/// exactly; the body key material inside the header does not depend on the
/// salt, so the body beyond byte 512 stays mountable.
pub fn reencrypt(
    volume: &[u8],
    combined: &[u8],
    password: &str,
) -> Result<Vec<u8>, PolyglotError> {
    if volume.len() < VOLUME_HEADER_LEN {
        return Err(FormatError::VolumeTooShort { len: volume.len() }.into());
    }
    if combined.len() < VOLUME_HEADER_LEN {
        return Err(FormatError::CombinedTooShort { len: combined.len() }.into());
    }

    let mut old_salt = [0u8; SALT_LEN];
    old_salt.copy_from_slice(&volume[..SALT_LEN]);
    let mut encrypted = [0u8; crypto::HEADER_LEN];
    encrypted.copy_from_slice(&volume[SALT_LEN..VOLUME_HEADER_LEN]);

    log::debug!("decrypting header of {} byte volume", volume.len());
    let header = crypto::decrypt_header(&old_salt, &encrypted, password)?;

    let mut new_salt = [0u8; SALT_LEN];
    new_salt.copy_from_slice(&combined[..SALT_LEN]);
    log::debug!(
        "re-encrypting header under host salt {}..",
        hex::encode(&new_salt[..8])
    );
    let reencrypted = crypto::encrypt_header(&new_salt, &header, password);

    let mut out = Vec::with_capacity(combined.len());
    out.extend_from_slice(&new_salt);
    out.extend_from_slice(&reencrypted);
    out.extend_from_slice(&combined[VOLUME_HEADER_LEN..]);
    Ok(out)
}
