//! RIFF/WAVE host transform.
//!
//! The volume rides in a JUNK sub-chunk inserted behind the canonical
//! header + fmt region; RIFF readers skip JUNK without looking inside. The
//! RIFF size field grows by the sub-chunk's full encoded length.

use byteorder::{ByteOrder, LittleEndian};

use super::FormatError;

/// End of the canonical RIFF/WAVE header plus the fmt sub-chunk.
const INSERT_POS: usize = 36;
/// Volume bytes skipped so the payload lands at its own offsets.
const VOLUME_SKIP: usize = INSERT_POS + 8;
/// Position of the RIFF total-size field.
const RIFF_SIZE_POS: usize = 4;
/// Standard RIFF padding chunk id.
const CHUNK_ID: [u8; 4] = *b"JUNK";

pub fn embed(volume: &[u8], host: &[u8]) -> Result<Vec<u8>, FormatError> {
    super::check_volume(volume)?;
    if host.len() < INSERT_POS {
        return Err(FormatError::HostTooShort {
            len: host.len(),
            needed: INSERT_POS,
        });
    }
    if &host[..4] != b"RIFF" {
        return Err(FormatError::BadSignature { expected: "RIFF" });
    }
    if &host[8..12] != b"WAVE" {
        return Err(FormatError::BadSignature { expected: "RIFF/WAVE" });
    }

    let payload = &volume[VOLUME_SKIP..];
    let chunk_len = 8 + payload.len();

    let riff_size = LittleEndian::read_u32(&host[RIFF_SIZE_POS..RIFF_SIZE_POS + 4]);
    let new_riff_size = riff_size.wrapping_add(chunk_len as u32);

    let mut out = Vec::with_capacity(host.len() + chunk_len);
    out.extend_from_slice(&host[..RIFF_SIZE_POS]);
    let mut scratch = [0u8; 4];
    LittleEndian::write_u32(&mut scratch, new_riff_size);
    out.extend_from_slice(&scratch);
    out.extend_from_slice(&host[RIFF_SIZE_POS + 4..INSERT_POS]);
    out.extend_from_slice(&CHUNK_ID);
    LittleEndian::write_u32(&mut scratch, payload.len() as u32);
    out.extend_from_slice(&scratch);
    out.extend_from_slice(payload);
    out.extend_from_slice(&host[INSERT_POS..]);
    Ok(out)
}
