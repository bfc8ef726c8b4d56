//! Icon host transform.
//!
//! The volume tail is spliced between the icon directory and the image data,
//! and the first directory entry's image offset is rewritten to point past
//! it. Entries after the first keep their stale offsets, matching how icon
//! viewers read only the entry they render.

use byteorder::{ByteOrder, LittleEndian};

use super::FormatError;

/// ICONDIR header: reserved word, resource type, image count.
const DIR_LEN: usize = 6;
/// One ICONDIRENTRY record.
const ENTRY_LEN: usize = 16;
/// Offset of the image-data pointer inside the first entry.
const IMAGE_OFFSET_POS: usize = DIR_LEN + 12;
/// Zero bytes between the volume tail and the relocated image data.
const PAD_LEN: usize = 8;

pub fn embed(volume: &[u8], host: &[u8]) -> Result<Vec<u8>, FormatError> {
    super::check_volume(volume)?;
    if host.len() < DIR_LEN + ENTRY_LEN {
        return Err(FormatError::HostTooShort {
            len: host.len(),
            needed: DIR_LEN + ENTRY_LEN,
        });
    }
    // Reserved word zero, resource type 1 (icon).
    if host[..4] != [0, 0, 1, 0] {
        return Err(FormatError::BadSignature {
            expected: "an ICO resource header",
        });
    }

    let image_offset =
        LittleEndian::read_u32(&host[IMAGE_OFFSET_POS..IMAGE_OFFSET_POS + 4]) as usize;
    if image_offset > host.len() {
        return Err(FormatError::DirectoryOutOfBounds {
            offset: image_offset,
        });
    }

    let new_offset = volume.len() + PAD_LEN;

    let mut out = Vec::with_capacity(new_offset + host.len() - image_offset);
    out.extend_from_slice(&host[..IMAGE_OFFSET_POS]);
    let mut offset_bytes = [0u8; 4];
    LittleEndian::write_u32(&mut offset_bytes, new_offset as u32);
    out.extend_from_slice(&offset_bytes);
    out.extend_from_slice(&volume[DIR_LEN + ENTRY_LEN..]);
    out.resize(new_offset, 0);
    out.extend_from_slice(&host[image_offset..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::testutil;

    fn host() -> Vec<u8> {
        let mut h = vec![0, 0, 1, 0, 1, 0];
        let mut entry = [0u8; ENTRY_LEN];
        entry[0] = 16; // width
        entry[1] = 16; // height
        LittleEndian::write_u32(&mut entry[8..12], 40); // image data size
        LittleEndian::write_u32(&mut entry[12..16], (DIR_LEN + ENTRY_LEN) as u32);
        h.extend_from_slice(&entry);
        h.extend((0..40).map(|i| 0x80 | i as u8)); // image data
        h
    }

    #[test]
    fn image_offset_points_past_the_volume() {
        let volume = testutil::volume(700);
        let host = host();
        let out = embed(&volume, &host).unwrap();

        assert_eq!(&out[..IMAGE_OFFSET_POS], &host[..IMAGE_OFFSET_POS]);
        let new_offset =
            LittleEndian::read_u32(&out[IMAGE_OFFSET_POS..IMAGE_OFFSET_POS + 4]) as usize;
        assert_eq!(new_offset, volume.len() + PAD_LEN);

        // Volume bytes sit at their own offsets from the end of the entry on.
        assert_eq!(
            &out[DIR_LEN + ENTRY_LEN..volume.len()],
            &volume[DIR_LEN + ENTRY_LEN..]
        );
        assert!(out[volume.len()..new_offset].iter().all(|&b| b == 0));
        assert_eq!(&out[new_offset..], &host[DIR_LEN + ENTRY_LEN..]);
    }

    #[test]
    fn non_icon_host_is_rejected() {
        let mut host = host();
        host[2] = 2; // cursor resource, not icon
        let err = embed(&testutil::volume(512), &host).unwrap_err();
        assert!(matches!(err, FormatError::BadSignature { .. }));
    }

    #[test]
    fn out_of_range_image_offset_is_rejected() {
        let mut host = host();
        LittleEndian::write_u32(&mut host[IMAGE_OFFSET_POS..IMAGE_OFFSET_POS + 4], 9999);
        let err = embed(&testutil::volume(512), &host).unwrap_err();
        assert_eq!(err, FormatError::DirectoryOutOfBounds { offset: 9999 });
    }
}
