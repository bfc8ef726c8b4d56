//! TIFF host transform.
//!
//! The volume payload is inserted right behind the 8 byte header, which
//! shifts every structure in the file. TIFF addresses those structures
//! through absolute offsets: the header points at the first image file
//! directory, each directory entry may point at an out-of-line value, and
//! each directory ends with a pointer to the next one. The transform walks
//! the directory chain in host coordinates and rewrites every such offset at
//! its shifted position in the output, honoring the byte order declared by
//! the host's first two bytes.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::FormatError;

/// Classic TIFF header: byte-order mark, magic 42, first-IFD pointer.
const HEADER_LEN: usize = 8;
/// One IFD entry: tag, field type, count, value-or-offset.
const ENTRY_LEN: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(buf),
            Endian::Big => BigEndian::read_u16(buf),
        }
    }

    fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endian::Little => LittleEndian::read_u32(buf),
            Endian::Big => BigEndian::read_u32(buf),
        }
    }

    fn write_u32(self, buf: &mut [u8], value: u32) {
        match self {
            Endian::Little => LittleEndian::write_u32(buf, value),
            Endian::Big => BigEndian::write_u32(buf, value),
        }
    }
}

/// Byte width of one value of the given TIFF field type.
///
/// Unknown types report zero: their value slots cannot be sized, so they
/// are never treated as offsets and stay untouched.
fn type_size(field_type: u16) -> u64 {
    match field_type {
        1 | 2 | 6 | 7 => 1, // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,         // SHORT, SSHORT
        4 | 9 | 11 => 4,    // LONG, SLONG, FLOAT
        5 | 10 | 12 => 8,   // RATIONAL, SRATIONAL, DOUBLE
        _ => 0,
    }
}

pub fn embed(volume: &[u8], host: &[u8]) -> Result<Vec<u8>, FormatError> {
    super::check_volume(volume)?;
    if host.len() < HEADER_LEN {
        return Err(FormatError::HostTooShort {
            len: host.len(),
            needed: HEADER_LEN,
        });
    }
    let endian = match &host[..2] {
        b"II" => Endian::Little,
        b"MM" => Endian::Big,
        _ => {
            return Err(FormatError::BadSignature {
                expected: "a TIFF byte-order mark (II or MM)",
            })
        }
    };
    if endian.read_u16(&host[2..4]) != 42 {
        return Err(FormatError::BadSignature {
            expected: "the TIFF magic number 42",
        });
    }

    let payload = &volume[HEADER_LEN..];
    // Every host offset past the header moves by this much.
    let shift = payload.len();

    let mut out = Vec::with_capacity(volume.len() + host.len() - HEADER_LEN);
    out.extend_from_slice(&host[..HEADER_LEN]);
    out.extend_from_slice(payload);
    out.extend_from_slice(&host[HEADER_LEN..]);

    let first_ifd = endian.read_u32(&host[4..8]);
    if first_ifd == 0 {
        return Err(FormatError::AnchorNotFound {
            anchor: "image file directory",
        });
    }
    endian.write_u32(&mut out[4..8], first_ifd.wrapping_add(shift as u32));

    let mut visited: Vec<usize> = Vec::new();
    let mut ifd = first_ifd as usize;
    while ifd != 0 {
        if visited.contains(&ifd) {
            return Err(FormatError::DirectoryLoop { offset: ifd });
        }
        visited.push(ifd);

        if ifd + 2 > host.len() {
            return Err(FormatError::DirectoryOutOfBounds { offset: ifd });
        }
        let entries = endian.read_u16(&host[ifd..ifd + 2]) as usize;
        let next_pos = ifd + 2 + entries * ENTRY_LEN;
        if next_pos + 4 > host.len() {
            return Err(FormatError::DirectoryOutOfBounds { offset: ifd });
        }

        for i in 0..entries {
            let entry = ifd + 2 + i * ENTRY_LEN;
            let field_type = endian.read_u16(&host[entry + 2..entry + 4]);
            let count = endian.read_u32(&host[entry + 4..entry + 8]) as u64;
            // Values wider than the inline 4 byte slot live elsewhere in the
            // file; their slot holds an offset that must move with the shift.
            if type_size(field_type) * count > 4 {
                let slot = entry + 8;
                let offset = endian.read_u32(&host[slot..slot + 4]);
                endian.write_u32(
                    &mut out[slot + shift..slot + shift + 4],
                    offset.wrapping_add(shift as u32),
                );
            }
        }

        let next = endian.read_u32(&host[next_pos..next_pos + 4]);
        if next != 0 {
            endian.write_u32(
                &mut out[next_pos + shift..next_pos + shift + 4],
                next.wrapping_add(shift as u32),
            );
        }
        ifd = next as usize;
    }

    Ok(out)
}
