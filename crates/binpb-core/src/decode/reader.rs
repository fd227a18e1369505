//! Cursor over a raw payload, backed by `protobuf::CodedInputStream`.
//!
//! The stream does the byte-level work (varints, fixed widths, length
//! limits); failures are surfaced as [`WireError`] values carrying the
//! payload offset so parse rejections stay diagnosable.

use protobuf::CodedInputStream;

use super::error::WireError;

/// Opaque handle returned by [`WireReader::begin_region`]; pass it back to
/// [`WireReader::end_region`] to restore the enclosing read limit.
pub struct RegionGuard(u64);

pub struct WireReader<'a> {
    stream: CodedInputStream<'a>,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            stream: CodedInputStream::from_bytes(buf),
        }
    }

    /// True once the current read limit (the whole payload, or the region
    /// opened by [`Self::begin_region`]) is exhausted.
    pub fn at_end(&mut self) -> Result<bool, WireError> {
        let offset = self.stream.pos();
        self.stream
            .eof()
            .map_err(|source| WireError::Read { offset, source })
    }

    pub fn read_varint(&mut self) -> Result<u64, WireError> {
        let offset = self.stream.pos();
        self.stream
            .read_raw_varint64()
            .map_err(|source| WireError::Read { offset, source })
    }

    pub fn read_fixed32(&mut self) -> Result<u32, WireError> {
        let offset = self.stream.pos();
        self.stream
            .read_fixed32()
            .map_err(|source| WireError::Read { offset, source })
    }

    pub fn read_fixed64(&mut self) -> Result<u64, WireError> {
        let offset = self.stream.pos();
        self.stream
            .read_fixed64()
            .map_err(|source| WireError::Read { offset, source })
    }

    /// Read a varint length prefix followed by that many raw bytes.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, WireError> {
        let offset = self.stream.pos();
        self.stream
            .read_bytes()
            .map_err(|source| WireError::Read { offset, source })
    }

    /// Read a length prefix and narrow the stream to exactly that many
    /// bytes. The region must not extend past the enclosing limit.
    pub fn begin_region(&mut self) -> Result<RegionGuard, WireError> {
        let offset = self.stream.pos();
        let length = self.read_varint()?;
        let old_limit = self
            .stream
            .push_limit(length)
            .map_err(|source| WireError::RegionOverrun {
                offset,
                length,
                source,
            })?;
        Ok(RegionGuard(old_limit))
    }

    pub fn end_region(&mut self, guard: RegionGuard) {
        self.stream.pop_limit(guard.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_single_and_multi_byte() {
        let mut reader = WireReader::new(&[0x05]);
        assert_eq!(reader.read_varint().unwrap(), 5);
        assert!(reader.at_end().unwrap());

        let mut reader = WireReader::new(&[0xac, 0x02]);
        assert_eq!(reader.read_varint().unwrap(), 300);
    }

    #[test]
    fn varint_max_value() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_varint().unwrap(), u64::MAX);
    }

    #[test]
    fn varint_truncated() {
        let mut reader = WireReader::new(&[0x80]);
        assert!(matches!(reader.read_varint(), Err(WireError::Read { .. })));
    }

    #[test]
    fn varint_longer_than_ten_bytes_is_rejected() {
        let bytes = [0xff; 11];
        let mut reader = WireReader::new(&bytes);
        assert!(matches!(reader.read_varint(), Err(WireError::Read { .. })));
    }

    #[test]
    fn fixed_widths() {
        let mut reader = WireReader::new(&[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(reader.read_fixed32().unwrap(), 1);

        let mut reader = WireReader::new(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(reader.read_fixed64().unwrap(), u64::MAX);

        let mut reader = WireReader::new(&[0x00, 0x00]);
        assert!(matches!(reader.read_fixed32(), Err(WireError::Read { .. })));
    }

    #[test]
    fn bytes_and_overrun() {
        let mut reader = WireReader::new(&[0x03, b'a', b'b', b'c']);
        assert_eq!(reader.read_bytes().unwrap(), b"abc");
        assert!(reader.at_end().unwrap());

        let mut reader = WireReader::new(&[0x05, b'a', b'b']);
        assert!(matches!(reader.read_bytes(), Err(WireError::Read { .. })));
    }

    #[test]
    fn region_limits_reads_then_restores() {
        let mut reader = WireReader::new(&[0x02, 0x05, 0x07, 0x09]);
        let guard = reader.begin_region().unwrap();
        assert_eq!(reader.read_varint().unwrap(), 5);
        assert_eq!(reader.read_varint().unwrap(), 7);
        assert!(reader.at_end().unwrap());
        reader.end_region(guard);
        assert_eq!(reader.read_varint().unwrap(), 9);
        assert!(reader.at_end().unwrap());
    }

    #[test]
    fn region_longer_than_payload_is_rejected() {
        let mut reader = WireReader::new(&[0x05, 0x01, 0x02]);
        assert!(matches!(
            reader.begin_region(),
            Err(WireError::RegionOverrun { .. })
        ));
    }
}
