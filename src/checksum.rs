/*!
Internet checksum (RFC 1071) computation and incremental update (RFC 1624)

Header rewrites in the action executor patch the IPv4 header checksum and
the TCP/UDP checksum in place instead of recomputing them over the packet.
*/

/// A running one's complement sum over 16 bit big-endian words
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Checksum {
    inner: u32,
}

impl Checksum {
    /// Sums the given bytes; an odd trailing byte is padded with zero
    pub fn compute(bytes: &[u8]) -> Checksum {
        let mut csum = Checksum::default();
        csum.add(bytes);
        csum
    }

    pub fn add(&mut self, bytes: &[u8]) {
        let mut chunks = bytes.chunks(2);
        while let Some(chunk) = chunks.next() {
            let word = if chunk.len() == 2 {
                u16::from(chunk[0]) << 8 | u16::from(chunk[1])
            }
            else {
                u16::from(chunk[0]) << 8
            };
            self.add_u16(word);
        }
    }

    pub fn add_u16(&mut self, word: u16) {
        self.inner += u32::from(word);
        self.fold();
    }

    pub fn add_u32(&mut self, word: u32) {
        self.add_u16((word >> 16) as u16);
        self.add_u16(word as u16);
    }

    /// Removes a word from the sum by adding its complement
    pub fn sub_u16(&mut self, word: u16) {
        self.add_u16(!word);
    }

    pub fn sub_u32(&mut self, word: u32) {
        self.sub_u16((word >> 16) as u16);
        self.sub_u16(word as u16);
    }

    fn fold(&mut self) {
        while (self.inner >> 16) != 0 {
            self.inner = (self.inner >> 16) + (self.inner & 0xffff);
        }
    }

    /// Returns the value to be stored in a header checksum field
    pub fn finalize(&self) -> u16 {
        let mut csum = *self;
        csum.fold();
        !(csum.inner as u16)
    }
}

/// Recomputes a stored header checksum after a 16 bit field changed from `old` to `new`
pub fn update_u16(stored: u16, old: u16, new: u16) -> u16 {
    let mut csum = Checksum { inner: u32::from(!stored) };
    csum.sub_u16(old);
    csum.add_u16(new);
    csum.finalize()
}

/// Recomputes a stored header checksum after a 32 bit field changed from `old` to `new`
pub fn update_u32(stored: u16, old: u32, new: u32) -> u16 {
    let mut csum = Checksum { inner: u32::from(!stored) };
    csum.sub_u32(old);
    csum.add_u32(new);
    csum.finalize()
}
