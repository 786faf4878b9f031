//! Rolling reassembly of GPS subframes 2 and 3 into a validated ephemeris.

use super::Ephemeris;

#[derive(Debug, Clone, Default)]
pub struct NavigationBuffer {
    subframe_2: Option<[u32; 10]>,
    subframe_3: Option<[u32; 10]>,
    last_iode: Option<u8>,
    pub ephemeris: Option<Ephemeris>,
}

impl NavigationBuffer {
    pub fn new() -> Self {
        NavigationBuffer::default()
    }

    /// Feed one completed subframe. Returns `Some(ephemeris)` the moment
    /// subframes 2 and 3 agree on an IODE distinct from the last one this
    /// buffer validated.
    pub fn ingest_subframe(&mut self, subframe_number: u8, words: [u32; 10]) -> Option<Ephemeris> {
        match subframe_number {
            2 => self.subframe_2 = Some(words),
            3 => self.subframe_3 = Some(words),
            _ => return None,
        }

        let (sf2, sf3) = (self.subframe_2?, self.subframe_3?);
        let iode_2 = ((sf2[2] >> 16) & 0xFF) as u8;
        let iode_3 = ((sf3[9] >> 16) & 0xFF) as u8;

        if iode_2 != iode_3 || Some(iode_2) == self.last_iode {
            return None;
        }

        match Ephemeris::from_subframes(&sf2, &sf3) {
            Ok(ephemeris) => {
                self.last_iode = Some(iode_2);
                self.ephemeris = Some(ephemeris);
                Some(ephemeris)
            }
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBFRAME_2: [u32; 10] = [
        0, 0, 0xc40d92, 0x2b475f, 0x772e13, 0x0bee01, 0x63fdf3, 0x0d5ca1, 0x0d6475, 0x00007f,
    ];
    const SUBFRAME_3: [u32; 10] = [
        0, 0, 0xfffb2e, 0xd811cd, 0xffe128, 0x4a5fe4, 0x21d82d, 0x42f0d9, 0xffa8f3, 0xc4198b,
    ];

    #[test]
    fn validates_once_both_subframes_present() {
        let mut buffer = NavigationBuffer::new();
        assert!(buffer.ingest_subframe(2, SUBFRAME_2).is_none());
        let ephemeris = buffer.ingest_subframe(3, SUBFRAME_3);
        assert!(ephemeris.is_some());
    }

    #[test]
    fn does_not_revalidate_same_iode() {
        let mut buffer = NavigationBuffer::new();
        buffer.ingest_subframe(2, SUBFRAME_2);
        buffer.ingest_subframe(3, SUBFRAME_3);
        buffer.ingest_subframe(3, SUBFRAME_3);
        assert!(buffer.ingest_subframe(2, SUBFRAME_2).is_none());
    }
}
