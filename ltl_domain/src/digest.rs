//! State digests and the Jenkins mixing hash used to index states.
//!
//! A state hands out two integer seeds and a byte key. The key and seeds go
//! through Bob Jenkins' lookup3 `hashlittle2`, which yields two independent
//! 32 bit hash codes. Together they place a state in a bucket of a
//! [`StateTable`](crate::StateTable); they never decide identity on their
//! own, the table always compares colliding states structurally.

/// Digest material for one state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Digest {
    pub seed_b: u32,
    pub seed_c: u32,
    pub key: Vec<u8>,
}

impl Digest {
    pub fn from_key(key: Vec<u8>) -> Self {
        Digest {
            seed_b: 0,
            seed_c: 0,
            key,
        }
    }

    pub fn from_seeds(seed_b: u32, seed_c: u32) -> Self {
        Digest {
            seed_b,
            seed_c,
            key: vec![],
        }
    }

    /// The two hash codes of this digest.
    pub fn hashes(&self) -> (u32, u32) {
        jenkins_hash(&self.key, self.seed_b, self.seed_c)
    }

    /// Both hash codes packed into the bucket key of a state table.
    pub fn bucket(&self) -> u64 {
        let (a, b) = self.hashes();
        ((a as u64) << 32) | b as u64
    }
}

/// Anything that can be stored in a state table.
pub trait StateDigest {
    fn digest(&self) -> Digest;
}

#[inline]
fn mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(4);
    *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(6);
    *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(8);
    *b = b.wrapping_add(*a);
    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(16);
    *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(19);
    *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(4);
    *b = b.wrapping_add(*a);
}

#[inline]
fn finalize(a: &mut u32, b: &mut u32, c: &mut u32) {
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(14));
    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(11));
    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(25));
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(16));
    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(4));
    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(14));
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(24));
}

/// Little endian word from up to four bytes, zero padded.
#[inline]
fn word(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .enumerate()
        .fold(0u32, |acc, (i, b)| acc | (*b as u32) << (8 * i))
}

/// lookup3 `hashlittle2`: hashes `key` with the primary seed `pc` and the
/// secondary seed `pb`, returning `(c, b)`.
pub fn jenkins_hash(key: &[u8], pc: u32, pb: u32) -> (u32, u32) {
    let init = 0xdead_beef_u32
        .wrapping_add(key.len() as u32)
        .wrapping_add(pc);
    let (mut a, mut b, mut c) = (init, init, init.wrapping_add(pb));

    if key.is_empty() {
        return (c, b);
    }

    let mut rest = key;
    while rest.len() > 12 {
        a = a.wrapping_add(word(&rest[0..4]));
        b = b.wrapping_add(word(&rest[4..8]));
        c = c.wrapping_add(word(&rest[8..12]));
        mix(&mut a, &mut b, &mut c);
        rest = &rest[12..];
    }

    // last block, 1 to 12 bytes
    a = a.wrapping_add(word(rest));
    if rest.len() > 4 {
        b = b.wrapping_add(word(&rest[4..]));
    }
    if rest.len() > 8 {
        c = c.wrapping_add(word(&rest[8..]));
    }
    finalize(&mut a, &mut b, &mut c);
    (c, b)
}

#[cfg(test)]
mod digest_test {
    use super::*;

    // reference values from the lookup3 self test driver
    #[test]
    fn lookup3_vectors() {
        assert_eq!(jenkins_hash(b"", 0, 0), (0xdeadbeef, 0xdeadbeef));
        assert_eq!(jenkins_hash(b"", 0, 0xdeadbeef), (0xbd5b7dde, 0xdeadbeef));
        assert_eq!(
            jenkins_hash(b"", 0xdeadbeef, 0xdeadbeef),
            (0x9c093ccd, 0xbd5b7dde)
        );
        let four_score = b"Four score and seven years ago";
        assert_eq!(jenkins_hash(four_score, 0, 0), (0x17770551, 0xce7226e6));
        assert_eq!(jenkins_hash(four_score, 0, 1), (0xe3607cae, 0xbd371de4));
        assert_eq!(jenkins_hash(four_score, 1, 0), (0xcd628161, 0x6cbea4b3));
    }

    #[test]
    fn seeds_change_the_bucket() {
        let d1 = Digest::from_seeds(17, 2);
        let d2 = Digest::from_seeds(17, 3);
        let d3 = Digest::from_seeds(18, 2);
        assert_ne!(d1.bucket(), d2.bucket());
        assert_ne!(d1.bucket(), d3.bucket());
        assert_eq!(d1.bucket(), Digest::from_seeds(17, 2).bucket());
    }

    #[test]
    fn every_tail_length_is_hashed() {
        let key: Vec<u8> = (1..=25).collect();
        let mut seen = std::collections::HashSet::new();
        for len in 0..=key.len() {
            assert!(seen.insert(jenkins_hash(&key[..len], 0, 0)), "length {len}");
        }
    }
}
