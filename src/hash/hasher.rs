use crate::foundation::core::Affine;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x6d1f_3a92_c45b_08e7;

/// Substituted for a raw digest of 0. The per-object hash cache
/// reserves 0 for "not computed", so a finalized hash is never 0.
const ZERO_DIGEST_SUBSTITUTE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Streaming 64-bit content hash accumulator.
///
/// Scalars appended in identical order always produce identical
/// values. The accumulator must be finalized with [`Hash64::finish`]
/// before the value can be read; finalization is idempotent.
pub struct Hash64 {
    inner: Xxh3,
    value: Option<u64>,
}

impl Default for Hash64 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hash64 {
    /// Fresh accumulator with the crate-wide seed.
    pub fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
            value: None,
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        debug_assert!(self.value.is_none(), "append after finish");
        self.inner.update(b);
    }

    /// Append a boolean as one byte.
    pub fn append_bool(&mut self, v: bool) {
        self.write_bytes(&[u8::from(v)]);
    }

    /// Append a byte.
    pub fn append_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    /// Append a 32-bit unsigned integer (little-endian bytes).
    pub fn append_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Append a 64-bit unsigned integer (little-endian bytes).
    pub fn append_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Append a 32-bit signed integer (little-endian bytes).
    pub fn append_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Append a 64-bit signed integer (little-endian bytes).
    pub fn append_i64(&mut self, v: i64) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Append a 32-bit float by bit pattern.
    pub fn append_f32(&mut self, v: f32) {
        self.append_u32(v.to_bits());
    }

    /// Append a 64-bit float by bit pattern.
    pub fn append_f64(&mut self, v: f64) {
        self.append_u64(v.to_bits());
    }

    /// Append a string as its byte sequence.
    pub fn append_str(&mut self, v: &str) {
        self.write_bytes(v.as_bytes());
    }

    /// Append the six coefficients of an affine transform.
    pub fn append_affine(&mut self, t: &Affine) {
        for c in t.as_coeffs() {
            self.append_f64(c);
        }
    }

    /// Finalize and return the hash value. Idempotent: further calls
    /// return the same value. The result is never 0.
    pub fn finish(&mut self) -> u64 {
        if let Some(v) = self.value {
            return v;
        }
        let mut v = self.inner.digest();
        if v == 0 {
            v = ZERO_DIGEST_SUBSTITUTE;
        }
        self.value = Some(v);
        v
    }

    /// The finalized value, or `None` before [`Hash64::finish`].
    pub fn value(&self) -> Option<u64> {
        self.value
    }
}
