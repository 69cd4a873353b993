use shroud_types::{Hash256, SymmetricKey};

pub fn blake3_hash(data: &[u8]) -> Hash256 {
    let hash = blake3::hash(data);
    Hash256::from_bytes(*hash.as_bytes())
}

/// Hashes a sequence of fields, each prefixed with its length as a big-endian u64,
/// so that `("ab", "c")` and `("a", "bc")` never collide.
pub struct FieldHasher {
    inner: blake3::Hasher,
}

impl FieldHasher {
    pub fn new_derive_key(context: &str) -> Self {
        Self {
            inner: blake3::Hasher::new_derive_key(context),
        }
    }

    pub fn new_keyed(key: &SymmetricKey, domain: &str) -> Self {
        let mut hasher = Self {
            inner: blake3::Hasher::new_keyed(key.as_bytes()),
        };
        hasher.field(domain.as_bytes());
        hasher
    }

    pub fn field(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(&(data.len() as u64).to_be_bytes());
        self.inner.update(data);
        self
    }

    pub fn finalize(&self) -> Hash256 {
        Hash256::from_bytes(*self.inner.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake3_hash() {
        let data = b"shroud test data";
        let hash1 = blake3_hash(data);
        let hash2 = blake3_hash(data);
        assert_eq!(hash1, hash2);

        let different = blake3_hash(b"different data");
        assert_ne!(hash1, different);
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let a = FieldHasher::new_derive_key("ctx").field(b"ab").field(b"c").finalize();
        let b = FieldHasher::new_derive_key("ctx").field(b"a").field(b"bc").finalize();
        assert_ne!(a, b);
    }

    #[test]
    fn test_keyed_hasher_depends_on_key() {
        let k1 = SymmetricKey::from_bytes([0xab; 32]);
        let k2 = SymmetricKey::from_bytes([0xcd; 32]);
        let a = FieldHasher::new_keyed(&k1, "tag").field(b"x").finalize();
        let b = FieldHasher::new_keyed(&k2, "tag").field(b"x").finalize();
        assert_ne!(a, b);
    }
}
