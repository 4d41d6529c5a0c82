/// The archive's upper-case binary string hash.
///
/// Identifiers are hashed byte by byte as `hash = hash * 33 + upper(byte)`,
/// seeded with `0xFFFF_FFFF`. The upper-casing makes lookups insensitive to
/// the mixed casing found in key lists and embedded resource names.
pub fn binary_upper_hash(name: &str) -> u32 {
    let mut hash: u32 = 0xFFFF_FFFF;
    for byte in name.bytes() {
        hash = hash
            .wrapping_mul(33)
            .wrapping_add(u32::from(byte.to_ascii_uppercase()));
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(binary_upper_hash(""), 0xFFFF_FFFF);
        assert_eq!(binary_upper_hash("A"), 0x20);
        assert_eq!(binary_upper_hash("AB"), 0x462);
    }

    #[test]
    fn hashing_is_case_insensitive() {
        assert_eq!(
            binary_upper_hash("tracks/l6r_fe.bun"),
            binary_upper_hash("TRACKS/L6R_FE.BUN")
        );
    }
}
