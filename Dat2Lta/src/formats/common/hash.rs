//! Hashing utilities

/// LithTech `st_GetHashCode_ic` equivalent.
///
/// Case-insensitive: each character is upper-cased and offset from `'A'`
/// before being folded in with a multiplier of 29. Occluder polygons store
/// this hash instead of their name.
#[must_use]
pub fn hash_name_ic(s: &str) -> u32 {
    s.chars().flat_map(char::to_uppercase).fold(0u32, |n, c| {
        n.wrapping_mul(29).wrapping_add(u32::from(c).wrapping_sub(u32::from('A')))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_case_insensitive() {
        assert_eq!(hash_name_ic("Occluder_02"), hash_name_ic("OCCLUDER_02"));
        assert_eq!(hash_name_ic("windowbreak"), hash_name_ic("WindowBreak"));
    }

    #[test]
    fn test_hash_known_values() {
        assert_eq!(hash_name_ic(""), 0);
        assert_eq!(hash_name_ic("A"), 0);
        assert_eq!(hash_name_ic("B"), 1);
        // (1 * 29) + 2
        assert_eq!(hash_name_ic("bc"), 31);
        // Characters below 'A' wrap around like the engine's unsigned math
        assert_eq!(hash_name_ic("0"), u32::from('0').wrapping_sub(65));
    }
}
