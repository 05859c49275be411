use rand::Rng;

pub const REFERENCE_PREFIX: &str = "TRV";
const REFERENCE_SUFFIX_LEN: usize = 9;
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a booking reference such as `TRVAB123XYZ`
pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_SUFFIX_LEN)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", REFERENCE_PREFIX, suffix)
}

/// Trim a supplied reference; blank input counts as absent.
pub fn normalize_reference(reference: Option<&str>) -> Option<String> {
    reference
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

/// True for `TRV` followed by up to 9 uppercase alphanumerics.
///
/// New references always carry the full 9; older ones such as `TRVAB123XYZ` are shorter.
pub fn is_issued_format(reference: &str) -> bool {
    reference
        .strip_prefix(REFERENCE_PREFIX)
        .is_some_and(|suffix| {
            (1..=REFERENCE_SUFFIX_LEN).contains(&suffix.len())
                && suffix.bytes().all(|b| REFERENCE_ALPHABET.contains(&b))
        })
}
