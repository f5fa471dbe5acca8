//! Legacy "open password" transform.
//!
//! The gateway sends a string of decimal digits; each digit selects a
//! shift/mask step applied to a 32-bit accumulator seeded with the numeric
//! password at the first non-zero digit.

/// Digest of `password` under `nonce`. Non-digit characters behave like `0`
/// except that they still OR the accumulators together.
pub fn digest(password: u32, nonce: &str) -> u32 {
    let mut a: u32 = 0;
    let mut b: u32 = 0;
    let mut seeded = false;

    for c in nonce.chars() {
        if c != '0' && !seeded {
            b = password;
            seeded = true;
        }
        (a, b) = match c {
            '1' => ((b & 0xFFFF_FF80) >> 7, b << 25),
            '2' => ((b & 0xFFFF_FFF0) >> 4, b << 28),
            '3' => ((b & 0xFFFF_FFF8) >> 3, b << 29),
            '4' => (b << 1, b >> 31),
            '5' => (b << 5, b >> 27),
            '6' => (b << 12, b >> 20),
            '7' => (
                (b & 0xFF00) | ((b & 0xFF) << 24) | ((b & 0x00FF_0000) >> 16),
                (b & 0xFF00_0000) >> 8,
            ),
            '8' => (((b & 0xFFFF) << 16) | (b >> 24), (b & 0x00FF_0000) >> 8),
            '9' => (!b, b),
            _ => (b, b),
        };
        if c != '0' && c != '9' {
            a |= b;
        }
        b = a;
    }
    a
}

/// Parse a legacy password. Only plain decimal numbers are accepted.
pub fn parse_password(password: &str) -> Option<u32> {
    if password.is_empty() || !password.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    password.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(digest(12345, "603356072"), 25_280_520);
        assert_eq!(digest(12345, "410501656"), 119_537_670);
        assert_eq!(digest(12345, "630292165"), 4_269_684_735);
        assert_eq!(digest(12345, "523781130"), 537_331_200);
        assert_eq!(digest(987_654_321, "0123456789"), 1_947_816_684);
    }

    #[test]
    fn nine_inverts() {
        assert_eq!(digest(12345, "9"), !12345);
    }

    #[test]
    fn all_zero_nonce_ignores_the_password() {
        for password in [0, 1, 12345, u32::MAX] {
            assert_eq!(digest(password, "0000"), 0);
            assert_eq!(digest(password, ""), 0);
        }
    }

    #[test]
    fn password_parsing() {
        assert_eq!(parse_password("12345"), Some(12345));
        assert_eq!(parse_password("abc"), None);
        assert_eq!(parse_password("+12"), None);
        assert_eq!(parse_password(""), None);
        assert_eq!(parse_password("99999999999"), None);
    }
}
