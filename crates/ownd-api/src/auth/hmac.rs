//! HMAC challenge-response handshake primitives.
//!
//! Digests travel on the wire as "int-strings": every hex nibble of a
//! digest becomes a two-digit decimal number, so `0a1f` is sent as
//! `00100115`.

use rand::Rng;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Direction-binding constants appended by the client.
const CLIENT_TAG_A: &str = "736F70653E";
const CLIENT_TAG_B: &str = "636F70653E";

/// Length of the random seed of a client nonce.
const NONCE_SEED_DIGITS: usize = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum HashAlgorithm {
    #[strum(serialize = "SHA-1")]
    Sha1,
    #[strum(serialize = "SHA-256")]
    Sha256,
}

impl HashAlgorithm {
    /// Algorithm announced by a `*98*<code>##` challenge.
    pub fn from_challenge(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Sha1),
            2 => Some(Self::Sha256),
            _ => None,
        }
    }

    pub fn challenge_code(self) -> u8 {
        match self {
            Self::Sha1 => 1,
            Self::Sha256 => 2,
        }
    }

    /// Lowercase hex digest of `data`.
    pub fn hex_digest(self, data: &[u8]) -> String {
        match self {
            Self::Sha1 => hex::encode(Sha1::digest(data)),
            Self::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }
}

/// `0a1f` → `00100115`.
pub fn hex_to_int(hex: &str) -> Option<String> {
    hex.chars()
        .map(|c| c.to_digit(16).map(|n| format!("{n:02}")))
        .collect()
}

/// `00100115` → `0a1f`. Fails on odd length or non-digits.
pub fn int_to_hex(int_string: &str) -> Option<String> {
    let bytes = int_string.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks_exact(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            if !pair.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            pair.parse::<u32>().ok().map(|n| format!("{n:x}"))
        })
        .collect()
}

/// A fresh client nonce `Rb`, already int-string encoded.
pub fn client_nonce(algorithm: HashAlgorithm) -> String {
    let mut rng = rand::thread_rng();
    let seed: String = (0..NONCE_SEED_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    let digest = algorithm.hex_digest(seed.as_bytes());
    hex_to_int(&digest).unwrap_or_default()
}

fn proof(
    algorithm: HashAlgorithm,
    ra: &str,
    rb: &str,
    password: &str,
    tags: &[&str],
) -> Option<String> {
    let mut material = int_to_hex(ra)?;
    material.push_str(&int_to_hex(rb)?);
    for tag in tags {
        material.push_str(tag);
    }
    material.push_str(&algorithm.hex_digest(password.as_bytes()));
    hex_to_int(&algorithm.hex_digest(material.as_bytes()))
}

/// Proof the client sends alongside `Rb`.
pub fn client_digest(algorithm: HashAlgorithm, ra: &str, rb: &str, password: &str) -> Option<String> {
    proof(algorithm, ra, rb, password, &[CLIENT_TAG_A, CLIENT_TAG_B])
}

/// Proof the gateway must answer with.
pub fn server_digest(algorithm: HashAlgorithm, ra: &str, rb: &str, password: &str) -> Option<String> {
    proof(algorithm, ra, rb, password, &[])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PASSWORD: &str = "12345678";

    fn nonces(algorithm: HashAlgorithm) -> (String, String) {
        let ra = hex_to_int(&algorithm.hex_digest(b"server")).expect("hex");
        let rb = hex_to_int(&algorithm.hex_digest(b"client")).expect("hex");
        (ra, rb)
    }

    #[test]
    fn int_string_conversions() {
        assert_eq!(hex_to_int("0a1f").as_deref(), Some("00100115"));
        assert_eq!(int_to_hex("00100115").as_deref(), Some("0a1f"));
        assert_eq!(int_to_hex("001"), None);
        assert_eq!(int_to_hex("0x"), None);
        assert_eq!(hex_to_int("zz"), None);
    }

    #[test]
    fn int_string_round_trips_digests() {
        for algorithm in [HashAlgorithm::Sha1, HashAlgorithm::Sha256] {
            let hex = algorithm.hex_digest(b"round trip");
            let int = hex_to_int(&hex).expect("hex");
            assert_eq!(int.len(), hex.len() * 2);
            assert_eq!(int_to_hex(&int), Some(hex));
        }
    }

    #[test]
    fn sha1_proofs() {
        let (ra, rb) = nonces(HashAlgorithm::Sha1);
        assert_eq!(
            ra,
            "03131404150900011515151103001012070200110014071411060504110415101002131300031510"
        );
        assert_eq!(
            rb,
            "13021000041307010300011008090105020107131305151015080113010212151513061213090508"
        );
        assert_eq!(
            client_digest(HashAlgorithm::Sha1, &ra, &rb, PASSWORD).as_deref(),
            Some("02141514020000091310031509090806100412140100000300100505061509050707021013021414")
        );
        assert_eq!(
            server_digest(HashAlgorithm::Sha1, &ra, &rb, PASSWORD).as_deref(),
            Some("09050515150103040408020815010008051208080007020802080306110110030200070302020014")
        );
    }

    #[test]
    fn sha256_proofs() {
        let (ra, rb) = nonces(HashAlgorithm::Sha256);
        assert_eq!(
            client_digest(HashAlgorithm::Sha256, &ra, &rb, PASSWORD).as_deref(),
            Some(
                "10000205141507130800080904031315151103060107030413110310080400140101030807031002141115030206060608111207140004141215140715051113"
            )
        );
        assert_eq!(
            server_digest(HashAlgorithm::Sha256, &ra, &rb, PASSWORD).as_deref(),
            Some(
                "05041010090105051206060100051106001302041502050300010113110706020212040505071100130405140210100003100707131014110003070202051003"
            )
        );
    }

    #[test]
    fn client_nonces_are_fresh_int_strings() {
        let a = client_nonce(HashAlgorithm::Sha256);
        let b = client_nonce(HashAlgorithm::Sha256);
        assert_eq!(a.len(), 128);
        assert!(a.bytes().all(|c| c.is_ascii_digit()));
        assert_ne!(a, b);
    }

    #[test]
    fn challenge_codes() {
        assert_eq!(HashAlgorithm::from_challenge(1), Some(HashAlgorithm::Sha1));
        assert_eq!(HashAlgorithm::from_challenge(2), Some(HashAlgorithm::Sha256));
        assert_eq!(HashAlgorithm::from_challenge(3), None);
        assert_eq!(HashAlgorithm::Sha256.challenge_code(), 2);
    }
}
