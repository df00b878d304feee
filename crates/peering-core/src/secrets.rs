//! Session secret obfuscation
//!
//! Cisco type-7 reversible obfuscation for rendering session passwords into
//! configuration text. This is obfuscation, not encryption: the scheme
//! exists so secrets are not stored in config files as clear text, and it
//! round-trips exactly.

use peering_common::{PeeringError, PeeringResult};

/// Fixed XOR key of the type-7 scheme
const XLAT: &[u8] = b"dsfd;kfoA,.iyewrkldJKDHSUBsgvca69834ncxv9873254k;fg87";

/// Highest accepted key offset; encoded as the leading two decimal digits
const MAX_SEED: usize = 15;

/// Obfuscate a secret with the given key offset
///
/// Output is the two-digit offset followed by one uppercase hex pair per
/// secret byte. Deterministic for a given `(secret, seed)` pair.
pub fn cisco_type7_encrypt(secret: &str, seed: usize) -> PeeringResult<String> {
    if seed > MAX_SEED {
        return Err(PeeringError::InvalidArgument {
            filter: "cisco_password",
            reason: format!("seed {} out of range 0-{}", seed, MAX_SEED),
        });
    }
    let mut encoded = format!("{:02}", seed);
    for (i, byte) in secret.bytes().enumerate() {
        let key = XLAT[(seed + i) % XLAT.len()];
        encoded.push_str(&format!("{:02X}", byte ^ key));
    }
    Ok(encoded)
}

/// Recover the secret from its type-7 form
pub fn cisco_type7_decrypt(encoded: &str) -> PeeringResult<String> {
    let invalid = |reason: &str| PeeringError::InvalidArgument {
        filter: "cisco_password",
        reason: reason.to_string(),
    };

    if encoded.len() < 2 || encoded.len() % 2 != 0 {
        return Err(invalid("encoded secret has truncated length"));
    }
    let (seed_part, hex_part) = encoded.split_at(2);
    let seed: usize = seed_part
        .parse()
        .map_err(|_| invalid("encoded secret does not start with a two-digit offset"))?;
    if seed > MAX_SEED {
        return Err(invalid("key offset out of range"));
    }

    let mut secret = Vec::with_capacity(hex_part.len() / 2);
    for (i, pair) in hex_part.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(pair).map_err(|_| invalid("non-ASCII hex digits"))?;
        let byte =
            u8::from_str_radix(pair, 16).map_err(|_| invalid("non-hex digits in secret"))?;
        let key = XLAT[(seed + i) % XLAT.len()];
        secret.push(byte ^ key);
    }
    String::from_utf8(secret).map_err(|_| invalid("decoded secret is not valid UTF-8"))
}
