/*
 * A reversible byte-stream transform used to obscure persisted configuration
 * text. Each byte is XORed with the low byte of a 64-bit linear congruential
 * generator that advances once per byte, so applying the transform twice with
 * the same key is an exact identity.
 *
 * This is an obfuscation layer, not a security control. Anyone with the seed
 * (or the application binary) can reverse it.
 */
use sha2::{Digest, Sha256};

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1;
const LCG_MASK: u64 = (1 << 63) - 1;

/*
 * The keystream seed. Built either from a raw integer or from a password
 * string, which is reduced to a seed through SHA-256 (low eight bytes of the
 * digest). The empty password maps to seed 0.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObfuscationKey {
    seed: u64,
}

impl ObfuscationKey {
    pub fn from_seed(seed: u64) -> Self {
        ObfuscationKey { seed }
    }

    pub fn from_password(password: &str) -> Self {
        if password.is_empty() {
            return ObfuscationKey { seed: 0 };
        }
        let digest = Sha256::digest(password.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        ObfuscationKey {
            seed: u64::from_le_bytes(bytes),
        }
    }
}

fn advance(state: u64) -> u64 {
    LCG_MULTIPLIER.wrapping_mul(state).wrapping_add(LCG_INCREMENT) & LCG_MASK
}

/*
 * Transforms `data` in place. The state advances once per byte, so the
 * transform depends on byte position as well as the key.
 */
pub fn transform_in_place(data: &mut [u8], key: &ObfuscationKey) {
    let mut state = key.seed;
    for byte in data.iter_mut() {
        *byte ^= (state & 0xFF) as u8;
        state = advance(state);
    }
}

pub fn transform(data: &[u8], key: &ObfuscationKey) -> Vec<u8> {
    let mut out = data.to_vec();
    transform_in_place(&mut out, key);
    out
}
