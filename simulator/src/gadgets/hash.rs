use sha2::digest::{consts::U64, generic_array::GenericArray};

/// The Keccak-f[1600] permutation over 25 lanes.
pub fn keccak_f1600(mut state: [u64; 25]) -> [u64; 25] {
    tiny_keccak::keccakf(&mut state);
    state
}

/// One SHA-256 compression round: no padding, no length block.
pub fn sha256_compression(mut state: [u32; 8], input: [u32; 16]) -> [u32; 8] {
    let mut block = GenericArray::<u8, U64>::default();
    for (chunk, word) in block.chunks_exact_mut(4).zip(input) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    sha2::compress256(&mut state, &[block]);
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256_IV: [u32; 8] = [
        0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab,
        0x5be0cd19,
    ];

    #[test]
    fn test_sha256_compression_of_padded_empty_message() {
        let mut block = [0u32; 16];
        block[0] = 0x8000_0000;
        assert_eq!(
            sha256_compression(SHA256_IV, block),
            [
                0xe3b0c442, 0x98fc1c14, 0x9afbf4c8, 0x996fb924, 0x27ae41e4, 0x649b934c, 0xa495991b,
                0x7852b855
            ]
        );
    }

    #[test]
    fn test_keccak_f1600_of_zero_state() {
        let state = keccak_f1600([0; 25]);
        assert_eq!(state[0], 0xf1258f7940e1dde7);
        assert_eq!(state[1], 0x84d5ccf933c0478a);
    }
}
