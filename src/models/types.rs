use ethers::types::{H160, H256, U256}; // Re-exported primitives shared with the contract bindings

pub type Address = H160; // Ethereum address as a 20-byte hexadecimal type
pub type Hash = H256;    // 32-byte transaction hash
pub type Wei = U256;     // Base currency unit (10^-18 of the display unit)

/// Formats a hash the way the chain reports it: `0x` followed by 64 lowercase hex digits.
pub fn hash_to_hex(hash: &Hash) -> String {
    format!("{:?}", hash)
}

/// True for `0x` followed by exactly 64 hex digits, either case.
pub fn is_hash_hex(value: &str) -> bool {
    value.len() == 66 && value.starts_with("0x") && value[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Formats an address as a full `0x`-prefixed hex string.
pub fn address_to_hex(address: &Address) -> String {
    format!("{:?}", address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_hex_is_full_width() {
        let hex = hash_to_hex(&Hash::repeat_byte(0xab));
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("0xabab"));
    }

    #[test]
    fn hash_shape_is_strict() {
        assert!(is_hash_hex(&hash_to_hex(&Hash::repeat_byte(0xcd))));
        assert!(is_hash_hex(&format!("0x{}", "AB".repeat(32))));
        assert!(!is_hash_hex("0xabc"));
        assert!(!is_hash_hex(&"ab".repeat(33)));
        assert!(!is_hash_hex(&format!("0x{}", "zz".repeat(32))));
    }

    #[test]
    fn address_hex_is_not_abbreviated() {
        let hex = address_to_hex(&Address::repeat_byte(0x11));
        assert_eq!(hex, format!("0x{}", "11".repeat(20)));
    }
}
