use crate::error::Result;
use rand::RngCore;
use rand::rngs::OsRng;

/// The size of a download token in bytes.
const TOKEN_SIZE: usize = 16;

/// The length of a hex-encoded download token.
pub const TOKEN_HEX_LEN: usize = TOKEN_SIZE * 2;

/// Generates a new random download token.
///
/// # Returns
///
/// A fixed-length lowercase hex string with 128 bits of entropy. Uniqueness
/// is probabilistic; the store never enforces it.
pub fn generate_download_token() -> Result<String> {
    let mut token = [0u8; TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    Ok(hex::encode(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_fixed_length_hex() {
        let token = generate_download_token().unwrap();
        assert_eq!(token.len(), TOKEN_HEX_LEN);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let a = generate_download_token().unwrap();
        let b = generate_download_token().unwrap();
        assert_ne!(a, b);
    }
}
