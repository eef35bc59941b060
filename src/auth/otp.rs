//! One-time password generation for password recovery.

use rand::Rng;

/// OTP alphabet: lowercase alphanumerics, no specials.
const OTP_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated one-time passwords.
pub const OTP_LENGTH: usize = 6;

/// Generate a 6-character one-time password from `[a-z0-9]`.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..OTP_CHARSET.len());
            OTP_CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_has_expected_length() {
        assert_eq!(generate_otp().len(), OTP_LENGTH);
    }

    #[test]
    fn otp_uses_lowercase_alphanumerics_only() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert!(otp.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()), "{}", otp);
        }
    }

    #[test]
    fn otps_vary() {
        let first = generate_otp();
        let any_different = (0..20).map(|_| generate_otp()).any(|otp| otp != first);
        assert!(any_different);
    }
}
