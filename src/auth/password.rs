use base64::{engine::general_purpose, Engine as _};
use constant_time_eq::constant_time_eq;
use pbkdf2::pbkdf2_hmac;
use rand::{distr::Alphanumeric, Rng};
use sha2::Sha256;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;

/// Django's default; cheap enough per login, expensive enough offline.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

fn derive(password: &str, salt: &str, iterations: u32) -> String {
    let mut out = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut out);
    general_purpose::STANDARD.encode(out)
}

/// Hash in the `pbkdf2_sha256$<iterations>$<salt>$<base64>` format.
pub fn hash_password_with(password: &str, iterations: u32) -> String {
    let salt: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    let hash = derive(password, &salt, iterations);
    format!("{ALGORITHM}${iterations}${salt}${hash}")
}

/// False for malformed hashes as well as wrong passwords.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let parts: Vec<&str> = encoded.split('$').collect();
    if parts.len() != 4 || parts[0] != ALGORITHM {
        return false;
    }
    let iterations: u32 = match parts[1].parse() {
        Ok(i) if i > 0 => i,
        _ => return false,
    };
    let computed = derive(password, parts[2], iterations);
    constant_time_eq(computed.as_bytes(), parts[3].as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_wrong_password() {
        let h = hash_password_with("hunter22", 1_000);
        assert!(h.starts_with("pbkdf2_sha256$1000$"));
        assert!(verify_password("hunter22", &h));
        assert!(!verify_password("hunter23", &h));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password_with("same", 1_000);
        let b = hash_password_with("same", 1_000);
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "sha256$abc"));
        assert!(!verify_password("x", "pbkdf2_sha256$zero$salt$hash"));
        assert!(!verify_password("x", "pbkdf2_sha256$0$salt$hash"));
    }
}
