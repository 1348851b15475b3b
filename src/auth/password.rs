use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

use crate::config::PasswordPolicy;

/// Passwords rejected outright regardless of length
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "passw0rd", "12345678", "123456789", "1234567890",
    "11111111", "00000000", "87654321", "qwerty123", "qwertyuiop", "1q2w3e4r", "1qaz2wsx",
    "abc12345", "abcd1234", "iloveyou", "letmein1", "welcome1", "welcome123", "admin123",
    "administrator", "changeme", "trustno1", "sunshine", "princess", "football", "baseball",
    "superman", "starwars", "whatever", "dragon12", "monkey12", "master123", "shadow12",
    "michael1", "jennifer", "computer", "internet", "q1w2e3r4",
];

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a plaintext password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

impl PasswordPolicy {
    /// Returns every rule the password breaks, empty when it is acceptable
    pub fn violations(&self, password: &str, username: &str, email: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if password.chars().count() < self.min_length {
            problems.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }

        let lowered = password.to_lowercase();
        if self.reject_common && COMMON_PASSWORDS.contains(&lowered.as_str()) {
            problems.push("This password is too common.".to_string());
        }

        if self.reject_numeric && !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.".to_string());
        }

        if self.reject_similar {
            let local_part = email.split('@').next().unwrap_or_default();
            for (attribute, value) in [("username", username), ("email address", local_part)] {
                if is_similar(&lowered, &value.to_lowercase()) {
                    problems.push(format!("The password is too similar to the {}.", attribute));
                    break;
                }
            }
        }

        problems
    }
}

fn is_similar(password: &str, attribute: &str) -> bool {
    if attribute.chars().count() < 3 {
        return false;
    }
    password.contains(attribute) || attribute.contains(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_passes_default_policy() {
        let policy = PasswordPolicy::default();
        assert!(policy.violations("Str0ng!Pass", "alice", "a@x.com").is_empty());
    }

    #[test]
    fn weak_passwords_report_each_rule() {
        let policy = PasswordPolicy::default();

        let short = policy.violations("abc", "alice", "a@x.com");
        assert_eq!(short.len(), 1);
        assert!(short[0].contains("too short"));

        assert!(policy
            .violations("password", "alice", "a@x.com")
            .iter()
            .any(|p| p.contains("too common")));

        let numeric = policy.violations("93810274", "alice", "a@x.com");
        assert!(numeric.iter().any(|p| p.contains("entirely numeric")));

        let similar = policy.violations("alice2024!", "alice", "a@x.com");
        assert_eq!(similar, vec!["The password is too similar to the username.".to_string()]);

        let by_email = policy.violations("Robert-99x", "kim", "robert@x.com");
        assert!(by_email.iter().any(|p| p.contains("email address")));
    }

    #[test]
    fn rules_can_be_relaxed() {
        let policy = PasswordPolicy {
            min_length: 4,
            reject_numeric: false,
            reject_common: false,
            reject_similar: false,
        };
        assert!(policy.violations("1234", "alice", "a@x.com").is_empty());
    }

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("Str0ng!Pass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Str0ng!Pass", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("Str0ng!Pass", "not-a-hash"));
    }
}
