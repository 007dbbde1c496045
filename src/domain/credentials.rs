//! Salted password digests for mock accounts

use sha2::{Digest, Sha256};

/// Salt and SHA-256 digest of `salt || password`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    salt: String,
    digest: String,
}

impl Credentials {
    /// Derive credentials with a fresh random salt
    pub fn new(password: &str) -> Self {
        Self::with_salt(uuid::Uuid::new_v4().simple().to_string(), password)
    }

    pub fn with_salt(salt: impl Into<String>, password: &str) -> Self {
        let salt = salt.into();
        let digest = digest(&salt, password);
        Self { salt, digest }
    }

    pub fn verify(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.digest
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let creds = Credentials::new("secret1");
        assert!(creds.verify("secret1"));
        assert!(!creds.verify("secret2"));
        assert!(!creds.verify(""));
    }

    #[test]
    fn test_salt_changes_digest() {
        let a = Credentials::with_salt("a", "pw");
        let b = Credentials::with_salt("b", "pw");
        assert_ne!(a, b);
        assert_eq!(Credentials::with_salt("a", "pw"), a);
    }
}
