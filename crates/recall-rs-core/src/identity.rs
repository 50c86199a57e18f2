//! Actor id derivation from customer identities.

use crate::error::HookError;
use recall_rs_config::IdentityConfig;
use sha2::{Digest, Sha256};

/// Derive a stable actor id from an email address.
///
/// The email is trimmed and lowercased before hashing, so the same customer
/// maps to the same memory partitions regardless of how the address was typed.
pub fn actor_id_from_email(email: &str, identity: &IdentityConfig) -> Result<String, HookError> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(HookError::InvalidConfig("email is empty".to_string()));
    }
    if identity.hash_len == 0 || identity.hash_len > 64 {
        return Err(HookError::InvalidConfig(format!(
            "identity.hash_len must be between 1 and 64, got {}",
            identity.hash_len
        )));
    }
    let digest = format!("{:x}", Sha256::digest(normalized.as_bytes()));
    Ok(format!(
        "{}{}",
        identity.actor_prefix,
        &digest[..identity.hash_len]
    ))
}

#[cfg(test)]
mod tests {
    use super::actor_id_from_email;
    use crate::error::HookError;
    use pretty_assertions::assert_eq;
    use recall_rs_config::IdentityConfig;

    #[test]
    fn derives_prefixed_digest() {
        let identity = IdentityConfig::default();
        assert_eq!(
            actor_id_from_email("alice@example.com", &identity).expect("actor"),
            "customer_ff8d9819"
        );
        assert_eq!(
            actor_id_from_email("  Alice@Example.COM ", &identity).expect("actor"),
            "customer_ff8d9819"
        );
    }

    #[test]
    fn honors_prefix_and_length() {
        let identity = IdentityConfig {
            actor_prefix: "c-".to_string(),
            hash_len: 4,
        };
        assert_eq!(
            actor_id_from_email("alice@example.com", &identity).expect("actor"),
            "c-ff8d"
        );
    }

    #[test]
    fn rejects_blank_email_and_bad_length() {
        let identity = IdentityConfig::default();
        assert!(matches!(
            actor_id_from_email("  ", &identity),
            Err(HookError::InvalidConfig(_))
        ));
        let identity = IdentityConfig {
            hash_len: 65,
            ..IdentityConfig::default()
        };
        assert!(actor_id_from_email("alice@example.com", &identity).is_err());
    }
}
