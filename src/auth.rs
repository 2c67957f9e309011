//! Identity resolution and the admin authorization gate.
//!
//! Bearer tokens are JSON claims signed with an ed25519 key, encoded as
//! `hex(claims).hex(signature)`. Verification is strict: a token is either
//! intact, unexpired, and signed by this gate's key, or the caller is
//! unauthenticated.

use chrono::{Duration, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::AuthError;

/// Role a user holds in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// The acting user, as resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    /// The single authorization gate in front of every admin-only operation.
    pub fn require_admin(&self) -> Result<(), AuthError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Customer => Err(AuthError::Forbidden),
        }
    }
}

/// Data payload of a token before signing.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: String,
    role: Role,
    expires_at: i64,
}

/// Issues and verifies signed bearer tokens.
pub struct AuthGate {
    signing_key: SigningKey,
}

impl AuthGate {
    pub fn new() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn issue(&self, user_id: &str, role: Role, ttl: Duration) -> String {
        let claims = Claims {
            user_id: user_id.to_string(),
            role,
            expires_at: (Utc::now() + ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims).expect("serialization should not fail");
        let signature = self.signing_key.sign(&payload);
        format!("{}.{}", hex::encode(&payload), hex::encode(signature.to_bytes()))
    }

    pub fn authenticate(&self, bearer: &str) -> Result<Identity, AuthError> {
        let (payload_hex, signature_hex) = bearer
            .split_once('.')
            .ok_or_else(|| AuthError::Unauthenticated("malformed token".to_string()))?;
        let payload = hex::decode(payload_hex)
            .map_err(|_| AuthError::Unauthenticated("malformed token".to_string()))?;
        let signature_bytes: [u8; 64] = hex::decode(signature_hex)
            .map_err(|_| AuthError::Unauthenticated("malformed signature".to_string()))?
            .try_into()
            .map_err(|_| AuthError::Unauthenticated("malformed signature".to_string()))?;
        let signature = Signature::from_bytes(&signature_bytes);

        self.signing_key
            .verifying_key()
            .verify(&payload, &signature)
            .map_err(|_| AuthError::Unauthenticated("invalid signature".to_string()))?;

        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|_| AuthError::Unauthenticated("invalid claims".to_string()))?;
        if Utc::now().timestamp() > claims.expires_at {
            return Err(AuthError::Unauthenticated("token expired".to_string()));
        }

        debug!(user_id = %claims.user_id, role = %claims.role, "Token verified");
        Ok(Identity {
            user_id: claims.user_id,
            role: claims.role,
        })
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_authenticate_roundtrip() {
        let gate = AuthGate::new();
        let token = gate.issue("user_1", Role::Admin, Duration::hours(1));

        let identity = gate.authenticate(&token).unwrap();
        assert_eq!(identity.user_id, "user_1");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn expired_token_is_rejected() {
        let gate = AuthGate::new();
        let token = gate.issue("user_1", Role::Customer, Duration::seconds(-5));

        let err = gate.authenticate(&token).unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated("token expired".to_string()));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let gate = AuthGate::new();
        let token = gate.issue("user_1", Role::Customer, Duration::hours(1));

        // Swap in claims for a different user, keeping the original signature.
        let (_, signature_hex) = token.split_once('.').unwrap();
        let forged_claims = serde_json::to_vec(&Claims {
            user_id: "user_2".to_string(),
            role: Role::Admin,
            expires_at: (Utc::now() + Duration::hours(1)).timestamp(),
        })
        .unwrap();
        let forged = format!("{}.{}", hex::encode(forged_claims), signature_hex);

        let err = gate.authenticate(&forged).unwrap_err();
        assert_eq!(
            err,
            AuthError::Unauthenticated("invalid signature".to_string())
        );
    }

    #[test]
    fn token_from_another_gate_is_rejected() {
        let gate = AuthGate::new();
        let other = AuthGate::new();
        let token = other.issue("user_1", Role::Admin, Duration::hours(1));

        assert!(matches!(
            gate.authenticate(&token),
            Err(AuthError::Unauthenticated(_))
        ));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let gate = AuthGate::new();
        for bearer in ["", "not-a-token", "abc.def", "zz.zz"] {
            assert!(matches!(
                gate.authenticate(bearer),
                Err(AuthError::Unauthenticated(_))
            ));
        }
    }

    #[test]
    fn admin_gate() {
        let admin = Identity {
            user_id: "user_1".to_string(),
            role: Role::Admin,
        };
        let customer = Identity {
            user_id: "user_2".to_string(),
            role: Role::Customer,
        };

        assert!(admin.require_admin().is_ok());
        assert_eq!(customer.require_admin(), Err(AuthError::Forbidden));
    }
}
