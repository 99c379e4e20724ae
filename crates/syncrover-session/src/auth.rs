//! Access credentials for joining a room.
//!
//! The authorization collaborator is server-side; this module reproduces its
//! behavior: a signed, time-scoped credential encoding room, role and a
//! permission set, minted HS256-style
//! (`base64url(header).base64url(claims).base64url(sig)`).
//!
//! Unlike the reference design — which granted the full permission set to
//! every joining peer — permissions default to a least-privilege set derived
//! from the role. The original all-true grant stays available as
//! [`AccessPermissions::full`] for deployments that want it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use syncrover_core::{RoomId, RoverError, SessionRole};

type HmacSha256 = Hmac<Sha256>;

// MARK: - AccessPermissions

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceSources {
    pub cam: bool,
    pub mic: bool,
    pub screen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPermissions {
    pub admin: bool,
    pub can_consume: bool,
    pub can_produce: bool,
    pub can_produce_sources: ProduceSources,
    pub can_recv_data: bool,
    pub can_send_data: bool,
    pub can_update_metadata: bool,
}

impl AccessPermissions {
    /// Everything granted — the reference behavior.
    pub fn full() -> Self {
        Self {
            admin: true,
            can_consume: true,
            can_produce: true,
            can_produce_sources: ProduceSources { cam: true, mic: true, screen: true },
            can_recv_data: true,
            can_send_data: true,
            can_update_metadata: true,
        }
    }

    /// Least-privilege set for a role: the host produces media and drives the
    /// data channel, viewers only consume and receive.
    pub fn for_role(role: SessionRole) -> Self {
        match role {
            SessionRole::Host => Self::full(),
            SessionRole::Viewer => Self {
                admin: false,
                can_consume: true,
                can_produce: false,
                can_produce_sources: ProduceSources::default(),
                can_recv_data: true,
                can_send_data: false,
                can_update_metadata: false,
            },
        }
    }
}

// MARK: - TokenClaims

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub room_id: RoomId,
    pub role: SessionRole,
    pub permissions: AccessPermissions,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

// MARK: - TokenIssuer

pub struct TokenIssuer {
    api_key: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ttl: Self::DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Mint a credential with role-derived permissions.
    pub fn issue(&self, room: &RoomId, role: SessionRole) -> Result<String, RoverError> {
        self.issue_with_permissions(room, role, AccessPermissions::for_role(role))
    }

    /// Mint a credential with an explicit permission set.
    pub fn issue_with_permissions(
        &self,
        room: &RoomId,
        role: SessionRole,
        permissions: AccessPermissions,
    ) -> Result<String, RoverError> {
        self.issue_at(room, role, permissions, unix_now()?)
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, RoverError> {
        self.verify_at(token, unix_now()?)
    }

    fn issue_at(
        &self,
        room: &RoomId,
        role: SessionRole,
        permissions: AccessPermissions,
        now: u64,
    ) -> Result<String, RoverError> {
        let claims = TokenClaims {
            room_id: room.clone(),
            role,
            permissions,
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(auth_err)?);
        let signing_input = format!("{header}.{body}");
        let sig = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes())?);
        Ok(format!("{signing_input}.{sig}"))
    }

    fn verify_at(&self, token: &str, now: u64) -> Result<TokenClaims, RoverError> {
        let mut parts = token.split('.');
        let (header, body, sig) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(b), Some(s), None) => (h, b, s),
            _ => {
                return Err(RoverError::Auth {
                    reason: "credential is not three dot-separated segments".into(),
                })
            }
        };

        let mut mac = HmacSha256::new_from_slice(self.api_key.as_bytes()).map_err(auth_err)?;
        mac.update(format!("{header}.{body}").as_bytes());
        let sig_bytes = URL_SAFE_NO_PAD.decode(sig).map_err(auth_err)?;
        mac.verify_slice(&sig_bytes).map_err(|_| RoverError::Auth {
            reason: "signature mismatch".into(),
        })?;

        let claims: TokenClaims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(body).map_err(auth_err)?)
                .map_err(auth_err)?;
        if claims.exp <= now {
            return Err(RoverError::Auth {
                reason: "credential expired".into(),
            });
        }
        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, RoverError> {
        let mut mac = HmacSha256::new_from_slice(self.api_key.as_bytes()).map_err(auth_err)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn auth_err(e: impl std::fmt::Display) -> RoverError {
    RoverError::Auth { reason: e.to_string() }
}

fn unix_now() -> Result<u64, RoverError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(auth_err)
}
