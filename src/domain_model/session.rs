use crate::domain_model::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unambiguous alphabet used for rendering short identifiers.
const ALPHABET: &[u8; 57] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
/// Characters needed to hold a full 128-bit value in base 57.
const SHORT_ID_LEN: usize = 22;

/// Opaque per-session handle held by the client.
///
/// The identifier is an indirection: it names a slot in the session store
/// and stays the same while the signed token behind it is rotated.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(pub String);

impl ShortId {
    /// Derives the default slot for a user, so logins without an explicit
    /// identifier always land on the same one.
    pub fn derive(user_id: &UserId) -> Self {
        let uuid = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_DNS, user_id.as_str().as_bytes());
        ShortId(encode_base57(uuid.as_u128()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShortId {
    fn from(s: &str) -> Self {
        ShortId(s.to_owned())
    }
}

fn encode_base57(mut value: u128) -> String {
    let base = ALPHABET.len() as u128;
    let mut out = Vec::with_capacity(SHORT_ID_LEN);
    while value > 0 {
        out.push(ALPHABET[(value % base) as usize]);
        value /= base;
    }
    out.resize(SHORT_ID_LEN, ALPHABET[0]);
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Signed claim set as produced by the token codec.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedToken(pub String);

impl SignedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep token material out of logs.
impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedToken(..{} bytes)", self.0.len())
    }
}

/// Value stored in the session store for one (user, short id) slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: SignedToken,
    #[serde(rename = "expire")]
    pub ttl_minutes: u32,
}
