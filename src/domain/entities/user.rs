use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (type, value) attribute attached to an identity and carried inside an
/// issued credential. Order is significant: identities keep their claims in
/// store order and the issuer appends to that sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Registered claim types synthesized by the token issuer.
pub mod claim_types {
    pub const SUB: &str = "sub";
    pub const EMAIL: &str = "email";
    pub const UNIQUE_NAME: &str = "unique_name";
    pub const ROLE: &str = "role";
}

/// A registered user as the credential store hands it out. The password hash
/// never leaves the store, so it is not part of this view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub email_confirmed: bool,
    pub created_at: Option<NaiveDateTime>,
}
