//! Auth types.
//!
//! Token issuance lives in the (external) auth service; this backend only
//! verifies bearer tokens, so the claims shape is all it needs.

use serde::{Deserialize, Serialize};

use crate::JwtSubject;

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: JwtSubject, // user_id
    pub exp: u64,        // expiration timestamp
    pub iat: u64,        // issued at
}
