//! Authorization context supplied by the auth collaborator.
//!
//! The core never derives identity or role: presentation code resolves the
//! session and hands an [`AuthContext`] into every mutating operation. The
//! guards here are checked before any write is issued.

use serde::{Deserialize, Serialize};

use super::entity_ids::ProfileId;
use super::errors::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    pub profile_id: ProfileId,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn new(profile_id: ProfileId, is_admin: bool) -> Self {
        Self {
            profile_id,
            is_admin,
        }
    }

    /// Require the admin role for a moderation or curation operation.
    pub fn require_admin(&self, action: &str) -> CoreResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(format!(
                "{action} requires administrator access"
            )))
        }
    }

    /// Require that the principal owns the record, or is an admin.
    pub fn require_owner(&self, owner: ProfileId, action: &str) -> CoreResult<()> {
        if self.is_admin || self.profile_id == owner {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(format!(
                "{action} is restricted to the listing owner"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_guard() {
        let admin = AuthContext::new(ProfileId::random(), true);
        let resident = AuthContext::new(ProfileId::random(), false);
        assert!(admin.require_admin("approve listing").is_ok());
        let err = resident.require_admin("approve listing").unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
    }

    #[test]
    fn owner_guard_accepts_owner_and_admin() {
        let owner = ProfileId::random();
        let owner_ctx = AuthContext::new(owner, false);
        let admin_ctx = AuthContext::new(ProfileId::random(), true);
        let stranger = AuthContext::new(ProfileId::random(), false);

        assert!(owner_ctx.require_owner(owner, "edit listing").is_ok());
        assert!(admin_ctx.require_owner(owner, "edit listing").is_ok());
        assert!(stranger.require_owner(owner, "edit listing").is_err());
    }
}
