//! Identity lifecycle events and the handlers subscribed to them.
//!
//! Every identity write emits an [`IdentityEvent`]. The engine dispatches it
//! to its registered [`IdentityHook`]s inside the same database transaction
//! as the identity write, so a failing hook rolls the identity write back.

/// Something that happened to an identity record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityEvent {
    /// The identity row was inserted (`created`) or updated.
    Saved { user_id: i64, created: bool },
    /// The identity row is about to be deleted.
    Deleting { user_id: i64 },
}

/// Handlers that keep the profile table in step with identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityHook {
    /// Insert an empty profile when an identity is created.
    CreateProfile,
    /// Re-persist the linked profile on every identity save.
    ResaveProfile,
    /// Remove the linked profile before its identity goes away.
    DeleteProfile,
}

impl IdentityHook {
    /// Hooks installed when the builder is not told otherwise.
    pub fn defaults() -> Vec<IdentityHook> {
        vec![Self::CreateProfile, Self::ResaveProfile, Self::DeleteProfile]
    }

    pub fn handles(self, event: IdentityEvent) -> bool {
        match (self, event) {
            (Self::CreateProfile, IdentityEvent::Saved { created, .. }) => created,
            (Self::ResaveProfile, IdentityEvent::Saved { .. }) => true,
            (Self::DeleteProfile, IdentityEvent::Deleting { .. }) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_profile_only_reacts_to_creation() {
        let created = IdentityEvent::Saved {
            user_id: 1,
            created: true,
        };
        let updated = IdentityEvent::Saved {
            user_id: 1,
            created: false,
        };
        assert!(IdentityHook::CreateProfile.handles(created));
        assert!(!IdentityHook::CreateProfile.handles(updated));
        assert!(IdentityHook::ResaveProfile.handles(created));
        assert!(IdentityHook::ResaveProfile.handles(updated));
    }

    #[test]
    fn delete_profile_only_reacts_to_deletion() {
        let deleting = IdentityEvent::Deleting { user_id: 1 };
        assert!(IdentityHook::DeleteProfile.handles(deleting));
        assert!(!IdentityHook::ResaveProfile.handles(deleting));
    }
}
