use std::collections::BTreeMap;

use crate::user::{Permission, User, UserKey};

/// Answers who may change the campaign. A campaign with nobody in charge is
/// open to everyone, so a session can never lock itself out.
pub struct Authority<'u> {
    users: &'u BTreeMap<UserKey, User>,
    owner: Option<UserKey>,
}

impl<'u> Authority<'u> {
    pub fn new(users: &'u BTreeMap<UserKey, User>, owner: Option<UserKey>) -> Self {
        Self { users, owner }
    }

    fn is_owner(&self, key: &UserKey) -> bool {
        self.owner == Some(*key)
    }

    /// True if the actor holds one of `permissions`, owns the session, is
    /// the only connected user, or if no in-game user holds any of them or
    /// owns the session.
    fn allowed_with(&self, actor: &UserKey, permissions: &[Permission]) -> bool {
        let Some(user) = self.users.get(actor) else {
            return false;
        };

        let holds = |user: &User| permissions.iter().any(|p| user.has_permission(*p));

        holds(user)
            || self.users.len() == 1
            || self.is_owner(actor)
            || !self
                .users
                .iter()
                .any(|(key, other)| other.in_game && (self.is_owner(key) || holds(other)))
    }

    pub fn allowed_to_manage_campaign(&self, actor: &UserKey) -> bool {
        self.allowed_with(actor, &[Permission::ManageCampaign])
    }

    pub fn allowed_to_end_round(&self, actor: &UserKey) -> bool {
        self.allowed_with(actor, &[Permission::ManageRound, Permission::ManageCampaign])
    }
}
