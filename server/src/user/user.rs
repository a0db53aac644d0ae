use std::collections::HashSet;

use fathom_shared::CharacterInfo;

// UserKey
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct UserKey(u64);

impl UserKey {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

/// Server-granted rights that gate campaign changes.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Permission {
    ManageCampaign,
    ManageRound,
}

/// A connected player.
#[derive(Clone, Debug)]
pub struct User {
    pub name: String,
    /// Platform account, used with the name to match saved character data.
    pub account_id: Option<String>,
    permissions: HashSet<Permission>,
    /// Joined the running round rather than waiting in the lobby.
    pub in_game: bool,
    pub character: Option<CharacterInfo>,
    pub character_alive: bool,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            account_id: None,
            permissions: HashSet::new(),
            in_game: false,
            character: None,
            character_alive: false,
        }
    }

    pub fn with_account(mut self, account_id: &str) -> Self {
        self.account_id = Some(account_id.to_string());
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    pub fn grant(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    pub fn revoke(&mut self, permission: Permission) {
        self.permissions.remove(&permission);
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Puts the user in the round with a living character.
    pub fn spawn(&mut self, character: CharacterInfo) {
        self.in_game = true;
        self.character = Some(character);
        self.character_alive = true;
    }

    pub fn has_living_character(&self) -> bool {
        self.in_game && self.character.is_some() && self.character_alive
    }
}
