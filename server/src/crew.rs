use fathom_shared::{CharacterId, CharacterInfo, CrewState, HireCandidate, Location};
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub info: CharacterInfo,
    pub is_bot: bool,
}

/// Server-side crew: the characters on board and the hires the players have
/// lined up at the current location.
#[derive(Clone, Debug, Default)]
pub struct CrewRoster {
    members: Vec<CrewMember>,
    pending_hires: Vec<CharacterId>,
}

impl CrewRoster {
    pub fn new(members: Vec<CrewMember>) -> Self {
        Self {
            members,
            pending_hires: Vec::new(),
        }
    }

    pub fn members(&self) -> &[CrewMember] {
        &self.members
    }

    pub fn pending_hires(&self) -> &[CharacterId] {
        &self.pending_hires
    }

    /// Removes a bot from the crew. Player characters can't be fired.
    pub fn fire(&mut self, id: CharacterId) -> Option<CharacterInfo> {
        let Some(position) = self
            .members
            .iter()
            .position(|member| member.info.id == id && member.is_bot)
        else {
            warn!("tried to fire an invalid character ({id})");
            return None;
        };
        let member = self.members.remove(position);
        info!("fired {}", member.info.name);
        Some(member.info)
    }

    /// Replaces the pending list, keeping only ids the location offers.
    pub fn set_pending_hires(&mut self, ids: &[CharacterId], location: &Location) {
        self.pending_hires.clear();
        for id in ids {
            if !location.hire_pool.iter().any(|c| c.info.id == *id) {
                warn!("tried to hire a character that doesn't exist ({id})");
                continue;
            }
            if !self.pending_hires.contains(id) {
                self.pending_hires.push(*id);
            }
        }
    }

    /// Hires every pending candidate that `money` still covers, in order,
    /// taking them out of the location's pool. Returns the total salary
    /// paid.
    pub fn validate_hires(&mut self, location: &mut Location, money: i32) -> i32 {
        let mut remaining = money;
        let mut paid = 0;
        for id in std::mem::take(&mut self.pending_hires) {
            let Some(position) = location.hire_pool.iter().position(|c| c.info.id == id) else {
                continue;
            };
            let salary = location.hire_pool[position].salary;
            if salary > remaining {
                warn!("not enough money to hire character {id} ({salary} > {remaining})");
                continue;
            }
            let candidate = location.hire_pool.remove(position);
            remaining -= salary;
            paid += salary;
            info!("hired {} for {salary}", candidate.info.name);
            self.members.push(CrewMember {
                info: candidate.info,
                is_bot: true,
            });
        }
        paid
    }

    /// Drops the pending list, used when the crew leaves a location.
    pub fn clear_pending(&mut self) {
        self.pending_hires.clear();
    }

    pub fn crew_state(
        &self,
        location: Option<&Location>,
        validate_hires: bool,
        fired: Option<CharacterId>,
    ) -> CrewState {
        let available_hires: Vec<HireCandidate> = location
            .map(|location| location.hire_pool.clone())
            .unwrap_or_default();
        CrewState {
            available_hires,
            pending_hires: self.pending_hires.clone(),
            validate_hires,
            fired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(id: CharacterId, name: &str) -> CharacterInfo {
        CharacterInfo {
            id,
            name: name.to_string(),
            job: "assistant".to_string(),
        }
    }

    fn outpost() -> Location {
        Location::new("outpost")
            .with_hire(HireCandidate {
                info: character(10, "Riley"),
                salary: 300,
            })
            .with_hire(HireCandidate {
                info: character(11, "Morgan"),
                salary: 800,
            })
    }

    #[test]
    fn only_bots_can_be_fired() {
        let mut roster = CrewRoster::new(vec![
            CrewMember {
                info: character(1, "captain"),
                is_bot: false,
            },
            CrewMember {
                info: character(2, "bot"),
                is_bot: true,
            },
        ]);
        assert_eq!(roster.fire(1), None);
        assert_eq!(roster.fire(2).map(|info| info.id), Some(2));
        assert_eq!(roster.members().len(), 1);
    }

    #[test]
    fn unknown_pending_ids_are_skipped() {
        let mut roster = CrewRoster::default();
        roster.set_pending_hires(&[10, 99, 11, 10], &outpost());
        assert_eq!(roster.pending_hires(), &[10, 11]);
    }

    #[test]
    fn hires_only_what_money_covers() {
        let mut location = outpost();
        let mut roster = CrewRoster::default();
        roster.set_pending_hires(&[11, 10], &location);

        let paid = roster.validate_hires(&mut location, 1000);

        assert_eq!(paid, 800);
        assert_eq!(roster.members().len(), 1);
        assert_eq!(roster.members()[0].info.id, 11);
        assert_eq!(location.hire_pool.len(), 1);
        assert!(roster.pending_hires().is_empty());
    }
}
