use log::debug;

use crate::{
    types::{SaveId, UpdateId},
    wrapping_number::id_more_recent,
};

/// Save id that means "nothing saved yet".
pub const NO_SAVE: SaveId = 0;

/// Mirror-side bookkeeping that keeps the live update counter apart from the
/// save generation. Location, store and mission data is only meaningful
/// relative to the save it was produced from, so a mirror holds those fields
/// back until the matching save is loaded locally.
#[derive(Clone, Debug)]
pub struct SaveTracker {
    pending_save_id: SaveId,
    loaded_save_id: Option<SaveId>,
    requested_save_id: Option<SaveId>,
    last_update_id: Option<UpdateId>,
}

impl Default for SaveTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveTracker {
    pub fn new() -> Self {
        Self {
            pending_save_id: 1,
            loaded_save_id: None,
            requested_save_id: None,
            last_update_id: None,
        }
    }

    /// Newest save generation the server has announced. Never 0.
    pub fn pending_save_id(&self) -> SaveId {
        self.pending_save_id
    }

    pub fn loaded_save_id(&self) -> Option<SaveId> {
        self.loaded_save_id
    }

    pub fn last_update_id(&self) -> Option<UpdateId> {
        self.last_update_id
    }

    /// Records a save id seen on the wire. Returns true when the caller
    /// should fetch that save, which happens once per generation.
    pub fn observe_save_id(&mut self, save_id: SaveId) -> bool {
        if save_id == NO_SAVE {
            return false;
        }
        if id_more_recent(save_id, self.pending_save_id) {
            debug!("server save moved to {save_id}");
            self.pending_save_id = save_id;
        }
        let wanted = self.pending_save_id;
        if self.loaded_save_id == Some(wanted) || self.requested_save_id == Some(wanted) {
            return false;
        }
        self.requested_save_id = Some(wanted);
        true
    }

    /// Accepts `update_id` if it is newer than the last accepted one. The
    /// first update after construction is always accepted.
    pub fn accept_update(&mut self, update_id: UpdateId) -> bool {
        let accept = match self.last_update_id {
            None => true,
            Some(last) => id_more_recent(update_id, last),
        };
        if accept {
            self.last_update_id = Some(update_id);
        }
        accept
    }

    /// Whether fields produced against `save_id` can be trusted locally.
    pub fn save_matches(&self, save_id: SaveId) -> bool {
        self.loaded_save_id == Some(save_id)
    }

    pub fn on_save_loaded(&mut self, save_id: SaveId) {
        self.loaded_save_id = Some(save_id);
        if id_more_recent(save_id, self.pending_save_id) {
            self.pending_save_id = save_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_save_is_requested_once() {
        let mut tracker = SaveTracker::new();
        assert!(tracker.observe_save_id(1));
        assert!(!tracker.observe_save_id(1));
        assert_eq!(tracker.pending_save_id(), 1);
    }

    #[test]
    fn newer_save_is_requested_and_older_ignored() {
        let mut tracker = SaveTracker::new();
        tracker.on_save_loaded(3);
        assert!(!tracker.observe_save_id(3));
        assert!(!tracker.observe_save_id(2));
        assert!(tracker.observe_save_id(4));
        assert_eq!(tracker.pending_save_id(), 4);
        assert!(!tracker.save_matches(4));
        tracker.on_save_loaded(4);
        assert!(tracker.save_matches(4));
    }

    #[test]
    fn zero_save_id_is_never_requested() {
        let mut tracker = SaveTracker::new();
        assert!(!tracker.observe_save_id(NO_SAVE));
        assert_ne!(tracker.pending_save_id(), NO_SAVE);
    }

    #[test]
    fn stale_updates_are_refused() {
        let mut tracker = SaveTracker::new();
        assert!(tracker.accept_update(65535));
        assert!(tracker.accept_update(2));
        assert!(!tracker.accept_update(2));
        assert!(!tracker.accept_update(65534));
        assert_eq!(tracker.last_update_id(), Some(2));
    }
}
