use std::default::Default;

use fathom_shared::TransitionConfig;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    /// Camera durations and the level-load timeout of the client's own
    /// round transitions
    pub transition: TransitionConfig,
}
