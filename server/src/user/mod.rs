mod authority;
#[allow(clippy::module_inception)]
mod user;

pub use authority::Authority;
pub use user::{Permission, User, UserKey};
