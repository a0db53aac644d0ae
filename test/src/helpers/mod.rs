pub mod fixtures;
pub mod packet_exchange;
pub mod test_session;

pub use fixtures::{character, hire_candidate, test_map, test_registry, STEELBAR_PRICE};
pub use packet_exchange::{exchange_packets, exchange_packets_n_times};
pub use test_session::{TestClient, TestSession, TICK};
