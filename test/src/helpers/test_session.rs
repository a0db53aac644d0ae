use std::time::Duration;

use fathom_client::{CampaignClient, ClientConfig};
use fathom_server::{
    transport::{PacketChannel, PacketReceiver},
    CampaignServer, CampaignSetup, MemorySaveStore, ServerConfig, User, UserKey,
};

use super::fixtures::{test_map, test_registry};

pub const TICK: Duration = Duration::from_millis(250);

/// A player: the server's key for them, their client, and the pipe the
/// server writes to them through.
pub struct TestClient {
    pub key: UserKey,
    pub client: CampaignClient,
    pub(crate) receiver: Box<dyn PacketReceiver>,
}

impl TestClient {
    /// Pretends the save the server last announced has been fetched and
    /// loaded.
    pub fn load_pending_save(&mut self) {
        let save_id = self.client.mirror().pending_save_id();
        self.client.on_save_loaded(save_id);
    }
}

/// A started campaign server plus any number of in-process clients.
pub struct TestSession {
    pub server: CampaignServer,
    pub clients: Vec<TestClient>,
}

impl TestSession {
    pub fn new(starting_money: i32) -> Self {
        Self::with_config(ServerConfig::default(), starting_money)
    }

    pub fn with_config(config: ServerConfig, starting_money: i32) -> Self {
        env_logger::builder().is_test(true).try_init().ok();

        let mut server = CampaignServer::new(
            config,
            Box::new(test_registry()),
            Box::new(MemorySaveStore::new()),
            CampaignSetup {
                campaign_id: 7,
                save_name: "integration".to_string(),
                map: test_map(),
                starting_money,
                crew: Vec::new(),
            },
        );
        server.seed_rng(11);
        if let Err(error) = server.start() {
            panic!("campaign did not start: {error}");
        }
        Self {
            server,
            clients: Vec::new(),
        }
    }

    /// Connects a player and returns their index in `clients`.
    pub fn connect(&mut self, name: &str) -> usize {
        self.connect_user(User::new(name))
    }

    pub fn connect_user(&mut self, user: User) -> usize {
        let (sender, receiver) = PacketChannel::unbounded();
        let key = self.server.connect_user(user, sender);
        self.clients.push(TestClient {
            key,
            client: CampaignClient::new(ClientConfig::default(), Box::new(test_registry())),
            receiver,
        });
        self.clients.len() - 1
    }

    pub fn client(&mut self, index: usize) -> &mut TestClient {
        &mut self.clients[index]
    }

    pub fn key(&self, index: usize) -> UserKey {
        self.clients[index].key
    }
}
