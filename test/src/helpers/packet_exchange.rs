use super::test_session::{TestSession, TICK};

/// One round trip: queued client requests reach the server, the server
/// ticks, and whatever it sent is handed to each client.
pub fn exchange_packets(session: &mut TestSession) {
    let TestSession { server, clients } = session;

    for test_client in clients.iter_mut() {
        for packet in test_client.client.take_outgoing() {
            if let Err(error) = server.receive(&test_client.key, &packet) {
                panic!("server refused a packet: {error}");
            }
        }
    }

    server.tick(TICK);

    for test_client in clients.iter_mut() {
        loop {
            match test_client.receiver.receive() {
                Ok(Some(payload)) => test_client.client.receive(payload),
                Ok(None) => break,
                Err(error) => panic!("client pipe closed: {error}"),
            }
        }
        test_client.client.tick(TICK);
    }
}

pub fn exchange_packets_n_times(session: &mut TestSession, n: usize) {
    for _ in 0..n {
        exchange_packets(session);
    }
}
