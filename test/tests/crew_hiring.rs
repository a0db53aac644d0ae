use fathom_client::CrewStateEvent;
use fathom_shared::CrewRequest;
use fathom_test::{exchange_packets, TestSession};

#[test]
fn hiring_pays_salary_and_updates_every_client() {
    let mut session = TestSession::new(1000);
    let alex = session.connect("alex");
    let blake = session.connect("blake");
    exchange_packets(&mut session);

    session.client(alex).client.request_crew_change(&CrewRequest {
        pending_hires: Some(vec![100]),
        validate_hires: false,
        fired: None,
    });
    exchange_packets(&mut session);
    session.client(blake).client.take_events();

    session.client(alex).client.request_crew_change(&CrewRequest {
        pending_hires: None,
        validate_hires: true,
        fired: None,
    });
    exchange_packets(&mut session);

    assert_eq!(session.server.campaign().state().money, 700);
    assert_eq!(session.server.roster().members().len(), 1);

    let test_client = session.client(blake);
    let crew_states: Vec<_> = test_client
        .client
        .take_events()
        .read::<CrewStateEvent>()
        .collect();
    assert_eq!(crew_states.len(), 1);
    assert!(crew_states[0].validate_hires);
    let offered: Vec<_> = crew_states[0]
        .available_hires
        .iter()
        .map(|candidate| candidate.info.id)
        .collect();
    assert_eq!(offered, vec![101]);
    assert_eq!(test_client.client.mirror().state().unwrap().money, 700);
}

#[test]
fn unaffordable_hire_stays_pending_in_the_pool() {
    let mut session = TestSession::new(500);
    let alex = session.connect("alex");
    exchange_packets(&mut session);

    session.client(alex).client.request_crew_change(&CrewRequest {
        pending_hires: Some(vec![101]),
        validate_hires: false,
        fired: None,
    });
    exchange_packets(&mut session);
    session.client(alex).client.request_crew_change(&CrewRequest {
        pending_hires: None,
        validate_hires: true,
        fired: None,
    });
    exchange_packets(&mut session);

    assert_eq!(session.server.campaign().state().money, 500);
    assert!(session.server.roster().members().is_empty());
    let crew_state = session.client(alex).client.crew_state().unwrap();
    assert_eq!(crew_state.available_hires.len(), 2);
}
