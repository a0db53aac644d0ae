use fathom_client::{ReturnedToLobbyEvent, RoundEndEvent, SaveRequestedEvent};
use fathom_server::{SaveEvent, TransitionEvent};
use fathom_shared::{TransitionKind, TransitionOutcome, TransitionPhase};
use fathom_test::{character, exchange_packets, exchange_packets_n_times, TestSession};

fn session_in_round() -> (TestSession, usize) {
    let mut session = TestSession::new(1000);
    let alex = session.connect("alex");
    let key = session.key(alex);
    session.server.user_mut(&key).unwrap().spawn(character(1));
    exchange_packets(&mut session);
    session.client(alex).load_pending_save();
    session.client(alex).client.take_events();
    (session, alex)
}

#[test]
fn progress_announces_a_new_save() {
    let (mut session, alex) = session_in_round();

    session.client(alex).client.request_start_round();
    exchange_packets(&mut session);

    assert_eq!(session.server.campaign().save_id(), 2);
    assert_eq!(session.server.campaign().state().current_location, Some(1));
    assert_eq!(session.server.campaign().state().selected_location, Some(2));
    assert_eq!(session.server.take_events().read::<SaveEvent>().count(), 1);

    let test_client = session.client(alex);
    let saves: Vec<_> = test_client
        .client
        .take_events()
        .read::<SaveRequestedEvent>()
        .collect();
    assert_eq!(saves, vec![2]);
    assert_eq!(
        test_client.client.mirror().state().unwrap().current_location,
        Some(0)
    );

    test_client.load_pending_save();
    let state = test_client.client.mirror().state().unwrap();
    assert_eq!(state.current_location, Some(1));
    assert_eq!(state.selected_location, Some(2));
    assert!(!state.is_first_round);
}

#[test]
fn loaded_level_completes_the_transition() {
    let (mut session, alex) = session_in_round();
    session.client(alex).client.request_start_round();
    exchange_packets(&mut session);

    while session.server.transition_phase() == TransitionPhase::CameraTransitionOut {
        exchange_packets(&mut session);
    }
    assert_eq!(
        session.server.transition_phase(),
        TransitionPhase::WaitingForNewLevel
    );
    session.server.notify_level_loaded();
    exchange_packets_n_times(&mut session, 8);

    assert_eq!(session.server.transition_phase(), TransitionPhase::Idle);
    let outcomes: Vec<_> = session
        .server
        .take_events()
        .read::<TransitionEvent>()
        .collect();
    assert_eq!(outcomes, vec![TransitionOutcome::Completed]);
}

#[test]
fn client_follows_the_server_through_the_transition() {
    let (mut session, alex) = session_in_round();
    session.client(alex).client.request_start_round();
    exchange_packets(&mut session);

    let mut seen = Vec::new();
    loop {
        let phase = session.server.transition_phase();
        assert_eq!(session.client(alex).client.transition_phase(), phase);
        if seen.last() != Some(&phase) {
            seen.push(phase);
        }
        match phase {
            TransitionPhase::Idle => break,
            TransitionPhase::WaitingForNewLevel => session.server.notify_level_loaded(),
            _ => (),
        }
        exchange_packets(&mut session);
    }
    assert_eq!(
        seen,
        vec![
            TransitionPhase::CameraTransitionOut,
            TransitionPhase::WaitingForNewLevel,
            TransitionPhase::CameraTransitionIn,
            TransitionPhase::Idle,
        ]
    );

    let mut events = session.client(alex).client.take_events();
    assert_eq!(
        events.read::<RoundEndEvent>().collect::<Vec<_>>(),
        vec![TransitionKind::ProgressToNext]
    );
    assert_eq!(
        events.read::<fathom_client::TransitionEvent>().collect::<Vec<_>>(),
        vec![TransitionOutcome::Completed]
    );
    assert!(!events.has::<ReturnedToLobbyEvent>());
}

#[test]
fn level_that_never_loads_falls_back_to_the_lobby() {
    let (mut session, alex) = session_in_round();
    let key = session.key(alex);
    session.client(alex).client.request_start_round();

    exchange_packets_n_times(&mut session, 4);
    assert_eq!(
        session.client(alex).client.transition_phase(),
        TransitionPhase::CameraTransitionOut
    );
    exchange_packets_n_times(&mut session, 10);
    assert_eq!(
        session.client(alex).client.transition_phase(),
        TransitionPhase::WaitingForNewLevel
    );

    // the rest of the level-load timeout
    exchange_packets_n_times(&mut session, 200);

    assert_eq!(session.server.transition_phase(), TransitionPhase::Idle);
    assert_eq!(
        session.client(alex).client.transition_phase(),
        TransitionPhase::Idle
    );
    let mut events = session.client(alex).client.take_events();
    assert!(events.has::<ReturnedToLobbyEvent>());
    assert_eq!(
        events.read::<fathom_client::TransitionEvent>().collect::<Vec<_>>(),
        vec![TransitionOutcome::TimedOut]
    );

    let outcomes: Vec<_> = session
        .server
        .take_events()
        .read::<TransitionEvent>()
        .collect();
    assert_eq!(outcomes, vec![TransitionOutcome::TimedOut]);

    let user = session.server.user(&key).unwrap();
    assert!(!user.in_game);
    assert!(!user.has_living_character());

    // the campaign itself still progressed and can take a new round
    assert_eq!(session.server.campaign().state().current_location, Some(1));
    assert!(session.server.request_transition(
        &key,
        TransitionKind::ReturnToPrevious
    ));
}

#[test]
fn second_round_end_is_refused_while_one_runs() {
    let (mut session, alex) = session_in_round();
    let key = session.key(alex);

    session.client(alex).client.request_start_round();
    exchange_packets(&mut session);
    assert!(!session.server.request_transition(
        &key,
        TransitionKind::ReturnToPrevious
    ));
}
