use fathom_client::{CampaignChangedEvent, SaveRequestedEvent};
use fathom_server::CampaignChangedEvent as ServerChangedEvent;
use fathom_shared::PurchasedItem;
use fathom_test::{exchange_packets, TestSession, STEELBAR_PRICE};

#[test]
fn purchase_reaches_every_client() {
    let mut session = TestSession::new(1000);
    let alex = session.connect("alex");
    let blake = session.connect("blake");

    exchange_packets(&mut session);
    session.client(alex).load_pending_save();
    session.client(blake).load_pending_save();
    assert_eq!(session.server.campaign().update_id(), 1);

    session
        .client(alex)
        .client
        .request_campaign_change(|request| {
            request.purchased_items = vec![PurchasedItem::new("steelbar", 5)];
        })
        .unwrap();
    exchange_packets(&mut session);

    let state = session.server.campaign().state();
    assert_eq!(state.money, 1000 - 5 * STEELBAR_PRICE);
    assert_eq!(state.purchased_quantity("steelbar"), 5);
    assert_eq!(session.server.campaign().update_id(), 2);

    let changes: Vec<_> = session
        .server
        .take_events()
        .read::<ServerChangedEvent>()
        .collect();
    assert_eq!(changes, vec![(session.key(alex), 2)]);

    let mirror = session.client(blake).client.mirror();
    assert!(mirror.is_synchronized());
    assert_eq!(mirror.campaign().unwrap().update_id(), 2);
    assert_eq!(mirror.state().unwrap().money, 800);
    assert_eq!(
        mirror.state().unwrap().purchased_items,
        vec![PurchasedItem::new("steelbar", 5)]
    );
}

#[test]
fn late_joiner_waits_for_the_save() {
    let mut session = TestSession::new(1000);
    let alex = session.connect("alex");
    exchange_packets(&mut session);
    session.client(alex).load_pending_save();
    session
        .client(alex)
        .client
        .request_campaign_change(|request| {
            request.purchased_items = vec![PurchasedItem::new("steelbar", 2)];
        })
        .unwrap();
    exchange_packets(&mut session);

    let blake = session.connect("blake");
    exchange_packets(&mut session);

    let test_client = session.client(blake);
    let mut events = test_client.client.take_events();
    assert!(events.has::<CampaignChangedEvent>());
    assert_eq!(events.read::<SaveRequestedEvent>().collect::<Vec<_>>(), vec![1]);

    // money is always safe to show, cargo has to wait for the save
    let state = test_client.client.mirror().state().unwrap();
    assert_eq!(state.money, 920);
    assert!(state.purchased_items.is_empty());
    assert!(test_client.client.request_campaign_change(|_| ()).is_err());

    test_client.load_pending_save();
    let state = test_client.client.mirror().state().unwrap();
    assert_eq!(state.purchased_quantity("steelbar"), 2);
    assert_eq!(state.current_location, Some(0));
    assert!(test_client.client.request_campaign_change(|_| ()).is_ok());
}

#[test]
fn repeated_request_does_not_bump_the_update() {
    let mut session = TestSession::new(1000);
    let alex = session.connect("alex");
    exchange_packets(&mut session);
    session.client(alex).load_pending_save();

    // a request that restates the mirror changes nothing
    session
        .client(alex)
        .client
        .request_campaign_change(|_| ())
        .unwrap();
    exchange_packets(&mut session);

    assert_eq!(session.server.campaign().update_id(), 1);
    assert!(!session.server.take_events().has::<ServerChangedEvent>());
}
