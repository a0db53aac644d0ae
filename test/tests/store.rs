use fathom_server::CampaignChangedEvent;
use fathom_shared::{PurchasedItem, MAX_ITEM_QUANTITY};
use fathom_test::{exchange_packets, TestSession, STEELBAR_PRICE};
use proptest::prelude::*;

fn synced_session(money: i32) -> (TestSession, usize) {
    let mut session = TestSession::new(money);
    let alex = session.connect("alex");
    exchange_packets(&mut session);
    session.client(alex).load_pending_save();
    (session, alex)
}

#[test]
fn unaffordable_hull_repair_is_ignored() {
    let (mut session, alex) = synced_session(100);

    session
        .client(alex)
        .client
        .request_campaign_change(|request| request.repairs.hull = true)
        .unwrap();
    exchange_packets(&mut session);

    let state = session.server.campaign().state();
    assert_eq!(state.money, 100);
    assert!(!state.repairs.hull);
    assert_eq!(session.server.campaign().update_id(), 1);
    assert!(!session.server.take_events().has::<CampaignChangedEvent>());
}

#[test]
fn hull_repair_is_refunded_when_cancelled() {
    let (mut session, alex) = synced_session(1000);

    session
        .client(alex)
        .client
        .request_campaign_change(|request| request.repairs.hull = true)
        .unwrap();
    exchange_packets(&mut session);
    assert_eq!(session.server.campaign().state().money, 500);
    assert!(session.client(alex).client.mirror().state().unwrap().repairs.hull);

    session
        .client(alex)
        .client
        .request_campaign_change(|request| request.repairs.hull = false)
        .unwrap();
    exchange_packets(&mut session);

    assert_eq!(session.server.campaign().state().money, 1000);
    assert_eq!(session.server.campaign().update_id(), 3);
    assert_eq!(session.client(alex).client.mirror().state().unwrap().money, 1000);
}

#[test]
fn unaffordable_line_is_left_out() {
    let (mut session, alex) = synced_session(100);

    session
        .client(alex)
        .client
        .request_campaign_change(|request| {
            request.purchased_items = vec![
                PurchasedItem::new("steelbar", 5),
                PurchasedItem::new("oxygentank", 2),
            ];
        })
        .unwrap();
    exchange_packets(&mut session);

    let state = session.server.campaign().state();
    assert_eq!(state.money, 50);
    assert_eq!(state.purchased_quantity("steelbar"), 0);
    assert_eq!(state.purchased_quantity("oxygentank"), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn money_never_goes_negative(money in 0i32..2000, quantity in 1u8..=MAX_ITEM_QUANTITY) {
        let (mut session, alex) = synced_session(money);
        session
            .client(alex)
            .client
            .request_campaign_change(|request| {
                request.purchased_items = vec![PurchasedItem::new("steelbar", quantity)];
            })
            .unwrap();
        exchange_packets(&mut session);

        let state = session.server.campaign().state();
        let bought = state.purchased_quantity("steelbar") as i32;
        prop_assert!(state.money >= 0);
        prop_assert_eq!(state.money + bought * STEELBAR_PRICE, money);
        prop_assert!(bought == 0 || bought == i32::from(quantity));
    }
}
