use fathom_server::{Permission, Rejection, RejectionEvent};
use fathom_shared::{PacketKind, PurchasedItem};
use fathom_test::{exchange_packets, TestSession};

fn two_players() -> (TestSession, usize, usize) {
    let mut session = TestSession::new(1000);
    let owner = session.connect("owner");
    let guest = session.connect("guest");
    exchange_packets(&mut session);
    session.client(owner).load_pending_save();
    session.client(guest).load_pending_save();
    (session, owner, guest)
}

fn set_in_game(session: &mut TestSession, index: usize, in_game: bool) {
    let key = session.key(index);
    session.server.user_mut(&key).unwrap().in_game = in_game;
}

#[test]
fn first_player_owns_the_campaign() {
    let (mut session, owner, guest) = two_players();
    set_in_game(&mut session, owner, true);
    set_in_game(&mut session, guest, true);

    assert_eq!(session.server.owner(), Some(session.key(owner)));
    assert!(session.server.allowed_to_manage_campaign(&session.key(owner)));
    assert!(!session.server.allowed_to_manage_campaign(&session.key(guest)));

    session
        .client(guest)
        .client
        .request_campaign_change(|request| {
            request.purchased_items = vec![PurchasedItem::new("steelbar", 1)];
        })
        .unwrap();
    exchange_packets(&mut session);

    assert_eq!(session.server.campaign().state().money, 1000);
    let rejections: Vec<_> = session
        .server
        .take_events()
        .read::<RejectionEvent>()
        .collect();
    assert_eq!(
        rejections,
        vec![(
            session.key(guest),
            Rejection::NotAuthorized(PacketKind::CampaignRequest)
        )]
    );
}

#[test]
fn nobody_in_charge_opens_the_campaign_up() {
    let (mut session, owner, guest) = two_players();
    set_in_game(&mut session, owner, true);
    set_in_game(&mut session, guest, true);
    let owner_key = session.key(owner);
    let guest_key = session.key(guest);

    session.server.set_owner(None);
    assert!(session.server.allowed_to_manage_campaign(&guest_key));

    // a permission holder in the round takes charge
    session
        .server
        .user_mut(&owner_key)
        .unwrap()
        .grant(Permission::ManageCampaign);
    assert!(!session.server.allowed_to_manage_campaign(&guest_key));

    // ...but not while waiting in the lobby
    set_in_game(&mut session, owner, false);
    assert!(session.server.allowed_to_manage_campaign(&guest_key));

    session
        .client(guest)
        .client
        .request_campaign_change(|request| {
            request.purchased_items = vec![PurchasedItem::new("steelbar", 1)];
        })
        .unwrap();
    exchange_packets(&mut session);
    assert_eq!(session.server.campaign().state().money, 960);
}

#[test]
fn round_permission_lets_a_guest_end_the_round() {
    let (mut session, owner, guest) = two_players();
    set_in_game(&mut session, owner, true);
    let guest_key = session.key(guest);
    assert!(!session.server.allowed_to_end_round(&guest_key));

    session
        .server
        .user_mut(&guest_key)
        .unwrap()
        .grant(Permission::ManageRound);
    assert!(session.server.allowed_to_end_round(&guest_key));
    assert!(!session.server.allowed_to_manage_campaign(&guest_key));
}

#[test]
fn owner_leaving_hands_the_campaign_to_the_rest() {
    let (mut session, owner, guest) = two_players();
    set_in_game(&mut session, owner, true);
    set_in_game(&mut session, guest, true);
    let owner_key = session.key(owner);
    let guest_key = session.key(guest);

    session.server.disconnect_user(&owner_key).unwrap();
    assert_eq!(session.server.owner(), None);
    assert!(session.server.allowed_to_manage_campaign(&guest_key));
}
