//! Tests for the standard handler set assembled by [`gatebot_handlers::standard_dispatcher`].

mod common;

use std::sync::{Arc, Once};

use common::{private_message, Membership, MockClient};
use gatebot_core::{ChannelRef, ChatKind, MembershipStatus};
use gatebot_handlers::{standard_dispatcher, Channels, Texts, LOG_GROUP, REPLY_GROUP};
use handler_groups::GroupOutcome;
use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

const LOG_CHANNEL: i64 = -1001111111111;
const AUTH_CHANNEL: i64 = -1002222222222;

fn channels(auth: bool) -> Channels {
    Channels {
        log_channel: ChannelRef::Chat(LOG_CHANNEL),
        auth_channel: if auth {
            ChannelRef::Chat(AUTH_CHANNEL)
        } else {
            ChannelRef::Unset
        },
        auth_channel_link: Some("https://t.me/gate_channel".to_string()),
    }
}

/// **Test: "/start", "hello" and a photo from a subscribed user.**
///
/// **Expected:** greeting and echo sent; all three messages forwarded to the log channel.
#[tokio::test]
async fn test_start_reply_and_photo_flow() {
    init_tracing();
    let client = Arc::new(MockClient::member(MembershipStatus::Member));
    let dispatcher = standard_dispatcher("main", client.clone(), &channels(true), &Texts::default());

    let start = dispatcher.dispatch(&private_message(7, Some("/start"))).await;
    let hello = dispatcher.dispatch(&private_message(7, Some("hello"))).await;
    let photo = dispatcher.dispatch(&private_message(7, None)).await;

    assert_eq!(start[0], (REPLY_GROUP, GroupOutcome::Handled { route: 0 }));
    assert_eq!(hello[0], (REPLY_GROUP, GroupOutcome::Handled { route: 1 }));
    assert_eq!(photo[0], (REPLY_GROUP, GroupOutcome::NoMatch));
    for report in [&start, &hello, &photo] {
        assert_eq!(report[1], (LOG_GROUP, GroupOutcome::Handled { route: 0 }));
    }

    let sent = client.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, "Bot is alive, Ann!\n\nComing soon...");
    assert_eq!(sent[1].text, "hello");
    assert!(sent.iter().all(|s| s.chat_id == 7));

    assert_eq!(client.forwarded(), vec![(42, LOG_CHANNEL); 3]);
    assert_eq!(client.lookups(), 2);
}

/// **Test: a blocked user only gets the gate prompt, but is still logged.**
#[tokio::test]
async fn test_blocked_user_gets_prompt_only() {
    init_tracing();
    let client = Arc::new(MockClient::member(MembershipStatus::Left));
    let dispatcher = standard_dispatcher("main", client.clone(), &channels(true), &Texts::default());

    dispatcher.dispatch(&private_message(7, Some("/start"))).await;
    dispatcher.dispatch(&private_message(7, Some("hello"))).await;

    let sent = client.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|s| s.text == Texts::default().gate_prompt));
    assert_eq!(client.forwarded().len(), 2);
}

/// **Test: the log action never consults the gate.**
#[tokio::test]
async fn test_log_action_is_not_gated() {
    let client = Arc::new(MockClient::member(MembershipStatus::Left));
    let dispatcher = standard_dispatcher("main", client.clone(), &channels(true), &Texts::default());

    let mut group_msg = private_message(7, Some("hi everyone"));
    group_msg.chat_kind = ChatKind::Group;
    group_msg.chat_id = -500;
    dispatcher.dispatch(&group_msg).await;

    assert_eq!(client.lookups(), 0);
    assert_eq!(client.forwarded(), vec![(42, LOG_CHANNEL)]);
}

/// **Test: lookup failure fails open and the reply is still sent.**
#[tokio::test]
async fn test_lookup_failure_replies() {
    let client = Arc::new(MockClient::new(Membership::Error("timeout".into())));
    let dispatcher = standard_dispatcher("main", client.clone(), &channels(true), &Texts::default());

    dispatcher.dispatch(&private_message(7, Some("hello"))).await;
    assert_eq!(client.sent().len(), 1);
    assert_eq!(client.sent()[0].text, "hello");
}

/// **Test: forward and send failures are reported per group and do not affect each other.**
#[tokio::test]
async fn test_send_and_forward_failures_are_reported() {
    init_tracing();
    let client = Arc::new(
        MockClient::member(MembershipStatus::Member)
            .failing_send()
            .failing_forward(),
    );
    let dispatcher = standard_dispatcher("main", client.clone(), &channels(false), &Texts::default());

    let report = dispatcher.dispatch(&private_message(7, Some("hello"))).await;
    assert!(matches!(report[0], (REPLY_GROUP, GroupOutcome::Failed { route: 1, .. })));
    assert!(matches!(report[1], (LOG_GROUP, GroupOutcome::Failed { route: 0, .. })));
}

/// **Test: unset log channel skips forwarding without error.**
#[tokio::test]
async fn test_unset_log_channel_skips_forward() {
    let client = Arc::new(MockClient::member(MembershipStatus::Member));
    let channels = Channels::default();
    let dispatcher = standard_dispatcher("main", client.clone(), &channels, &Texts::default());

    let report = dispatcher.dispatch(&private_message(7, None)).await;
    assert_eq!(report[1], (LOG_GROUP, GroupOutcome::Handled { route: 0 }));
    assert!(client.forwarded().is_empty());
}
