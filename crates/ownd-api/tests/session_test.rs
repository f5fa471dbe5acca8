#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use ownd_api::{
    Authentication, CommandSession, Error, EventSession, NegotiationOutcome, RetryPolicy,
    SendOutcome, SessionState, test_gateway_with,
};
use ownd_core::command::lighting;
use ownd_core::model::Payload;
use pretty_assertions::assert_eq;
use tokio::time::Instant;
use tokio_test::io::{Builder, Mock};

use common::{Scripted, endpoint, refused, reset};

const ACK: &[u8] = b"*#*1##";
const NACK: &[u8] = b"*#*0##";

fn open_event() -> Builder {
    let mut builder = Builder::new();
    builder.write(b"*99*1##").read(ACK).read(ACK);
    builder
}

fn open_command() -> Builder {
    let mut builder = Builder::new();
    builder.write(b"*99*0##").read(ACK).read(ACK);
    builder
}

fn secs_between(elapsed: Duration, low: u64, high: u64) -> bool {
    elapsed >= Duration::from_secs(low) && elapsed < Duration::from_secs(high)
}

// ── Reconnect budget ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn refused_connections_exhaust_after_five_attempts() {
    let connector: Scripted<Mock> = Scripted::new(Vec::new());
    let mut events = EventSession::with_connector(endpoint(), &connector);

    let started = Instant::now();
    let err = events.connect().await.unwrap_err();

    assert!(matches!(err, Error::RetriesExhausted { attempts: 5 }));
    assert_eq!(connector.attempts(), 5);
    // 1 + 2 + 4 + 6, nothing after the last failure.
    assert!(secs_between(started.elapsed(), 13, 14));
    assert_eq!(events.session().state(), SessionState::Failed);
}

#[tokio::test(start_paused = true)]
async fn resets_wait_a_minute_and_do_not_count() {
    let connector = Scripted::new(vec![
        refused(),
        refused(),
        refused(),
        refused(),
        reset(),
        reset(),
        Ok(open_event().build()),
    ]);
    let mut events = EventSession::with_connector(endpoint(), &connector);

    let started = Instant::now();
    let outcome = events.connect().await.unwrap();

    assert_eq!(outcome, NegotiationOutcome::Ready(Authentication::Open));
    assert_eq!(connector.attempts(), 7);
    // 1 + 2 + 4 + 6 for the refusals, 60 per reset.
    assert!(secs_between(started.elapsed(), 133, 134));
    events.close().await;
}

#[tokio::test(start_paused = true)]
async fn time_unit_scales_the_schedule() {
    let connector: Scripted<Mock> = Scripted::new(Vec::new());
    let policy = RetryPolicy::default().with_time_unit(Duration::from_millis(10));
    let mut events = EventSession::with_connector(endpoint(), &connector).with_policy(policy);

    let started = Instant::now();
    assert!(events.connect().await.is_err());
    assert_eq!(started.elapsed(), Duration::from_millis(130));
}

// ── Event stream ────────────────────────────────────────────────────

#[tokio::test]
async fn event_stream_skips_noise_and_reconnects() {
    let first = open_event()
        .read(b"*1*1*12##")
        .read(ACK)
        .read(b"*9999##")
        .build();
    let second = open_event().read(b"*2*1*41##").build();
    let connector = Scripted::new(vec![Ok(first), Ok(second)]);
    let mut events = EventSession::with_connector(endpoint(), &connector);
    events.connect().await.unwrap();

    let light = events.get_next().await.unwrap().unwrap();
    assert_eq!(light.summary(), "Light 12 is switched on.");
    assert!(matches!(light.payload(), Payload::Lighting(l) if l.is_on()));

    // Signaling frame, then an unclassifiable one.
    assert!(events.get_next().await.unwrap().is_none());
    assert!(events.get_next().await.unwrap().is_none());

    // End of stream: reconnects and yields nothing for this call.
    assert!(events.get_next().await.unwrap().is_none());
    assert_eq!(connector.attempts(), 2);

    let cover = events.get_next().await.unwrap().unwrap();
    assert!(matches!(cover.payload(), Payload::Automation(a) if a.is_opening == Some(true)));

    events.close().await;
}

#[tokio::test]
async fn get_next_requires_a_connection() {
    let connector: Scripted<Mock> = Scripted::new(Vec::new());
    let mut events = EventSession::with_connector(endpoint(), &connector);
    assert!(matches!(events.get_next().await, Err(Error::NotConnected)));
}

// ── Command session ─────────────────────────────────────────────────

#[tokio::test]
async fn nack_is_retransmitted_once() {
    let mock = open_command()
        .write(b"*1*1*12##")
        .read(NACK)
        .write(b"*1*1*12##")
        .read(ACK)
        .build();
    let connector = Scripted::new(vec![Ok(mock)]);
    let mut commands = CommandSession::with_connector(endpoint(), &connector);
    commands.connect().await.unwrap();

    let outcome = commands
        .send_command(&lighting::switch_on("12", None))
        .await
        .unwrap();
    assert_eq!(outcome, SendOutcome::Acked);
    commands.close().await;
}

#[tokio::test]
async fn second_nack_fails_the_message_not_the_session() {
    let mock = open_command()
        .write(b"*1*0*12##")
        .read(NACK)
        .write(b"*1*0*12##")
        .read(NACK)
        .write(b"*1*1*12##")
        .read(ACK)
        .build();
    let connector = Scripted::new(vec![Ok(mock)]);
    let mut commands = CommandSession::with_connector(endpoint(), &connector);
    commands.connect().await.unwrap();

    assert_eq!(commands.send("*1*0*12##").await.unwrap(), SendOutcome::Nacked);
    assert!(commands.session().is_connected());
    assert_eq!(commands.send("*1*1*12##").await.unwrap(), SendOutcome::Acked);
    assert_eq!(connector.attempts(), 1);
    commands.close().await;
}

#[tokio::test]
async fn data_frames_before_the_ack_are_skipped() {
    let mock = open_command()
        .write(b"*#1*12##")
        .read(b"*1*1*12##")
        .read(ACK)
        .build();
    let connector = Scripted::new(vec![Ok(mock)]);
    let mut commands = CommandSession::with_connector(endpoint(), &connector);
    commands.connect().await.unwrap();

    let outcome = commands.send_command(&lighting::status("12")).await.unwrap();
    assert_eq!(outcome, SendOutcome::Acked);
    commands.close().await;
}

#[tokio::test]
async fn dropped_connection_reconnects_and_resends() {
    let first = open_command().write(b"*2*1*41##").build();
    let second = open_command().write(b"*2*1*41##").read(ACK).build();
    let connector = Scripted::new(vec![Ok(first), Ok(second)]);
    let mut commands = CommandSession::with_connector(endpoint(), &connector);
    commands.connect().await.unwrap();

    assert_eq!(commands.send("*2*1*41##").await.unwrap(), SendOutcome::Acked);
    assert_eq!(connector.attempts(), 2);
    commands.close().await;
}

#[tokio::test]
async fn send_connects_on_demand() {
    let mock = open_command().write(b"*1*1*12##").read(ACK).build();
    let connector = Scripted::new(vec![Ok(mock)]);
    let mut commands = CommandSession::with_connector(endpoint(), &connector);

    assert_eq!(commands.send("*1*1*12##").await.unwrap(), SendOutcome::Acked);
    assert_eq!(commands.session().state(), SessionState::Ready);
    commands.close().await;
}

// ── Connection test ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn connection_test_retries_connects_with_doubling_waits() {
    let connector = Scripted::new(vec![refused(), refused(), Ok(open_event().build())]);

    let started = Instant::now();
    let outcome = test_gateway_with(endpoint(), &connector, RetryPolicy::test_connection())
        .await
        .unwrap();

    assert_eq!(outcome, NegotiationOutcome::Ready(Authentication::Open));
    assert!(secs_between(started.elapsed(), 3, 4));
}

#[tokio::test(start_paused = true)]
async fn connection_test_gives_up_after_three_refusals() {
    let connector: Scripted<Mock> = Scripted::new(Vec::new());
    let err = test_gateway_with(endpoint(), &connector, RetryPolicy::test_connection())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RetriesExhausted { attempts: 3 }));
    assert_eq!(connector.attempts(), 3);
}

#[tokio::test]
async fn connection_test_surfaces_a_reset() {
    let mock = Builder::new()
        .write(b"*99*1##")
        .read_error(std::io::ErrorKind::ConnectionReset.into())
        .build();
    let connector = Scripted::new(vec![Ok(mock)]);
    let err = test_gateway_with(endpoint(), &connector, RetryPolicy::test_connection())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConnectionReset));
}
