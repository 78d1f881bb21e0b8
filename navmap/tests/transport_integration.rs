//! Transport tests against a local WebSocket server.

use std::time::Duration;

use futures_util::SinkExt;
use navmap::nmea::{NavPacket, NmeaDecoder};
use navmap::transport::{spawn_transport_with_delay, TransportEvent};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

const FRAME: &str = "noise\r\n$HEHDT,274.07,T*19\r\n$GPRMC,bad\r\n";

/// Accepts `sessions` connections, sends one frame on each and closes.
async fn serve(listener: TcpListener, sessions: usize) {
    for _ in 0..sessions {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(FRAME.to_string())).await.unwrap();
        let _ = ws.close(None).await;
    }
}

async fn collect_until<F>(rx: &mut mpsc::Receiver<TransportEvent>, done: F) -> Vec<TransportEvent>
where
    F: Fn(&[TransportEvent]) -> bool,
{
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), async {
        while !done(&events) {
            match rx.recv().await {
                Some(event) => events.push(event),
                None => break,
            }
        }
    })
    .await
    .expect("transport events did not arrive in time");
    events
}

fn connected_logs(events: &[TransportEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, TransportEvent::Log(line) if line.starts_with("Connected to")))
        .count()
}

#[tokio::test]
async fn test_receives_sentences_and_reconnects_after_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(serve(listener, 2));

    let (tx, mut rx) = mpsc::channel(64);
    let handle =
        spawn_transport_with_delay(NmeaDecoder, tx, CancellationToken::new(), Duration::from_millis(50));
    handle.connect(url.clone()).await.unwrap();

    let events = collect_until(&mut rx, |events| connected_logs(events) == 2).await;

    assert_eq!(
        events[0],
        TransportEvent::Log(format!("Attempting to connect to {}...", url))
    );
    assert!(events.contains(&TransportEvent::Status { connected: true }));
    assert!(events.contains(&TransportEvent::Status { connected: false }));
    assert!(events.contains(&TransportEvent::Log("Connection closed.".to_string())));

    let sentences: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            TransportEvent::Sentence { raw, packet } => Some((raw.as_str(), packet)),
            _ => None,
        })
        .collect();
    assert!(sentences.len() >= 2);
    assert_eq!(sentences[0].0, "$HEHDT,274.07,T*19");
    assert!(matches!(sentences[0].1, Some(NavPacket::Hdt(_))));
    assert_eq!(sentences[1].0, "$GPRMC,bad");
    assert!(sentences[1].1.is_none());
    assert!(sentences.iter().all(|(raw, _)| raw.starts_with('$')));

    drop(rx);
    handle.shutdown().await;
    server.await.unwrap();
}

#[tokio::test]
async fn test_disconnect_stops_reconnecting() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(serve(listener, 1));

    let (tx, mut rx) = mpsc::channel(64);
    let handle =
        spawn_transport_with_delay(NmeaDecoder, tx, CancellationToken::new(), Duration::from_millis(300));
    handle.connect(url).await.unwrap();
    collect_until(&mut rx, |events| connected_logs(events) == 1).await;

    handle.disconnect().await.unwrap();
    server.await.unwrap();

    // No further attempts once the reconnect flag is cleared
    tokio::time::sleep(Duration::from_millis(600)).await;
    let mut late = Vec::new();
    while let Ok(event) = rx.try_recv() {
        late.push(event);
    }
    assert!(!late
        .iter()
        .any(|e| matches!(e, TransportEvent::Log(line) if line.starts_with("Attempting"))));

    drop(rx);
    handle.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_reports_error_and_retries() {
    // Bind then drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let (tx, mut rx) = mpsc::channel(64);
    let handle =
        spawn_transport_with_delay(NmeaDecoder, tx, CancellationToken::new(), Duration::from_millis(20));
    handle.connect(url).await.unwrap();

    let attempts = |events: &[TransportEvent]| {
        events
            .iter()
            .filter(|e| matches!(e, TransportEvent::Log(line) if line.starts_with("Attempting")))
            .count()
    };
    let events = collect_until(&mut rx, |events| attempts(events) >= 2).await;

    assert!(events
        .iter()
        .any(|e| matches!(e, TransportEvent::Log(line) if line.starts_with("WebSocket error:"))));
    assert!(!events.contains(&TransportEvent::Status { connected: true }));

    drop(rx);
    handle.shutdown().await;
}
