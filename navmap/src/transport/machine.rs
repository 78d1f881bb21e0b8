//! Connection lifecycle as explicit transitions.
//!
//! [`LinkMachine::handle`] maps `(state, event)` to a new state plus the
//! effects the driver must carry out. It performs no I/O, so the reconnect
//! rules can be exercised without a socket or a clock.

use std::fmt;
use std::time::Duration;

/// Fixed delay between a close and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Closing => "closing",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Open a connection to the current target, if any
    Connect,
    /// Operator-initiated (re)connect to `url`; enables automatic reconnect
    Retarget { url: String },
    /// The connection handshake completed
    Opened,
    /// The connection failed or errored
    Errored { reason: String },
    /// The connection is gone
    Closed,
    /// The pending reconnect delay elapsed
    ReconnectDue,
    /// Stop for good: no reconnect, close if open
    Shutdown,
}

/// Work the driver must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEffect {
    Open { url: String },
    /// Close the socket (if any) and then feed back [`LinkEvent::Closed`]
    Close,
    ScheduleReconnect { delay: Duration },
    CancelReconnect,
    /// Connected indicator changed
    Status { connected: bool },
    /// A status line for the raw log
    Log(String),
}

/// The transport's reconnect state machine.
#[derive(Debug, Clone)]
pub struct LinkMachine {
    state: LinkState,
    url: Option<String>,
    should_reconnect: bool,
    reconnect_pending: bool,
    reconnect_delay: Duration,
}

impl Default for LinkMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkMachine {
    pub fn new() -> Self {
        Self::with_delay(RECONNECT_DELAY)
    }

    pub fn with_delay(reconnect_delay: Duration) -> Self {
        Self {
            state: LinkState::Disconnected,
            url: None,
            should_reconnect: false,
            reconnect_pending: false,
            reconnect_delay,
        }
    }

    /// A machine targeting `url` with automatic reconnect enabled.
    pub fn targeting(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            url: Some(url.into()),
            should_reconnect: true,
            ..Self::with_delay(reconnect_delay)
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn should_reconnect(&self) -> bool {
        self.should_reconnect
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Apply one event.
    pub fn handle(&mut self, event: LinkEvent) -> Vec<LinkEffect> {
        match event {
            LinkEvent::Connect => self.connect(),
            LinkEvent::Retarget { url } => self.retarget(url),
            LinkEvent::Opened => self.opened(),
            LinkEvent::Errored { reason } => self.errored(reason),
            LinkEvent::Closed => self.closed(),
            LinkEvent::ReconnectDue => {
                self.reconnect_pending = false;
                self.connect()
            }
            LinkEvent::Shutdown => self.shutdown(),
        }
    }

    fn connect(&mut self) -> Vec<LinkEffect> {
        let Some(url) = self.url.clone() else {
            return Vec::new();
        };
        if self.state != LinkState::Disconnected {
            return Vec::new();
        }

        self.state = LinkState::Connecting;
        vec![
            LinkEffect::Log(format!("Attempting to connect to {}...", url)),
            LinkEffect::Open { url },
        ]
    }

    fn retarget(&mut self, url: String) -> Vec<LinkEffect> {
        self.url = Some(url);
        self.should_reconnect = true;

        match self.state {
            LinkState::Disconnected => {
                let mut effects = Vec::new();
                if self.reconnect_pending {
                    self.reconnect_pending = false;
                    effects.push(LinkEffect::CancelReconnect);
                }
                effects.extend(self.connect());
                effects
            }
            // The close handler schedules the reconnect to the new target
            LinkState::Connecting | LinkState::Connected => {
                self.state = LinkState::Closing;
                vec![LinkEffect::Close]
            }
            LinkState::Closing => Vec::new(),
        }
    }

    fn opened(&mut self) -> Vec<LinkEffect> {
        if self.state != LinkState::Connecting {
            return Vec::new();
        }
        self.state = LinkState::Connected;

        let mut effects = vec![LinkEffect::Status { connected: true }];
        if let Some(url) = &self.url {
            effects.push(LinkEffect::Log(format!("Connected to {}", url)));
        }
        if self.reconnect_pending {
            self.reconnect_pending = false;
            effects.push(LinkEffect::CancelReconnect);
        }
        effects
    }

    fn errored(&mut self, reason: String) -> Vec<LinkEffect> {
        if self.state == LinkState::Disconnected {
            return Vec::new();
        }
        self.state = LinkState::Closing;
        vec![
            LinkEffect::Status { connected: false },
            LinkEffect::Log(format!("WebSocket error: {}", reason)),
            LinkEffect::Close,
        ]
    }

    fn closed(&mut self) -> Vec<LinkEffect> {
        if self.state == LinkState::Disconnected {
            return Vec::new();
        }
        self.state = LinkState::Disconnected;

        let mut effects = vec![
            LinkEffect::Status { connected: false },
            LinkEffect::Log("Connection closed.".to_string()),
        ];
        if self.should_reconnect && !self.reconnect_pending {
            self.reconnect_pending = true;
            effects.push(LinkEffect::ScheduleReconnect {
                delay: self.reconnect_delay,
            });
        }
        effects
    }

    fn shutdown(&mut self) -> Vec<LinkEffect> {
        self.should_reconnect = false;
        let mut effects = Vec::new();
        if self.reconnect_pending {
            self.reconnect_pending = false;
            effects.push(LinkEffect::CancelReconnect);
        }
        if matches!(self.state, LinkState::Connecting | LinkState::Connected) {
            self.state = LinkState::Closing;
            effects.push(LinkEffect::Close);
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "ws://127.0.0.1:8080";

    fn connected_machine() -> LinkMachine {
        let mut machine = LinkMachine::new();
        machine.handle(LinkEvent::Retarget { url: URL.into() });
        machine.handle(LinkEvent::Opened);
        assert_eq!(machine.state(), LinkState::Connected);
        machine
    }

    fn schedules(effects: &[LinkEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, LinkEffect::ScheduleReconnect { .. }))
            .count()
    }

    #[test]
    fn test_connect_without_target_is_noop() {
        let mut machine = LinkMachine::new();
        assert!(machine.handle(LinkEvent::Connect).is_empty());
        assert_eq!(machine.state(), LinkState::Disconnected);
    }

    #[test]
    fn test_retarget_opens_connection() {
        let mut machine = LinkMachine::new();
        let effects = machine.handle(LinkEvent::Retarget { url: URL.into() });

        assert_eq!(machine.state(), LinkState::Connecting);
        assert!(machine.should_reconnect());
        assert_eq!(
            effects,
            vec![
                LinkEffect::Log(format!("Attempting to connect to {}...", URL)),
                LinkEffect::Open { url: URL.into() },
            ]
        );
    }

    #[test]
    fn test_opened_reports_connected() {
        let mut machine = LinkMachine::new();
        machine.handle(LinkEvent::Retarget { url: URL.into() });
        let effects = machine.handle(LinkEvent::Opened);

        assert_eq!(effects[0], LinkEffect::Status { connected: true });
        assert_eq!(effects[1], LinkEffect::Log(format!("Connected to {}", URL)));
    }

    #[test]
    fn test_close_schedules_exactly_one_reconnect() {
        let mut machine = connected_machine();

        let effects = machine.handle(LinkEvent::Closed);
        assert_eq!(schedules(&effects), 1);
        assert!(effects.contains(&LinkEffect::ScheduleReconnect {
            delay: Duration::from_millis(3000)
        }));
        assert!(machine.reconnect_pending());

        // A second close while the timer is pending schedules nothing
        machine.handle(LinkEvent::Connect);
        let effects = machine.handle(LinkEvent::Closed);
        assert_eq!(schedules(&effects), 0);
    }

    #[test]
    fn test_error_force_closes_before_close_handler() {
        let mut machine = connected_machine();

        let effects = machine.handle(LinkEvent::Errored {
            reason: "reset".into(),
        });
        assert_eq!(machine.state(), LinkState::Closing);
        assert_eq!(effects.last(), Some(&LinkEffect::Close));
        assert_eq!(schedules(&effects), 0);

        let effects = machine.handle(LinkEvent::Closed);
        assert_eq!(machine.state(), LinkState::Disconnected);
        assert_eq!(schedules(&effects), 1);
    }

    #[test]
    fn test_reconnect_due_reconnects() {
        let mut machine = connected_machine();
        machine.handle(LinkEvent::Closed);

        let effects = machine.handle(LinkEvent::ReconnectDue);
        assert!(!machine.reconnect_pending());
        assert_eq!(machine.state(), LinkState::Connecting);
        assert!(effects.contains(&LinkEffect::Open { url: URL.into() }));
    }

    #[test]
    fn test_failed_attempt_cycles_back_to_reconnect() {
        let mut machine = LinkMachine::targeting(URL, RECONNECT_DELAY);
        machine.handle(LinkEvent::Connect);
        machine.handle(LinkEvent::Errored {
            reason: "refused".into(),
        });
        let effects = machine.handle(LinkEvent::Closed);
        assert_eq!(schedules(&effects), 1);
    }

    #[test]
    fn test_retarget_while_connected_closes_first() {
        let mut machine = connected_machine();
        let effects = machine.handle(LinkEvent::Retarget {
            url: "ws://10.0.0.5:9000".into(),
        });

        assert_eq!(effects, vec![LinkEffect::Close]);
        assert_eq!(machine.url(), Some("ws://10.0.0.5:9000"));

        let effects = machine.handle(LinkEvent::Closed);
        assert_eq!(schedules(&effects), 1);
    }

    #[test]
    fn test_retarget_while_reconnect_pending_connects_now() {
        let mut machine = connected_machine();
        machine.handle(LinkEvent::Closed);

        let effects = machine.handle(LinkEvent::Retarget { url: URL.into() });
        assert_eq!(effects[0], LinkEffect::CancelReconnect);
        assert!(effects.contains(&LinkEffect::Open { url: URL.into() }));
        assert!(!machine.reconnect_pending());
    }

    #[test]
    fn test_shutdown_disables_reconnect() {
        let mut machine = connected_machine();
        let effects = machine.handle(LinkEvent::Shutdown);
        assert_eq!(effects, vec![LinkEffect::Close]);

        let effects = machine.handle(LinkEvent::Closed);
        assert_eq!(schedules(&effects), 0);
        assert_eq!(machine.state(), LinkState::Disconnected);
    }

    #[test]
    fn test_stray_events_are_ignored() {
        let mut machine = LinkMachine::new();
        assert!(machine.handle(LinkEvent::Opened).is_empty());
        assert!(machine.handle(LinkEvent::Closed).is_empty());
        assert!(machine
            .handle(LinkEvent::Errored {
                reason: "x".into()
            })
            .is_empty());
    }
}
