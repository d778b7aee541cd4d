use std::fmt;

/// States of one streaming session, per the orchestrator's state diagram:
/// `WaitingForConfig -> Computing -> Idle`, with `Idle -> Computing` on
/// reconfiguration and any state closing on peer disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    WaitingForConfig,
    Computing,
    Idle,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionState::WaitingForConfig => write!(f, "waiting for config"),
            SessionState::Computing => write!(f, "computing"),
            SessionState::Idle => write!(f, "idle"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// A command parsed from a `{"command": "...", ...}` client message.
#[derive(Debug, Clone)]
pub enum Command {
    Configure(serde_json::Value),
    Pause,
    Resume,
}

impl Command {
    /// Parses one incoming text frame. A `configure` command without a
    /// `payload` field uses an empty object, matching the HTTP endpoint's
    /// "partial configuration" semantics.
    pub fn parse(text: &str) -> Result<Self, crate::error::SimError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let command = value
            .get("command")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                crate::error::SimError::MalformedMessage("missing \"command\" field".to_string())
            })?;

        match command {
            "configure" => {
                let payload = value
                    .get("payload")
                    .cloned()
                    .unwrap_or_else(|| serde_json::json!({}));
                Ok(Command::Configure(payload))
            }
            "pause" => Ok(Command::Pause),
            "resume" => Ok(Command::Resume),
            other => Err(crate::error::SimError::MalformedMessage(format!(
                "unrecognized command \"{other}\""
            ))),
        }
    }
}

/// Tracks a session's current state and logs each transition, mirroring
/// the spacecraft mode FSM's `transition_to` pattern but for orchestrator
/// session states instead of vehicle operating modes.
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::WaitingForConfig,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition_to(&mut self, new_state: SessionState) {
        if self.state != new_state {
            tracing::info!(from = %self.state, to = %new_state, "session state transition");
            self.state = new_state;
        }
    }

    /// `pause`/`resume` are accepted in any state and never change it; the
    /// pre-compute core has no incremental mode for them to affect.
    pub fn on_command(&mut self, command: &Command) {
        match command {
            Command::Configure(_) => self.transition_to(SessionState::Computing),
            Command::Pause => tracing::debug!("pause accepted (no effect in pre-compute mode)"),
            Command::Resume => tracing::debug!("resume accepted (no effect in pre-compute mode)"),
        }
    }

    pub fn on_compute_finished(&mut self) {
        self.transition_to(SessionState::Idle);
    }

    pub fn on_peer_disconnected(&mut self) {
        self.transition_to(SessionState::Closed);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_then_finish_cycles_through_computing_to_idle() {
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::WaitingForConfig);

        session.on_command(&Command::Configure(serde_json::json!({})));
        assert_eq!(session.state(), SessionState::Computing);

        session.on_compute_finished();
        assert_eq!(session.state(), SessionState::Idle);

        session.on_command(&Command::Configure(serde_json::json!({"t_max": 10.0})));
        assert_eq!(session.state(), SessionState::Computing);
    }

    #[test]
    fn pause_and_resume_do_not_change_state() {
        let mut session = Session::new();
        session.on_command(&Command::Pause);
        assert_eq!(session.state(), SessionState::WaitingForConfig);
        session.on_command(&Command::Resume);
        assert_eq!(session.state(), SessionState::WaitingForConfig);
    }

    #[test]
    fn peer_disconnect_closes_from_any_state() {
        let mut session = Session::new();
        session.on_peer_disconnected();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn parse_rejects_missing_command_field() {
        let err = Command::parse("{}").unwrap_err();
        assert!(matches!(err, crate::error::SimError::MalformedMessage(_)));
    }

    #[test]
    fn parse_accepts_configure_without_payload() {
        let command = Command::parse(r#"{"command":"configure"}"#).unwrap();
        assert!(matches!(command, Command::Configure(_)));
    }
}
