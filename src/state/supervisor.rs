//! Liveness-driven start/stop decisions for the slow supervisory tick.

/// Transition requested by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorAction {
    /// Start a session automatically.
    Start,
    /// Stop the automatically started session.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ManualOverride {
    /// Liveness observed when the command was issued; `None` until the first observation.
    pinned_live: Option<bool>,
}

/// Decides automatic session transitions from the hosting context's liveness.
///
/// Sessions run while the context is offline and stop when it goes live. A manual start or
/// stop pins the running state until the observed liveness changes.
#[derive(Debug, Clone)]
pub struct Supervisor {
    enabled: bool,
    last_live: Option<bool>,
    manual: Option<ManualOverride>,
}

impl Supervisor {
    /// Create a supervisor; a disabled one never requests anything.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last_live: None,
            manual: None,
        }
    }

    /// Record a manual start or stop command.
    pub fn manual_command(&mut self) {
        self.manual = Some(ManualOverride {
            pinned_live: self.last_live,
        });
    }

    /// Feed one liveness observation and return the transition to perform, if any.
    pub fn observe(
        &mut self,
        live: bool,
        running: bool,
        started_manually: bool,
    ) -> Option<SupervisorAction> {
        self.last_live = Some(live);

        if let Some(manual) = self.manual.as_mut() {
            match manual.pinned_live {
                None => manual.pinned_live = Some(live),
                Some(pinned) if pinned != live => self.manual = None,
                Some(_) => {}
            }
        }

        if !self.enabled || self.manual.is_some() {
            return None;
        }

        match (live, running) {
            (true, true) if !started_manually => Some(SupervisorAction::Stop),
            (false, false) => Some(SupervisorAction::Start),
            _ => None,
        }
    }
}
