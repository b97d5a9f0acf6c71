//! Time use cases.
//!
//! The world clock starts uninitialized. `InitClock` starts it once; after
//! that only timed actions (movement, discovery, interactions) advance it.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use wrldkeep_domain::{log_kinds, CalendarId, LogPayload, SessionId, WorldClock};

use crate::stores::SessionStore;
use crate::use_cases::EngineError;

/// Container for time use cases.
pub struct TimeUseCases {
    pub init_clock: Arc<InitClock>,
}

impl TimeUseCases {
    pub fn new(init_clock: Arc<InitClock>) -> Self {
        Self { init_clock }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitClockInput {
    pub session_id: SessionId,
    /// Defaults to the built-in fantasy calendar
    pub calendar: Option<CalendarId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitClockResult {
    pub clock: WorldClock,
    /// False when a running clock was returned unchanged
    pub initialized: bool,
}

pub struct InitClock {
    sessions: Arc<SessionStore>,
}

impl InitClock {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// Start the clock at the default instant. A running clock is never
    /// rewound or replaced.
    pub async fn execute(&self, input: InitClockInput) -> Result<InitClockResult, EngineError> {
        let snapshot = self.sessions.snapshot(&input.session_id).await?;
        if let Some(clock) = snapshot.area_snapshot.clock {
            return Ok(InitClockResult {
                clock,
                initialized: false,
            });
        }

        let calendar = input.calendar.unwrap_or_default();
        self.sessions
            .mutate(&input.session_id, move |save, now| {
                let (clock, created) = save.area_snapshot.init_clock(calendar, now);
                if created {
                    let mut payload = LogPayload::new();
                    payload.insert("calendar".into(), Value::from(clock.calendar.as_str()));
                    payload.insert("clock".into(), Value::from(clock.display()));
                    save.append_log(
                        log_kinds::CLOCK_INIT,
                        format!("World clock started at {clock}"),
                        payload,
                        now,
                    );
                    tracing::info!(session_id = %save.session_id, clock = %clock, "Initialized world clock");
                }
                Ok(InitClockResult {
                    clock,
                    initialized: created,
                })
            })
            .await
    }
}
