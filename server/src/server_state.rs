use crate::admin::BoardDescription;
use std::num::Wrapping;
use system::{ConnectionId, Coordinator, Presence, Timeline};

/// The one shared canvas. Only the server task touches it.
pub struct ServerState {
    connection_id_source: Wrapping<ConnectionId>,
    timeline: Timeline,
    presence: Presence,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            timeline: Timeline::new(),
            presence: Presence::new(),
        }
    }

    pub fn coordinator(&mut self) -> Coordinator<'_> {
        Coordinator::new(&mut self.timeline, &mut self.presence)
    }

    /// Next id not rejected by `in_use`, or `None` when every id is taken.
    pub fn new_connection_id<F>(&mut self, in_use: F) -> Option<ConnectionId>
    where
        F: Fn(&ConnectionId) -> bool,
    {
        for _ in 0..=ConnectionId::MAX as usize {
            self.connection_id_source += Wrapping(1);
            let candidate = self.connection_id_source.0;
            if !in_use(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    pub fn describe(&self, connections: usize) -> BoardDescription {
        BoardDescription {
            users: self.presence.describe(),
            history: self.timeline.state(),
            connections,
        }
    }
}
