use crate::message::{ClientEvent, Command, ConnectionId, HistoryReplay, ServerEvent, Segments};
use crate::presence::Presence;
use crate::timeline::{Step, Timeline};
use rand::Rng;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    EveryoneExcept(ConnectionId),
    Only(ConnectionId),
}

impl Audience {
    pub fn includes(&self, connection_id: &ConnectionId) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::EveryoneExcept(excluded) => excluded != connection_id,
            Audience::Only(target) => target == connection_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub to: Audience,
    pub event: ServerEvent,
}

impl Dispatch {
    fn everyone(event: ServerEvent) -> Self {
        Self {
            to: Audience::Everyone,
            event,
        }
    }

    fn only(connection_id: ConnectionId, event: ServerEvent) -> Self {
        Self {
            to: Audience::Only(connection_id),
            event,
        }
    }

    fn everyone_except(connection_id: ConnectionId, event: ServerEvent) -> Self {
        Self {
            to: Audience::EveryoneExcept(connection_id),
            event,
        }
    }
}

/// Turns client events into timeline/presence operations and the
/// ordered list of events to fan out. Holds no state of its own.
pub struct Coordinator<'a> {
    timeline: &'a mut Timeline,
    presence: &'a mut Presence,
}

impl<'a> Coordinator<'a> {
    pub fn new(timeline: &'a mut Timeline, presence: &'a mut Presence) -> Self {
        Self { timeline, presence }
    }

    pub fn join<R: Rng>(&mut self, connection_id: ConnectionId, rng: &mut R) -> Vec<Dispatch> {
        let user = self.presence.join(connection_id, rng).clone();
        log::info!(
            "User connected: {} (connection {}). Current users: {}",
            user.name,
            connection_id,
            self.presence.len()
        );
        let user_info = ServerEvent::UserInfo {
            id: connection_id,
            color: user.color,
        };

        vec![
            Dispatch::only(connection_id, user_info),
            Dispatch::everyone(ServerEvent::UsersUpdate(self.presence.describe())),
            Dispatch::only(
                connection_id,
                ServerEvent::InitialHistory(self.timeline.snapshot()),
            ),
            Dispatch::only(
                connection_id,
                ServerEvent::HistoryState(self.timeline.state()),
            ),
        ]
    }

    pub fn leave(&mut self, connection_id: &ConnectionId) -> Vec<Dispatch> {
        if self.presence.leave(connection_id).is_none() {
            return Vec::new();
        }
        log::info!(
            "User disconnected. Remaining users: {}",
            self.presence.len()
        );
        vec![Dispatch::everyone(ServerEvent::UsersUpdate(
            self.presence.describe(),
        ))]
    }

    pub fn handle(&mut self, from: ConnectionId, event: ClientEvent) -> Vec<Dispatch> {
        match event {
            ClientEvent::NewStroke(Segments(segments)) => {
                let state = self.timeline.append(Command::stroke(segments));
                log::info!("[HISTORY] Stroke added. Total saved commands: {}", state.total);
                vec![Dispatch::everyone(ServerEvent::HistoryState(state))]
            }
            ClientEvent::SegmentDraw(segment) => {
                vec![Dispatch::everyone_except(
                    from,
                    ServerEvent::SegmentDraw(segment),
                )]
            }
            ClientEvent::Undo => {
                let step = self.timeline.undo();
                if let Step::Moved { state, .. } = &step {
                    log::info!("[UNDO] action performed. History cursor at: {}", state.cursor);
                }
                Self::step_dispatches(step)
            }
            ClientEvent::Redo => {
                let step = self.timeline.redo();
                if let Step::Moved { state, .. } = &step {
                    log::info!("[REDO] action performed. History cursor at: {}", state.cursor);
                }
                Self::step_dispatches(step)
            }
            ClientEvent::Clear => {
                let state = self.timeline.clear();
                log::info!("Canvas cleared by {}.", self.presence.name_of(&from));
                vec![
                    Dispatch::everyone(ServerEvent::clear()),
                    Dispatch::everyone(ServerEvent::HistoryState(state)),
                ]
            }
            ClientEvent::ChatMessage(message) => {
                let name = self.presence.name_of(&from);
                let line = match message {
                    Value::String(text) => format!("{}: {}", name, text),
                    other => format!("{}: {}", name, other),
                };
                vec![Dispatch::everyone(ServerEvent::ChatMessage(line))]
            }
            ClientEvent::ColorChange(color) => {
                if !self.presence.set_color(&from, color) {
                    log::debug!("Color change from unknown connection {}", from);
                }
                vec![Dispatch::everyone(ServerEvent::UsersUpdate(
                    self.presence.describe(),
                ))]
            }
            ClientEvent::CursorMove(position) => vec![Dispatch::everyone_except(
                from,
                ServerEvent::CursorUpdate {
                    id: from,
                    x: position.get("x").cloned(),
                    y: position.get("y").cloned(),
                },
            )],
        }
    }

    fn step_dispatches(step: Step) -> Vec<Dispatch> {
        match step {
            Step::Moved { replay, state } => vec![
                Dispatch::everyone(ServerEvent::HistoryReplay(HistoryReplay {
                    commands: replay,
                    cursor: state.cursor,
                    total: state.total,
                })),
                Dispatch::everyone(ServerEvent::HistoryState(state)),
            ],
            Step::Unchanged(state) => vec![Dispatch::everyone(ServerEvent::HistoryState(state))],
        }
    }
}
