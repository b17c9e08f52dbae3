use system::{HistoryState, UserDescription};
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    DescribeBoard { tx: Sender<BoardDescription> },
}

#[derive(Debug, Clone)]
pub struct BoardDescription {
    pub users: Vec<UserDescription>,
    pub history: HistoryState,
    pub connections: usize,
}
