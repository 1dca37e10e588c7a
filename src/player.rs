use log::debug;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Commands issued to the embedded video player. Fire and forget: the
/// widget mirrors the coordinator's intent, it holds no authoritative
/// state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    SetVolume(u8),
    SeekToStart,
}

/// Notifications flowing back from the embedded player. These can arrive
/// at arbitrary times relative to timer ticks and must be tolerated as
/// idempotent with respect to coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Ready,
    StateChanged(bool),
    Ended,
}

/// Sending half of the player bridge, held by the coordinator.
#[derive(Clone, Default)]
pub struct PlayerHandle {
    tx: Option<UnboundedSender<PlayerCommand>>,
}

impl PlayerHandle {
    pub fn new() -> (Self, UnboundedReceiver<PlayerCommand>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A handle with no player attached; every command is dropped.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, command: PlayerCommand) {
        if let Some(tx) = &self.tx {
            // The widget may have gone away; commands are best-effort.
            let _ = tx.send(command);
        }
    }
}

/// Headless stand-in for the embedded widget: logs every command and
/// acknowledges play/pause with the matching state event, the same shape
/// of traffic a real player surface produces.
pub fn spawn_stub(mut commands: UnboundedReceiver<PlayerCommand>) -> UnboundedReceiver<PlayerEvent> {
    let (events, rx) = unbounded_channel();
    tokio::spawn(async move {
        let _ = events.send(PlayerEvent::Ready);
        while let Some(command) = commands.recv().await {
            debug!("Player command: {:?}", command);
            match command {
                PlayerCommand::Play => {
                    let _ = events.send(PlayerEvent::StateChanged(true));
                }
                PlayerCommand::Pause => {
                    let _ = events.send(PlayerEvent::StateChanged(false));
                }
                PlayerCommand::SetVolume(_) | PlayerCommand::SeekToStart => {}
            }
        }
    });
    rx
}
