use super::{Container, MediaId, PlayerState};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Events a widget reports back to whoever constructed it
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Fires once, when the widget has finished loading
    Ready,
    StateChange(PlayerState),
}

/// Sink handed to a widget at construction time.
///
/// Sending never blocks and never calls back into the session, so a widget
/// may emit from inside any of its own methods, from another thread, or
/// before `PlayerFactory::create` has even returned.
#[derive(Debug, Clone)]
pub struct WidgetEvents {
    sender: mpsc::UnboundedSender<WidgetEvent>,
}

impl WidgetEvents {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<WidgetEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn ready(&self) {
        self.emit(WidgetEvent::Ready);
    }

    pub fn state_change(&self, state: PlayerState) {
        self.emit(WidgetEvent::StateChange(state));
    }

    pub fn emit(&self, event: WidgetEvent) {
        // Receiver is gone once the session released this handle
        let _ = self.sender.send(event);
    }

    /// True once the session has stopped listening to this widget
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// An external, embeddable player instance.
///
/// Times are in seconds. Implementations are expected to tolerate any call
/// after `destroy()` and to clamp out-of-range seek targets themselves.
pub trait EmbeddedPlayer: Send + Sync {
    fn play_video(&self);
    fn pause_video(&self);
    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn destroy(&self);
}

/// Builds widgets bound to a container and a piece of media
pub trait PlayerFactory: Send + Sync {
    fn create(
        &self,
        container: &Container,
        media_id: &MediaId,
        events: WidgetEvents,
    ) -> Result<Arc<dyn EmbeddedPlayer>>;
}
