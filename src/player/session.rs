use super::widget::{EmbeddedPlayer, PlayerFactory, WidgetEvent, WidgetEvents};
use super::{Container, MediaId, PlayerState, StateChange};
use crate::error::SessionError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Listener for state changes of the current player. Replaced on every `init_player`.
pub type StateChangeCallback = Arc<dyn Fn(StateChange) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Initializing,
    Ready,
}

struct ActivePlayer {
    generation: u64,
    container: Container,
    media_id: MediaId,
    widget: Arc<dyn EmbeddedPlayer>,
    ready: bool,
    ready_tx: Option<oneshot::Sender<Result<(), SessionError>>>,
    initial_progress: Option<f64>,
    // State changes the widget emitted before ready; delivered right after it
    early_states: Vec<PlayerState>,
    // Dropping this stops the handle's event relay
    _shutdown: oneshot::Sender<()>,
}

enum Slot {
    Empty,
    Active(ActivePlayer),
}

struct SessionInner {
    slot: Slot,
    on_state_change: Option<StateChangeCallback>,
    // Bumped by every init_player and destroy; events tagged with an older value are dropped
    generation: u64,
}

fn lock(inner: &Mutex<SessionInner>) -> MutexGuard<'_, SessionInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single point of control for one embedded player at a time.
///
/// Cloning yields another handle to the same session, so the composition root
/// can build one and pass it to every UI piece that needs transport controls.
/// Transport calls made while no player is ready are ignored.
///
/// Widget callbacks and the state-change listener are never invoked while the
/// session's lock is held; a listener may call back into the session.
#[derive(Clone)]
pub struct PlayerSession {
    factory: Arc<dyn PlayerFactory>,
    inner: Arc<Mutex<SessionInner>>,
}

impl PlayerSession {
    pub fn new(factory: Arc<dyn PlayerFactory>) -> Self {
        Self {
            factory,
            inner: Arc::new(Mutex::new(SessionInner {
                slot: Slot::Empty,
                on_state_change: None,
                generation: 0,
            })),
        }
    }

    /// Replace the current player with a new widget for `media_id`.
    ///
    /// The previous widget, if any, is destroyed before the new one is built,
    /// and its pending ready signal settles with `SessionError::Superseded`.
    /// Once the new widget reports ready, a positive `initial_progress_percent`
    /// seeks to that share of the duration.
    ///
    /// Must be called from within a Tokio runtime: each handle gets a relay task
    /// that delivers widget events in the order they were emitted.
    pub fn init_player<F>(
        &self,
        container: Container,
        media_id: MediaId,
        on_state_change: F,
        initial_progress_percent: Option<f64>,
    ) -> ReadySignal
    where
        F: Fn(StateChange) + Send + Sync + 'static,
    {
        let (ready_tx, ready_rx) = oneshot::channel();
        let signal = ReadySignal { receiver: ready_rx };

        let (previous, generation) = {
            let mut inner = lock(&self.inner);
            inner.generation += 1;
            inner.on_state_change = Some(Arc::new(on_state_change));
            (std::mem::replace(&mut inner.slot, Slot::Empty), inner.generation)
        };

        if let Slot::Active(previous) = previous {
            info!("Replacing player for '{}' with '{}'", previous.media_id, media_id);
            previous.widget.destroy();
        }

        let (events, event_rx) = WidgetEvents::channel();
        let widget = match self.factory.create(&container, &media_id, events) {
            Ok(widget) => widget,
            Err(e) => {
                warn!("Failed to create player for '{}': {}", media_id, e);
                let _ = ready_tx.send(Err(SessionError::Widget(e.to_string())));
                return signal;
            }
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        {
            let mut inner = lock(&self.inner);
            if inner.generation != generation {
                // A newer init_player or destroy got in while we were building
                drop(inner);
                debug!("Player for '{}' superseded during construction", media_id);
                widget.destroy();
                return signal;
            }

            debug!("Player for '{}' initializing in '{}'", media_id, container);
            inner.slot = Slot::Active(ActivePlayer {
                generation,
                container,
                media_id,
                widget,
                ready: false,
                ready_tx: Some(ready_tx),
                initial_progress: initial_progress_percent,
                early_states: Vec::new(),
                _shutdown: shutdown_tx,
            });
        }

        tokio::spawn(relay_events(
            Arc::downgrade(&self.inner),
            generation,
            event_rx,
            shutdown_rx,
        ));

        signal
    }

    /// `init_player` followed by a bounded wait for the ready signal
    pub async fn init_and_wait<F>(
        &self,
        container: Container,
        media_id: MediaId,
        on_state_change: F,
        initial_progress_percent: Option<f64>,
        limit: Duration,
    ) -> Result<(), SessionError>
    where
        F: Fn(StateChange) + Send + Sync + 'static,
    {
        self.init_player(container, media_id, on_state_change, initial_progress_percent)
            .with_timeout(limit)
            .await
    }

    // The widget transport calls go to, if it has reported ready
    fn live_widget(&self) -> Option<Arc<dyn EmbeddedPlayer>> {
        match &lock(&self.inner).slot {
            Slot::Active(active) if active.ready => Some(active.widget.clone()),
            Slot::Active(_) | Slot::Empty => None,
        }
    }

    pub fn play(&self) {
        match self.live_widget() {
            Some(widget) => widget.play_video(),
            None => debug!("play ignored: no ready player"),
        }
    }

    pub fn pause(&self) {
        match self.live_widget() {
            Some(widget) => widget.pause_video(),
            None => debug!("pause ignored: no ready player"),
        }
    }

    /// Seek to `percent` of the reported duration. Out-of-range values are
    /// passed through and left to the widget to clamp.
    pub fn seek_to(&self, percent: f64) {
        match self.live_widget() {
            Some(widget) => {
                let target = percent / 100.0 * usable_duration(widget.duration());
                debug!("Seeking to {:.1}% ({:.2}s)", percent, target);
                widget.seek_to(target, true);
            }
            None => debug!("seek ignored: no ready player"),
        }
    }

    /// Playback position as a percentage of the duration, 0 when unknown
    pub fn progress(&self) -> f64 {
        let Some(widget) = self.live_widget() else {
            return 0.0;
        };

        let duration = usable_duration(widget.duration());
        if duration == 0.0 {
            return 0.0;
        }
        widget.current_time() / duration * 100.0
    }

    /// Release the current widget and container. Safe to call repeatedly.
    pub fn destroy(&self) {
        let previous = {
            let mut inner = lock(&self.inner);
            inner.generation += 1;
            std::mem::replace(&mut inner.slot, Slot::Empty)
        };

        match previous {
            Slot::Active(active) => {
                info!("Destroying player for '{}'", active.media_id);
                active.widget.destroy();
            }
            Slot::Empty => debug!("destroy ignored: no player"),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(&lock(&self.inner).slot, Slot::Active(active) if active.ready)
    }

    pub fn phase(&self) -> SessionPhase {
        match &lock(&self.inner).slot {
            Slot::Empty => SessionPhase::Empty,
            Slot::Active(active) if active.ready => SessionPhase::Ready,
            Slot::Active(_) => SessionPhase::Initializing,
        }
    }

    pub fn media_id(&self) -> Option<MediaId> {
        match &lock(&self.inner).slot {
            Slot::Active(active) => Some(active.media_id.clone()),
            Slot::Empty => None,
        }
    }

    pub fn container(&self) -> Option<Container> {
        match &lock(&self.inner).slot {
            Slot::Active(active) => Some(active.container.clone()),
            Slot::Empty => None,
        }
    }
}

impl fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerSession")
            .field("phase", &self.phase())
            .field("media_id", &self.media_id())
            .finish()
    }
}

// Embeds report 0 or NaN before metadata loads
fn usable_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

async fn relay_events(
    inner: Weak<Mutex<SessionInner>>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<WidgetEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let Some(session) = inner.upgrade() else {
            break;
        };

        match event {
            WidgetEvent::Ready => handle_ready(&session, generation),
            WidgetEvent::StateChange(state) => handle_state_change(&session, generation, state),
        }
    }

    debug!("Event relay for player generation {} stopped", generation);
}

fn handle_ready(inner: &Mutex<SessionInner>, generation: u64) {
    let (widget, ready_tx, initial_progress, media_id) = {
        let mut guard = lock(inner);
        let Slot::Active(active) = &mut guard.slot else {
            return;
        };
        if active.generation != generation || active.ready {
            return;
        }

        active.ready = true;
        (
            active.widget.clone(),
            active.ready_tx.take(),
            active.initial_progress.take(),
            active.media_id.clone(),
        )
    };

    info!("Player for '{}' ready", media_id);

    // The resume seek lands before anyone awaiting the signal can issue their own
    if let Some(percent) = initial_progress.filter(|percent| *percent > 0.0) {
        let target = percent / 100.0 * usable_duration(widget.duration());
        debug!("Resuming '{}' at {:.1}% ({:.2}s)", media_id, percent, target);
        widget.seek_to(target, true);
    }

    if let Some(ready_tx) = ready_tx {
        let _ = ready_tx.send(Ok(()));
    }

    let (callback, early_states) = {
        let mut guard = lock(inner);
        let callback = guard.on_state_change.clone();
        match &mut guard.slot {
            Slot::Active(active) if active.generation == generation => {
                (callback, std::mem::take(&mut active.early_states))
            }
            Slot::Active(_) | Slot::Empty => return,
        }
    };

    if let Some(callback) = callback {
        for state in early_states {
            debug!("Player for '{}' changed state to {:?} (before ready)", media_id, state);
            callback(StateChange {
                media_id: media_id.clone(),
                state,
            });
        }
    }
}

fn handle_state_change(inner: &Mutex<SessionInner>, generation: u64, state: PlayerState) {
    let (callback, media_id) = {
        let mut guard = lock(inner);
        let callback = guard.on_state_change.clone();
        match &mut guard.slot {
            Slot::Active(active) if active.generation == generation && active.ready => {
                (callback, active.media_id.clone())
            }
            Slot::Active(active) if active.generation == generation => {
                // Held back until the handle reports ready
                active.early_states.push(state);
                return;
            }
            Slot::Active(_) | Slot::Empty => return,
        }
    };

    debug!("Player for '{}' changed state to {:?}", media_id, state);
    if let Some(callback) = callback {
        callback(StateChange { media_id, state });
    }
}

/// Settles once the player requested by `init_player` is usable, or can no
/// longer become usable.
#[must_use = "the ready signal does nothing unless awaited"]
#[derive(Debug)]
pub struct ReadySignal {
    receiver: oneshot::Receiver<Result<(), SessionError>>,
}

impl ReadySignal {
    pub async fn with_timeout(self, limit: Duration) -> Result<(), SessionError> {
        match tokio::time::timeout(limit, self).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::ReadyTimeout(whole_millis(limit))),
        }
    }
}

// Saturates instead of wrapping for limits past u64::MAX milliseconds
fn whole_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

impl Future for ReadySignal {
    type Output = Result<(), SessionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the handle was released before it got ready
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(SessionError::Superseded)))
    }
}
