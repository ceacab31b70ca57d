// In-process stand-in for an embedded player
// Drives the CLI demo and the session tests; records every call it gets

use super::widget::{EmbeddedPlayer, PlayerFactory, WidgetEvents};
use super::{Container, MediaId, PlayerState};
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A call the session made on a widget
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCall {
    Play,
    Pause,
    SeekTo { seconds: f64, allow_seek_ahead: bool },
    Destroy,
}

#[derive(Debug, Default)]
struct SimState {
    duration: f64,
    current_time: f64,
    playing: bool,
    destroyed: bool,
    calls: Vec<WidgetCall>,
}

#[derive(Debug)]
pub struct SimulatedPlayer {
    container: Container,
    media_id: MediaId,
    events: WidgetEvents,
    state: Mutex<SimState>,
}

impl SimulatedPlayer {
    pub fn new(container: Container, media_id: MediaId, events: WidgetEvents, duration: f64) -> Self {
        Self {
            container,
            media_id,
            events,
            state: Mutex::new(SimState {
                duration,
                ..SimState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn media_id(&self) -> &MediaId {
        &self.media_id
    }

    pub fn set_duration(&self, seconds: f64) {
        self.state().duration = seconds;
    }

    pub fn set_current_time(&self, seconds: f64) {
        self.state().current_time = seconds;
    }

    /// Signal that loading finished
    pub fn fire_ready(&self) {
        self.events.ready();
    }

    pub fn fire_state(&self, state: PlayerState) {
        self.events.state_change(state);
    }

    pub fn calls(&self) -> Vec<WidgetCall> {
        self.state().calls.clone()
    }

    pub fn destroy_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| **call == WidgetCall::Destroy)
            .count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state().destroyed
    }

    pub fn is_playing(&self) -> bool {
        self.state().playing
    }

    /// Move the playhead forward while playing; emits `Ended` when it reaches the end
    pub fn advance(&self, seconds: f64) {
        let ended = {
            let mut state = self.state();
            if !state.playing || state.destroyed {
                return;
            }
            state.current_time = (state.current_time + seconds).min(state.duration);
            if state.current_time >= state.duration {
                state.playing = false;
                true
            } else {
                false
            }
        };

        if ended {
            self.events.state_change(PlayerState::Ended);
        }
    }
}

impl EmbeddedPlayer for SimulatedPlayer {
    fn play_video(&self) {
        let emit = {
            let mut state = self.state();
            state.calls.push(WidgetCall::Play);
            state.playing = !state.destroyed;
            !state.destroyed
        };
        if emit {
            self.events.state_change(PlayerState::Playing);
        }
    }

    fn pause_video(&self) {
        let emit = {
            let mut state = self.state();
            state.calls.push(WidgetCall::Pause);
            state.playing = false;
            !state.destroyed
        };
        if emit {
            self.events.state_change(PlayerState::Paused);
        }
    }

    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) {
        let mut state = self.state();
        state.calls.push(WidgetCall::SeekTo {
            seconds,
            allow_seek_ahead,
        });
        // Embeds clamp out-of-range targets rather than rejecting them
        let upper = state.duration.max(0.0);
        state.current_time = if seconds.is_nan() { 0.0 } else { seconds.clamp(0.0, upper) };
    }

    fn current_time(&self) -> f64 {
        self.state().current_time
    }

    fn duration(&self) -> f64 {
        self.state().duration
    }

    fn destroy(&self) {
        let mut state = self.state();
        state.calls.push(WidgetCall::Destroy);
        state.destroyed = true;
        state.playing = false;
        debug!("Simulated player for '{}' destroyed", self.media_id);
    }
}

/// Builds `SimulatedPlayer`s and keeps them around so a driver can poke them
#[derive(Debug)]
pub struct SimulatedFactory {
    duration: f64,
    auto_ready: bool,
    created: Mutex<Vec<Arc<SimulatedPlayer>>>,
    fail_next: Mutex<Option<String>>,
}

impl SimulatedFactory {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            auto_ready: false,
            created: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Emit `Ready` straight away from inside `create`
    pub fn auto_ready(mut self) -> Self {
        self.auto_ready = true;
        self
    }

    /// Make the next `create` call fail with `reason`
    pub fn fail_next(&self, reason: impl Into<String>) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(reason.into());
    }

    pub fn players(&self) -> Vec<Arc<SimulatedPlayer>> {
        self.created.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last(&self) -> Option<Arc<SimulatedPlayer>> {
        self.players().pop()
    }
}

impl PlayerFactory for SimulatedFactory {
    fn create(
        &self,
        container: &Container,
        media_id: &MediaId,
        events: WidgetEvents,
    ) -> Result<Arc<dyn EmbeddedPlayer>> {
        if let Some(reason) = self.fail_next.lock().unwrap_or_else(PoisonError::into_inner).take() {
            return Err(anyhow::anyhow!(reason));
        }

        let player = Arc::new(SimulatedPlayer::new(
            container.clone(),
            media_id.clone(),
            events,
            self.duration,
        ));
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(player.clone());

        if self.auto_ready {
            player.fire_ready();
        }

        Ok(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(duration: f64) -> (SimulatedPlayer, tokio::sync::mpsc::UnboundedReceiver<crate::player::WidgetEvent>) {
        let (events, rx) = WidgetEvents::channel();
        (SimulatedPlayer::new("root".into(), "abc".into(), events, duration), rx)
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let (player, _rx) = player(120.0);
        player.seek_to(500.0, true);
        assert_eq!(player.current_time(), 120.0);
        player.seek_to(-3.0, true);
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_play_emits_state_and_advance_ends() {
        let (player, mut rx) = player(10.0);
        player.play_video();
        assert_eq!(
            rx.try_recv().unwrap(),
            crate::player::WidgetEvent::StateChange(PlayerState::Playing)
        );

        player.advance(4.0);
        assert_eq!(player.current_time(), 4.0);
        player.advance(20.0);
        assert_eq!(player.current_time(), 10.0);
        assert!(!player.is_playing());
        assert_eq!(
            rx.try_recv().unwrap(),
            crate::player::WidgetEvent::StateChange(PlayerState::Ended)
        );
    }

    #[test]
    fn test_factory_failure_is_one_shot() {
        let factory = SimulatedFactory::new(30.0);
        factory.fail_next("no embed api");
        let (events, _rx) = WidgetEvents::channel();
        assert!(factory.create(&"root".into(), &"a".into(), events.clone()).is_err());
        assert!(factory.create(&"root".into(), &"a".into(), events).is_ok());
        assert_eq!(factory.players().len(), 1);
    }
}
