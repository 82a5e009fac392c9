//! Play session driver
//!
//! [`Session`] owns the simulation and everything around it: the persisted
//! profile, settings, audio state, input and the two clocks. Frontends feed
//! it time and input and read back events plus a [`RenderSnapshot`].

use serde::Serialize;

use crate::audio::AudioManager;
use crate::consts::COINS_PER_DELIVERY;
use crate::highscores::{FlushReport, ScoreService, flush_unsubmitted};
use crate::house::{self, ItemKind, StoreError};
use crate::persistence::{KeyValueStore, PersistError, Profile};
use crate::platform::input::{Command, InputState};
use crate::settings::Settings;
use crate::sim::{
    AnimationClock, AxisBox, GameEvent, PowerupKind, SimError, SimulationState, TickScheduler,
    tick,
};
use crate::tuning::Tuning;

/// How many fresh seeds a reset tries before giving up
const RESET_ATTEMPTS: u32 = 3;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub player: AxisBox,
    pub facing_left: bool,
    pub flying: bool,
    /// Walk-cycle frame, `1..=8`
    pub frame: u8,
    pub invincible: bool,
    /// Blink the player while invincible (off under reduced motion)
    pub flashing: bool,
    pub health: u32,
    pub score: u64,
    pub high_score: u64,
    pub coins: u64,
    pub level: u32,
    pub target_door: Option<AxisBox>,
    pub enemies: Vec<(AxisBox, bool)>,
    pub powerups: Vec<(AxisBox, PowerupKind)>,
    pub paused: bool,
    /// Playback gain for sound events, `None` while muted
    pub volume: Option<f32>,
    pub show_touch_controls: bool,
}

/// One player's ongoing game
pub struct Session<S: KeyValueStore> {
    state: SimulationState,
    profile: Profile,
    settings: Settings,
    audio: AudioManager,
    store: S,
    input: InputState,
    scheduler: TickScheduler,
    animation: AnimationClock,
    /// Whether the most recent tick moved the player
    last_tick_moved: bool,
    /// Wall-clock milliseconds at `now_ms == 0`
    epoch_ms: u64,
    sessions_played: u64,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the profile from `store` and build the first town
    pub fn new(tuning: Tuning, seed: u64, store: S) -> Result<Self, SimError> {
        let profile = Profile::load(&store);
        let settings = Settings::load(&store);
        let scheduler = TickScheduler::new(tuning.tick_ms);
        let animation = AnimationClock::new(tuning.animation_ms);
        let state = SimulationState::new(tuning, seed)?;
        Ok(Self {
            audio: settings.audio(),
            state,
            profile,
            settings,
            store,
            input: InputState::new(),
            scheduler,
            animation,
            last_tick_moved: false,
            epoch_ms: 0,
            sessions_played: 0,
        })
    }

    /// Anchor monotonic time to the wall clock, for score timestamps
    pub fn set_epoch(&mut self, epoch_ms: u64) {
        self.epoch_ms = epoch_ms;
    }

    /// Arm the tick loop
    pub fn start(&mut self, now_ms: f64) {
        self.scheduler.start(now_ms);
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    pub fn animation_frame(&self) -> u8 {
        self.animation.frame()
    }

    pub fn sessions_played(&self) -> u64 {
        self.sessions_played
    }

    /// Milliseconds until the next tick is due, `None` while paused
    pub fn time_until_tick(&self, now_ms: f64) -> Option<f64> {
        self.scheduler.time_until_due(now_ms)
    }

    /// Run a tick if one is due and advance the walk cycle. Returns the
    /// events the frontend should act on; sounds are dropped while muted.
    pub fn update(&mut self, now_ms: f64) -> Result<Vec<GameEvent>, SimError> {
        let mut events = Vec::new();
        if self.scheduler.is_due(now_ms) {
            let input = self.input.sample();
            let report = tick(&mut self.state, &input);
            self.last_tick_moved = report.player_moved;
            for event in report.events {
                self.route(&event, now_ms);
                if self.audio.is_muted() && matches!(event, GameEvent::Sound(_)) {
                    continue;
                }
                events.push(event);
            }
            if report.game_over {
                self.reset()?;
                self.last_tick_moved = false;
            }
            self.scheduler.complete(now_ms);
        }
        if !self.is_paused() {
            self.animation.update(now_ms, self.last_tick_moved);
        }
        Ok(events)
    }

    /// Persist whatever an event changes in the profile
    fn route(&mut self, event: &GameEvent, now_ms: f64) {
        let result = match *event {
            GameEvent::Delivered { score, .. } => {
                self.profile
                    .record_delivery(&mut self.store, COINS_PER_DELIVERY, score)
            }
            GameEvent::GameOver { score } => {
                let timestamp = self.epoch_ms + now_ms.max(0.0) as u64;
                self.profile
                    .record_game_over(&mut self.store, timestamp, score)
                    .map(|key| log::info!("Queued score {} under {}", score, key))
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            log::warn!("Profile not saved: {}", e);
        }
    }

    /// Start over in a brand new town
    fn reset(&mut self) -> Result<(), SimError> {
        let tuning = self.state.tuning.clone();
        let mut attempt = 1;
        loop {
            let seed = self.state.next_seed();
            match SimulationState::new(tuning.clone(), seed) {
                Ok(state) => {
                    self.state = state;
                    self.sessions_played += 1;
                    return Ok(());
                }
                Err(e) if attempt < RESET_ATTEMPTS => {
                    log::warn!("Town generation failed for seed {}: {}", seed, e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn pause(&mut self, now_ms: f64) {
        if !self.is_paused() {
            self.scheduler.pause(now_ms);
            log::info!("Paused");
        }
    }

    pub fn resume(&mut self, now_ms: f64) {
        if self.is_paused() {
            self.scheduler.resume(now_ms);
            log::info!("Resumed");
        }
    }

    pub fn toggle_pause(&mut self, now_ms: f64) -> bool {
        self.scheduler.toggle(now_ms)
    }

    /// Window lost focus: drop held input and pause if configured to
    pub fn blur(&mut self, now_ms: f64) {
        self.input.clear();
        if self.settings.pause_on_blur {
            self.pause(now_ms);
        }
    }

    /// Flip mute and remember the choice
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.audio.toggle_mute();
        self.settings.muted = muted;
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Settings not saved: {}", e);
        }
        muted
    }

    /// Key press from the frontend; pause and mute apply immediately
    pub fn key_down(&mut self, key: &str, now_ms: f64) -> Option<Command> {
        let command = self.input.key_down(key)?;
        match command {
            Command::TogglePause => {
                self.toggle_pause(now_ms);
            }
            Command::ToggleMute => {
                self.toggle_mute();
            }
        }
        Some(command)
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// Try to submit queued scores; whatever fails stays queued
    pub fn flush_scores<T: ScoreService + ?Sized>(&mut self, service: &mut T) -> FlushReport {
        let report = flush_unsubmitted(&mut self.profile.unsubmitted, service);
        if report.submitted > 0 {
            if let Err(e) = self.profile.save_unsubmitted(&mut self.store) {
                log::warn!("Score queue not saved: {}", e);
            }
        }
        report
    }

    /// A submission made outside [`Self::flush_scores`] was confirmed
    pub fn confirm_submitted(&mut self, timestamp_ms: u64) -> bool {
        if self.profile.unsubmitted.remove(timestamp_ms).is_none() {
            return false;
        }
        if let Err(e) = self.profile.save_unsubmitted(&mut self.store) {
            log::warn!("Score queue not saved: {}", e);
        }
        true
    }

    pub fn buy(&mut self, kind: ItemKind) -> Result<(), StoreError> {
        house::buy(&mut self.profile, &mut self.store, kind)
    }

    pub fn place(&mut self, kind: ItemKind, x: f32, y: f32) -> Result<(), StoreError> {
        house::place(&mut self.profile, &mut self.store, kind, x, y)
    }

    pub fn pick_up(&mut self, x: f32, y: f32) -> Result<ItemKind, StoreError> {
        house::pick_up(&mut self.profile, &mut self.store, x, y)
    }

    pub fn save_settings(&mut self, settings: Settings) -> Result<(), PersistError> {
        self.audio = settings.audio();
        self.settings = settings;
        self.settings.save(&mut self.store)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let state = &self.state;
        let invincible = state.is_invincible();
        RenderSnapshot {
            player: state.player.bounds,
            facing_left: state.player.facing_left,
            flying: state.player.flying,
            frame: self.animation.frame(),
            invincible,
            flashing: invincible && self.settings.effective_flashing(),
            health: state.player.health,
            score: state.player.score,
            high_score: self.profile.high_score,
            coins: self.profile.coins,
            level: state.difficulty.level,
            target_door: state
                .target
                .and_then(|i| state.world.buildings.get(i))
                .map(|b| b.door.bounds),
            enemies: state
                .enemies
                .iter()
                .map(|e| (e.bounds, e.is_chasing()))
                .collect(),
            powerups: state.powerups.iter().map(|p| (p.bounds, p.kind)).collect(),
            paused: self.is_paused(),
            volume: self.audio.gain(),
            show_touch_controls: self.settings.show_touch_controls,
        }
    }
}
