use crate::player::{PlayerCommand, PlayerEvent, PlayerHandle};
use crate::playlist::Playlist;
use crate::presets::{default_break_activities, BreakActivity, BreakCategory};
use crate::storage::{self, Storage};
use crate::timer::{
    session_end, FocusGoal, PomodoroSettings, PomodoroStats, Session, SettingsPatch,
};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::AbortHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// Everything the coordinator persists: the full serializable snapshot,
/// transient UI intent included. The live ticker handle lives outside
/// this struct on purpose so a snapshot can never describe a callback
/// that no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub is_running: bool,
    pub current_session: Session,
    pub time_remaining: u32,
    pub pomodoro_settings: PomodoroSettings,
    pub pomodoro_stats: PomodoroStats,
    pub focus_goal: FocusGoal,
    pub tasks: Vec<Task>,
    /// The playlist bound to the player right now.
    pub playlist: Playlist,
    /// Archived slots, swapped with the active playlist on session edges.
    pub work_playlist: Playlist,
    pub break_playlist: Playlist,
    pub break_activities: Vec<BreakActivity>,
    pub is_logged_in: bool,
    pub is_focus_goal_modal_open: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let pomodoro_settings = PomodoroSettings::default();
        Self {
            is_running: false,
            current_session: Session::Work,
            time_remaining: pomodoro_settings.work_duration,
            pomodoro_settings,
            pomodoro_stats: PomodoroStats::default(),
            focus_goal: FocusGoal::default(),
            tasks: Vec::new(),
            playlist: Playlist::default(),
            work_playlist: Playlist::default(),
            break_playlist: Playlist::default(),
            break_activities: default_break_activities(),
            is_logged_in: false,
            is_focus_goal_modal_open: false,
        }
    }
}

/// What the recurring one-second callback should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    KeepRunning,
    Stop,
}

/// Process-local handle for the recurring countdown task. At most one of
/// these is ever live; it is never persisted.
pub struct TickerHandle {
    abort: AbortHandle,
}

impl TickerHandle {
    fn cancel(self) {
        self.abort.abort();
    }
}

pub type SharedStore = Arc<Mutex<Store>>;

/// The session coordinator: sole owner and writer of all application
/// state. Every public operation is one atomic update followed by a
/// persistence write; playback commands go out fire-and-forget.
pub struct Store {
    state: AppState,
    storage: Storage,
    player: PlayerHandle,
    ticker: Option<TickerHandle>,
}

impl Store {
    pub fn new(state: AppState, storage: Storage, player: PlayerHandle) -> Self {
        Self {
            state,
            storage,
            player,
            ticker: None,
        }
    }

    /// Restores the snapshot from storage. The ticker handle starts out
    /// empty regardless of what `is_running` says in the snapshot.
    pub fn load(storage: Storage, player: PlayerHandle) -> Self {
        let state = storage.load();
        info!(
            "Loaded state: session {:?}, {} tasks, {} tracks in the active playlist",
            state.current_session,
            state.tasks.len(),
            state.playlist.items.len()
        );
        Self::new(state, storage, player)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn persist(&self) {
        self.storage.save(&self.state);
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    // ---- timer operations ----

    /// Marks the session running and kicks off playback when there is
    /// anything to play. Shared by `start` and the work -> break edge.
    fn begin_running(&mut self) {
        self.state.is_running = true;
        if !self.state.playlist.is_empty() {
            self.state.playlist.is_playing = true;
            self.player.send(PlayerCommand::Play);
        }
    }

    /// Returns whether the caller must install a fresh ticker. A no-op
    /// when the countdown is already running with a live handle, so two
    /// starts in a row never stack callbacks.
    pub fn start(&mut self) -> bool {
        if self.state.is_running && self.ticker.is_some() {
            return false;
        }
        // A stale handle without the running flag (or vice versa) gets
        // replaced rather than duplicated.
        self.cancel_ticker();
        self.begin_running();
        self.persist();
        true
    }

    pub fn attach_ticker(&mut self, abort: AbortHandle) {
        self.ticker = Some(TickerHandle { abort });
    }

    pub fn pause(&mut self) {
        self.cancel_ticker();
        self.state.is_running = false;
        self.state.playlist.is_playing = false;
        self.player.send(PlayerCommand::Pause);
        self.persist();
    }

    /// Restores the countdown to the configured duration of the current
    /// session type without changing the session.
    pub fn reset(&mut self) {
        self.cancel_ticker();
        self.state.is_running = false;
        self.state.time_remaining = self
            .state
            .pomodoro_settings
            .duration_for(self.state.current_session);
        self.state.playlist.is_playing = false;
        self.player.send(PlayerCommand::Pause);
        self.persist();
    }

    /// Merges the patch, stops the countdown and recomputes the remaining
    /// time from the (possibly changed) duration of the current session
    /// type. The user must restart explicitly.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.cancel_ticker();
        self.state.pomodoro_settings.apply(&patch);
        self.state.time_remaining = self
            .state
            .pomodoro_settings
            .duration_for(self.state.current_session);
        self.state.is_running = false;
        self.persist();
    }

    /// One second of countdown. Decrements until the clock shows zero;
    /// the tick after that takes exactly one transition from the edge
    /// table, never both in the same invocation.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running {
            // A tick that raced a pause or settings change.
            return TickOutcome::Stop;
        }
        if self.state.time_remaining > 0 {
            self.state.time_remaining -= 1;
            self.persist();
            return TickOutcome::KeepRunning;
        }

        let ending = self.state.current_session;
        let end = session_end(
            ending,
            &self.state.pomodoro_settings,
            // Counting the session that is ending right now.
            self.state.pomodoro_stats.sessions_completed + 1,
        );
        if end.completed_work {
            let minutes = self.state.pomodoro_settings.work_duration / 60;
            self.state.pomodoro_stats.total_minutes_today += minutes;
            self.state.pomodoro_stats.sessions_completed += 1;
            self.state.focus_goal = FocusGoal::default();
        }
        info!(
            "Session {:?} finished, next {:?} for {}s (auto start: {})",
            ending, end.next, end.next_duration, end.auto_start
        );

        match ending {
            Session::Work => {
                // The active playlist becomes sticky to work mode; break
                // gets its own archived playlist or an empty default.
                self.state.work_playlist = self.state.playlist.clone();
                self.state.playlist = if !self.state.break_playlist.is_empty() {
                    self.state.break_playlist.clone()
                } else {
                    Playlist::default()
                };
            }
            Session::Break => {
                if !self.state.work_playlist.is_empty() {
                    self.state.playlist = self.state.work_playlist.clone();
                }
            }
        }
        self.state.playlist.is_playing = false;
        self.state.current_session = end.next;
        self.state.time_remaining = end.next_duration;
        self.state.is_running = false;

        if end.auto_start {
            self.begin_running();
            if self.state.playlist.is_empty() {
                // Nothing to play in this session; the widget still has
                // the old material loaded and must be told to stop.
                self.player.send(PlayerCommand::Pause);
            }
            self.persist();
            TickOutcome::KeepRunning
        } else {
            self.ticker = None; // the callback exits after this tick
            self.player.send(PlayerCommand::Pause);
            self.persist();
            TickOutcome::Stop
        }
    }

    // ---- focus goal ----

    pub fn set_focus_goal(&mut self, goal: FocusGoal) {
        self.state.focus_goal = goal;
        self.persist();
    }

    pub fn toggle_focus_goal_modal(&mut self, open: bool) {
        self.state.is_focus_goal_modal_open = open;
        self.persist();
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.state.is_logged_in = logged_in;
        self.persist();
    }

    // ---- tasks ----

    pub fn add_task(&mut self, text: &str) {
        self.state.tasks.push(Task {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
        });
        self.persist();
    }

    pub fn toggle_task(&mut self, id: &str) {
        if let Some(task) = self.state.tasks.iter_mut().find(|t| t.id == id) {
            task.completed = !task.completed;
        }
        self.persist();
    }

    pub fn delete_task(&mut self, id: &str) {
        self.state.tasks.retain(|t| t.id != id);
        self.persist();
    }

    // ---- break activities ----

    pub fn add_break_activity(&mut self, category: BreakCategory, duration: u32, description: &str) {
        self.state.break_activities.push(BreakActivity {
            id: Uuid::new_v4().to_string(),
            category,
            duration,
            description: description.to_string(),
        });
        self.persist();
    }

    pub fn delete_break_activity(&mut self, id: &str) {
        self.state.break_activities.retain(|a| a.id != id);
        self.persist();
    }

    pub fn reset_break_activities(&mut self) {
        self.state.break_activities = default_break_activities();
        self.persist();
    }

    // ---- playlist ----

    /// Replaces the active playlist wholesale and snapshots it into the
    /// archive slot of whichever session is active right now.
    pub fn set_playlist(&mut self, playlist: Playlist) {
        match self.state.current_session {
            Session::Work => self.state.work_playlist = playlist.clone(),
            Session::Break => self.state.break_playlist = playlist.clone(),
        }
        let volume = playlist.volume;
        let play = playlist.is_playing && !playlist.is_empty();
        self.state.playlist = playlist;
        self.player.send(PlayerCommand::SetVolume(volume));
        if play {
            self.player.send(PlayerCommand::Play);
        }
        self.persist();
    }

    /// While shuffled, picking any track reshuffles the whole list and
    /// restarts from the top; the index argument only matters otherwise.
    pub fn set_current_video(&mut self, index: usize) {
        if self.state.playlist.shuffle {
            self.state.playlist.shuffle_in_place();
        } else {
            self.state.playlist.current_index = index;
        }
        self.persist();
    }

    pub fn set_is_playing(&mut self, playing: bool) {
        self.state.playlist.is_playing = playing;
        self.player.send(if playing {
            PlayerCommand::Play
        } else {
            PlayerCommand::Pause
        });
        self.persist();
    }

    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.state.playlist.volume = volume;
        self.player.send(PlayerCommand::SetVolume(volume));
        self.persist();
    }

    pub fn set_audio_only(&mut self, audio_only: bool) {
        self.state.playlist.audio_only = audio_only;
        self.persist();
    }

    /// Turning shuffle on materializes a shuffled permutation in place.
    /// Turning it off keeps that order; only the flag and cursor reset.
    pub fn toggle_shuffle(&mut self) {
        if !self.state.playlist.shuffle {
            self.state.playlist.shuffle_in_place();
            self.state.playlist.shuffle = true;
        } else {
            self.state.playlist.shuffle = false;
            self.state.playlist.current_index = 0;
        }
        self.persist();
    }

    pub fn toggle_repeat(&mut self) {
        self.state.playlist.repeat = !self.state.playlist.repeat;
        self.persist();
    }

    pub fn previous_track(&mut self) {
        if self.state.playlist.current_index > 0 {
            let index = self.state.playlist.current_index - 1;
            self.set_current_video(index);
        }
    }

    /// Advances the cursor, or stops at the end of the list. No wrap.
    pub fn next_track(&mut self) {
        let len = self.state.playlist.items.len();
        if len == 0 {
            return;
        }
        if self.state.playlist.current_index + 1 < len {
            let index = self.state.playlist.current_index + 1;
            self.set_current_video(index);
        } else {
            self.set_is_playing(false);
        }
    }

    /// Inbound notifications from the embedded player. These may arrive
    /// at any time relative to ticks and are idempotent on state.
    pub fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready => {
                self.player
                    .send(PlayerCommand::SetVolume(self.state.playlist.volume));
                if self.state.playlist.is_playing {
                    self.player.send(PlayerCommand::Play);
                }
            }
            PlayerEvent::StateChanged(playing) => {
                self.state.playlist.is_playing = playing;
                self.persist();
            }
            PlayerEvent::Ended => {
                // An "ended" that arrives after a manual pause is stale
                // and must not advance anything.
                if !self.state.playlist.is_playing {
                    debug!("Ignoring end-of-track while paused");
                    return;
                }
                if self.state.playlist.repeat {
                    self.player.send(PlayerCommand::SeekToStart);
                    self.player.send(PlayerCommand::Play);
                } else {
                    self.next_track();
                }
            }
        }
    }

    // ---- data management ----

    /// Back to defaults, keeping only the user's pomodoro durations and
    /// reseeding the break activity menus.
    pub fn clear_all_data(&mut self) {
        self.cancel_ticker();
        let settings = self.state.pomodoro_settings.clone();
        self.state = AppState {
            time_remaining: settings.work_duration,
            pomodoro_settings: settings,
            ..AppState::default()
        };
        self.player.send(PlayerCommand::Pause);
        self.persist();
        info!("Cleared all data");
    }

    /// Serializes the whole snapshot, transient fields included, in the
    /// same envelope shape the persistence layer writes.
    pub fn export_json(&self) -> Result<String> {
        let envelope = storage::snapshot(&self.state).context("Failed to serialize state")?;
        serde_json::to_string_pretty(&envelope).context("Failed to serialize state")
    }

    /// Wholesale state replacement from a backup. A snapshot that does
    /// not parse, envelope or contents, leaves the current state
    /// untouched.
    pub fn import_json(&mut self, raw: &str) -> Result<()> {
        let envelope: storage::Envelope =
            serde_json::from_str(raw).context("Not a valid Focus DJ backup")?;
        let state = storage::try_migrate(envelope)
            .context("Backup does not match any supported schema")?;
        self.cancel_ticker();
        self.state = state;
        self.persist();
        info!("Imported backup snapshot");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }
}

/// Installs the recurring one-second callback for a shared store. The
/// `start` guard ensures at most one live callback; the spawned task
/// exits on its own when a tick reports `Stop` and dies with the handle
/// when anything aborts it.
pub fn start_timer(store: &SharedStore) {
    let needs_ticker = match store.lock() {
        Ok(mut s) => s.start(),
        Err(_) => return,
    };
    if !needs_ticker {
        return;
    }

    let weak = Arc::downgrade(store);
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately; the countdown starts one
        // second from now.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(store) = weak.upgrade() else {
                break;
            };
            let outcome = match store.lock() {
                Ok(mut s) => s.tick(),
                Err(_) => break,
            };
            if outcome == TickOutcome::Stop {
                break;
            }
        }
    });

    if let Ok(mut s) = store.lock() {
        s.attach_ticker(task.abort_handle());
    }
}

/// Feeds player notifications into the coordinator for as long as both
/// the store and the event source are alive.
pub fn spawn_event_pump(store: &SharedStore, mut events: UnboundedReceiver<PlayerEvent>) {
    let weak = Arc::downgrade(store);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(store) = weak.upgrade() else {
                break;
            };
            let mut s = match store.lock() {
                Ok(s) => s,
                Err(_) => break,
            };
            s.handle_player_event(event);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::Track;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {}", id),
            duration: "3m 0s".to_string(),
            thumbnail: String::new(),
        }
    }

    fn tracks(n: usize) -> Vec<Track> {
        (0..n).map(|i| track(&i.to_string())).collect()
    }

    fn test_store() -> Store {
        Store::new(AppState::default(), Storage::disabled(), PlayerHandle::detached())
    }

    /// Runs ticks until the pending transition has fired once.
    fn finish_session(store: &mut Store) {
        store.state_mut().time_remaining = 0;
        store.tick();
    }

    #[test]
    fn ticks_decrement_by_exactly_one_until_zero() {
        let mut store = test_store();
        store.update_settings(SettingsPatch {
            work_duration: Some(3),
            ..Default::default()
        });
        store.start();

        assert_eq!(store.state().time_remaining, 3);
        for expected in [2, 1, 0] {
            assert_eq!(store.tick(), TickOutcome::KeepRunning);
            assert_eq!(store.state().time_remaining, expected);
            assert_eq!(store.state().current_session, Session::Work);
        }

        // The tick after zero takes exactly one transition.
        assert_eq!(store.tick(), TickOutcome::KeepRunning);
        assert_eq!(store.state().current_session, Session::Break);
        assert_eq!(
            store.state().time_remaining,
            store.state().pomodoro_settings.break_duration
        );
    }

    #[test]
    fn work_completion_accrues_stats_and_clears_the_goal() {
        let mut store = test_store();
        store.set_focus_goal(FocusGoal {
            main_goal: "Ship the report".to_string(),
            how_to_achieve: "One section at a time".to_string(),
        });
        assert_eq!(store.state().pomodoro_settings.work_duration, 1500);

        store.start();
        finish_session(&mut store);

        assert_eq!(store.state().pomodoro_stats.total_minutes_today, 25);
        assert_eq!(store.state().pomodoro_stats.sessions_completed, 1);
        assert!(!store.state().focus_goal.is_set());
        // Work flows straight into the break.
        assert_eq!(store.state().current_session, Session::Break);
        assert!(store.state().is_running);
    }

    #[test]
    fn break_completion_changes_no_stats_and_waits_for_the_user() {
        let mut store = test_store();
        store.start();
        finish_session(&mut store); // work -> break
        let stats = store.state().pomodoro_stats.clone();

        store.state_mut().time_remaining = 0;
        assert_eq!(store.tick(), TickOutcome::Stop);

        assert_eq!(store.state().pomodoro_stats, stats);
        assert_eq!(store.state().current_session, Session::Work);
        assert_eq!(
            store.state().time_remaining,
            store.state().pomodoro_settings.work_duration
        );
        assert!(!store.state().is_running);
    }

    #[test]
    fn long_break_every_fourth_completed_session() {
        let mut store = test_store();
        let settings = store.state().pomodoro_settings.clone();

        for completed in 1..=8 {
            store.start();
            finish_session(&mut store); // work -> break
            let expected = if completed % settings.long_break_interval == 0 {
                settings.long_break_duration
            } else {
                settings.break_duration
            };
            assert_eq!(store.state().time_remaining, expected, "break {}", completed);
            finish_session(&mut store); // break -> work
        }
    }

    #[test]
    fn playlist_archiving_round_trips_across_a_full_cycle() {
        let mut store = test_store();
        let mut work = Playlist::from_tracks(tracks(5));
        work.current_index = 3;
        work.repeat = true;
        work.volume = 40;
        store.set_playlist(work.clone());

        // Give the break its own playlist so the swap is observable.
        store.state_mut().break_playlist = Playlist::from_tracks(tracks(2));

        store.start();
        finish_session(&mut store); // work -> break
        assert_eq!(store.state().playlist.items, tracks(2));

        finish_session(&mut store); // break -> work

        let restored = &store.state().playlist;
        assert_eq!(restored.items, work.items);
        assert_eq!(restored.current_index, work.current_index);
        assert_eq!(restored.repeat, work.repeat);
        assert_eq!(restored.volume, work.volume);
        assert_eq!(restored.audio_only, work.audio_only);
        assert_eq!(restored.shuffle, work.shuffle);
    }

    #[test]
    fn leaving_work_without_a_break_playlist_swaps_in_an_empty_default() {
        let mut store = test_store();
        store.set_playlist(Playlist::from_tracks(tracks(3)));

        store.start();
        finish_session(&mut store);

        assert!(store.state().playlist.is_empty());
        assert_eq!(store.state().work_playlist.items, tracks(3));
    }

    #[test]
    fn entering_a_break_with_no_music_commands_the_widget_to_pause() {
        let (player, mut commands) = PlayerHandle::new();
        let mut store = Store::new(AppState::default(), Storage::disabled(), player);
        store.set_playlist(Playlist::from_tracks(tracks(3)));
        store.start();
        while commands.try_recv().is_ok() {}

        store.state_mut().time_remaining = 0;
        store.tick(); // work -> break with an empty break playlist

        assert!(!store.state().playlist.is_playing);
        let mut saw_pause = false;
        while let Ok(command) = commands.try_recv() {
            if command == PlayerCommand::Pause {
                saw_pause = true;
            }
        }
        assert!(saw_pause);
    }

    #[test]
    fn set_playlist_archives_into_the_slot_of_the_active_session() {
        let mut store = test_store();
        store.set_playlist(Playlist::from_tracks(tracks(3)));
        assert_eq!(store.state().work_playlist.items, tracks(3));
        assert!(store.state().break_playlist.is_empty());

        store.start();
        finish_session(&mut store); // now in break
        store.set_playlist(Playlist::from_tracks(tracks(7)));
        assert_eq!(store.state().break_playlist.items, tracks(7));
        assert_eq!(store.state().work_playlist.items, tracks(3));
    }

    #[test]
    fn update_settings_stops_the_countdown_without_autostart() {
        let mut store = test_store();
        store.start();
        store.tick();
        assert!(store.state().is_running);

        store.update_settings(SettingsPatch {
            work_duration: Some(600),
            ..Default::default()
        });

        assert!(!store.state().is_running);
        assert_eq!(store.state().time_remaining, 600);
        // A stale tick that slipped past the cancellation is inert.
        assert_eq!(store.tick(), TickOutcome::Stop);
        assert_eq!(store.state().time_remaining, 600);
    }

    #[test]
    fn settings_change_during_break_uses_the_break_duration() {
        let mut store = test_store();
        store.start();
        finish_session(&mut store); // -> break
        store.update_settings(SettingsPatch {
            break_duration: Some(90),
            ..Default::default()
        });
        assert_eq!(store.state().current_session, Session::Break);
        assert_eq!(store.state().time_remaining, 90);
    }

    #[test]
    fn reset_restores_the_current_session_duration() {
        let mut store = test_store();
        store.start();
        store.tick();
        store.tick();
        store.reset();
        assert!(!store.state().is_running);
        assert_eq!(
            store.state().time_remaining,
            store.state().pomodoro_settings.work_duration
        );
        assert_eq!(store.state().current_session, Session::Work);
    }

    #[test]
    fn shuffle_off_keeps_the_shuffled_order() {
        let mut store = test_store();
        store.set_playlist(Playlist::from_tracks(tracks(20)));

        store.toggle_shuffle();
        assert!(store.state().playlist.shuffle);
        let shuffled = store.state().playlist.items.clone();

        store.toggle_shuffle();
        assert!(!store.state().playlist.shuffle);
        assert_eq!(store.state().playlist.current_index, 0);
        // Deliberately not restored to the original order.
        assert_eq!(store.state().playlist.items, shuffled);
    }

    #[test]
    fn selecting_a_track_while_shuffled_reshuffles_from_the_top() {
        let mut store = test_store();
        store.set_playlist(Playlist::from_tracks(tracks(10)));
        store.toggle_shuffle();

        store.set_current_video(6);
        assert_eq!(store.state().playlist.current_index, 0);

        store.toggle_shuffle(); // off
        store.set_current_video(6);
        assert_eq!(store.state().playlist.current_index, 6);
    }

    #[test]
    fn end_of_track_with_repeat_stays_on_the_same_track() {
        let mut store = test_store();
        let mut playlist = Playlist::from_tracks(tracks(3));
        playlist.repeat = true;
        playlist.is_playing = true;
        playlist.current_index = 1;
        store.set_playlist(playlist);

        store.handle_player_event(PlayerEvent::Ended);
        assert_eq!(store.state().playlist.current_index, 1);
        assert!(store.state().playlist.is_playing);
    }

    #[test]
    fn end_of_track_past_the_last_item_stops_instead_of_wrapping() {
        let mut store = test_store();
        let mut playlist = Playlist::from_tracks(tracks(3));
        playlist.is_playing = true;
        playlist.current_index = 1;
        store.set_playlist(playlist);

        store.handle_player_event(PlayerEvent::Ended);
        assert_eq!(store.state().playlist.current_index, 2);
        assert!(store.state().playlist.is_playing);

        store.handle_player_event(PlayerEvent::Ended);
        assert_eq!(store.state().playlist.current_index, 2);
        assert!(!store.state().playlist.is_playing);
    }

    #[test]
    fn stale_end_of_track_after_a_pause_does_not_advance() {
        let mut store = test_store();
        let mut playlist = Playlist::from_tracks(tracks(3));
        playlist.is_playing = true;
        store.set_playlist(playlist);
        store.set_is_playing(false);

        store.handle_player_event(PlayerEvent::Ended);
        assert_eq!(store.state().playlist.current_index, 0);
        assert!(!store.state().playlist.is_playing);
    }

    #[test]
    fn tasks_are_plain_crud() {
        let mut store = test_store();
        store.add_task("water the plants");
        store.add_task("file taxes");
        assert_eq!(store.state().tasks.len(), 2);

        let id = store.state().tasks[0].id.clone();
        store.toggle_task(&id);
        assert!(store.state().tasks[0].completed);
        store.toggle_task(&id);
        assert!(!store.state().tasks[0].completed);

        store.delete_task(&id);
        assert_eq!(store.state().tasks.len(), 1);
        assert_eq!(store.state().tasks[0].text, "file taxes");
    }

    #[test]
    fn break_activities_reset_to_the_seed_list() {
        let mut store = test_store();
        store.add_break_activity(BreakCategory::Restorative, 10, "Make some tea");
        let added = store.state().break_activities.last().unwrap().id.clone();
        store.delete_break_activity("energize-1");
        assert!(store.state().break_activities.iter().any(|a| a.id == added));

        store.reset_break_activities();
        assert_eq!(store.state().break_activities, default_break_activities());
    }

    #[test]
    fn clear_all_data_keeps_only_the_durations() {
        let mut store = test_store();
        store.update_settings(SettingsPatch {
            work_duration: Some(3000),
            ..Default::default()
        });
        store.add_task("something");
        store.set_playlist(Playlist::from_tracks(tracks(4)));
        store.set_logged_in(true);

        store.clear_all_data();

        assert_eq!(store.state().pomodoro_settings.work_duration, 3000);
        assert_eq!(store.state().time_remaining, 3000);
        assert!(store.state().tasks.is_empty());
        assert!(store.state().playlist.is_empty());
        assert!(!store.state().is_logged_in);
        assert_eq!(store.state().break_activities, default_break_activities());
    }

    #[test]
    fn export_then_import_is_identity_on_state() {
        let mut store = test_store();
        store.add_task("pack for the trip");
        store.set_playlist(Playlist::from_tracks(tracks(6)));
        store.set_volume(35);
        store.toggle_repeat();
        store.start();
        store.tick();
        let before = store.state().clone();

        let backup = store.export_json().unwrap();
        let mut restored = test_store();
        restored.import_json(&backup).unwrap();

        assert_eq!(restored.state(), &before);
    }

    #[test]
    fn malformed_import_leaves_state_untouched() {
        let mut store = test_store();
        store.add_task("keep me");
        let before = store.state().clone();

        assert!(store.import_json("{ not json").is_err());
        assert!(store.import_json("[1, 2, 3]").is_err());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn import_rejects_a_valid_envelope_with_malformed_contents() {
        let mut store = test_store();
        store.add_task("keep me");
        let before = store.state().clone();

        // The envelope parses but the inner state does not; the import
        // must fail rather than fall back to defaults.
        let raw = r#"{ "version": 2, "state": { "timeRemaining": "twelve" } }"#;
        assert!(store.import_json(raw).is_err());
        assert_eq!(store.state(), &before);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_installs_a_single_ticker() {
        let store: SharedStore = Arc::new(Mutex::new(test_store()));
        start_timer(&store);
        start_timer(&store); // must not stack a second callback

        // Let the spawned task consume its immediate first interval tick
        // before the clock moves.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        let before = store.lock().unwrap().state().time_remaining;
        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(1)).await;
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
        let after = store.lock().unwrap().state().time_remaining;
        // One callback decrements at most once per advanced second; a
        // stacked second callback would double the rate.
        let decrements = before - after;
        assert!(
            (2..=3).contains(&decrements),
            "{} decrements over 3 advanced seconds",
            decrements
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cancels_the_ticker() {
        let store: SharedStore = Arc::new(Mutex::new(test_store()));
        start_timer(&store);

        tokio::time::advance(Duration::from_secs(1)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        store.lock().unwrap().pause();
        let frozen = store.lock().unwrap().state().time_remaining;

        tokio::time::advance(Duration::from_secs(3)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.lock().unwrap().state().time_remaining, frozen);
        assert!(!store.lock().unwrap().state().is_running);
    }
}
