use crate::playlist::Playlist;
use crate::presets::default_break_activities;
use crate::store::AppState;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Current version of the persisted snapshot schema.
pub const SCHEMA_VERSION: u32 = 2;

/// Versioned envelope wrapped around every snapshot, on disk and in
/// exported backups.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub state: Value,
}

/// Migrations run in ascending order; each entry applies to snapshots
/// written at or below its version. Every transform is total over its
/// input: unexpected shapes are left alone and the trailing deep-merge
/// against defaults backfills whatever is still missing.
const MIGRATIONS: &[(u32, fn(&mut Value))] = &[(1, migrate_v1_to_v2)];

/// v1 predates the work/break playlist archives, break activities, the
/// focus goal and the login/modal flags.
fn migrate_v1_to_v2(state: &mut Value) {
    let Some(obj) = state.as_object_mut() else {
        return;
    };
    let empty_playlist = serde_json::to_value(Playlist::default()).unwrap_or(Value::Null);
    obj.entry("workPlaylist").or_insert(empty_playlist.clone());
    obj.entry("breakPlaylist").or_insert(empty_playlist);
    obj.entry("breakActivities").or_insert_with(|| {
        serde_json::to_value(default_break_activities()).unwrap_or(Value::Null)
    });
}

/// Strict form: runs the version transforms, then requires the result to
/// deserialize into the current state shape. Imports use this so a bad
/// backup is rejected instead of silently replacing the user's data.
pub fn try_migrate(envelope: Envelope) -> serde_json::Result<AppState> {
    let mut state = envelope.state;
    for (version, transform) in MIGRATIONS {
        if envelope.version <= *version {
            transform(&mut state);
        }
    }
    serde_json::from_value(state)
}

/// Lenient form for startup loads. Never fails: missing fields fall back
/// to their defaults via the serde `default` attributes on `AppState`,
/// and an unreadable snapshot starts fresh with a warning.
pub fn migrate(envelope: Envelope) -> AppState {
    match try_migrate(envelope) {
        Ok(state) => state,
        Err(e) => {
            warn!("Snapshot did not deserialize cleanly, using defaults: {}", e);
            AppState::default()
        }
    }
}

pub fn snapshot(state: &AppState) -> serde_json::Result<Envelope> {
    Ok(Envelope {
        version: SCHEMA_VERSION,
        state: serde_json::to_value(state)?,
    })
}

/// File-backed store for the coordinator snapshot. Written after every
/// mutation; write failures are logged and never surface into the
/// mutation path.
pub struct Storage {
    path: Option<PathBuf>,
}

impl Storage {
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// No backing file; loads yield defaults and saves are dropped.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn load(&self) -> AppState {
        let Some(path) = &self.path else {
            return AppState::default();
        };
        if !path.exists() {
            return AppState::default();
        }
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return AppState::default();
            }
        };
        match serde_json::from_str::<Envelope>(&raw) {
            Ok(envelope) => migrate(envelope),
            Err(e) => {
                warn!("Stored snapshot is not valid JSON, starting fresh: {}", e);
                AppState::default()
            }
        }
    }

    pub fn save(&self, state: &AppState) {
        let Some(path) = &self.path else {
            return;
        };
        let envelope = match snapshot(state) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Failed to serialize snapshot: {}", e);
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        let json = match serde_json::to_string_pretty(&envelope) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            warn!("Failed to write {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Session;
    use serde_json::json;

    #[test]
    fn v1_snapshot_backfills_archives_and_activities() {
        let envelope = Envelope {
            version: 1,
            state: json!({
                "isRunning": false,
                "currentSession": "break",
                "timeRemaining": 120,
                "pomodoroSettings": {
                    "workDuration": 600,
                    "breakDuration": 120,
                    "longBreakDuration": 900,
                    "longBreakInterval": 4
                },
                "pomodoroStats": { "totalMinutesToday": 50, "sessionsCompleted": 2 },
                "tasks": [ { "id": "t1", "text": "write report", "completed": true } ],
                "playlist": {
                    "items": [ { "id": "abc", "title": "Song", "duration": "3m", "thumbnail": "" } ],
                    "currentIndex": 0,
                    "isPlaying": false,
                    "volume": 55,
                    "audioOnly": true,
                    "shuffle": false,
                    "repeat": true
                }
            }),
        };

        let state = migrate(envelope);

        // Pre-existing fields survive untouched.
        assert_eq!(state.current_session, Session::Break);
        assert_eq!(state.time_remaining, 120);
        assert_eq!(state.pomodoro_settings.work_duration, 600);
        assert_eq!(state.pomodoro_stats.total_minutes_today, 50);
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.playlist.volume, 55);
        assert!(state.playlist.audio_only);
        assert!(state.playlist.repeat);

        // Fields introduced in v2 get their documented defaults.
        assert_eq!(state.work_playlist, Playlist::default());
        assert_eq!(state.break_playlist, Playlist::default());
        assert_eq!(state.break_activities, default_break_activities());
        assert_eq!(state.focus_goal, Default::default());
        assert!(!state.is_logged_in);
        assert!(!state.is_focus_goal_modal_open);
    }

    #[test]
    fn migration_is_total_over_garbage_input() {
        let state = migrate(Envelope {
            version: 1,
            state: json!("not even an object"),
        });
        assert_eq!(state, AppState::default());

        let state = migrate(Envelope {
            version: 2,
            state: json!({ "timeRemaining": "twelve" }),
        });
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn strict_migration_rejects_what_the_lenient_one_defaults() {
        assert!(try_migrate(Envelope {
            version: 2,
            state: json!({ "timeRemaining": "twelve" }),
        })
        .is_err());

        assert!(try_migrate(Envelope {
            version: 1,
            state: json!("not even an object"),
        })
        .is_err());
    }

    #[test]
    fn current_version_passes_through_without_transforms() {
        let mut expected = AppState::default();
        expected.pomodoro_stats.sessions_completed = 7;
        let envelope = snapshot(&expected).unwrap();
        assert_eq!(envelope.version, SCHEMA_VERSION);
        assert_eq!(migrate(envelope), expected);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path().join("focus-app-storage.json"));

        let mut state = AppState::default();
        state.time_remaining = 42;
        state.is_logged_in = true;
        storage.save(&state);

        assert_eq!(storage.load(), state);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path().join("nope.json"));
        assert_eq!(storage.load(), AppState::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus-app-storage.json");
        std::fs::write(&path, "{ definitely not json").unwrap();
        assert_eq!(Storage::at(path).load(), AppState::default());
    }
}
