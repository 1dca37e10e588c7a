use serde::{Deserialize, Serialize};

/// One timer phase. A break subsumes both short and long breaks; the
/// duration is chosen at transition time, not by a separate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    Work,
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomodoroSettings {
    pub work_duration: u32,       // seconds
    pub break_duration: u32,      // seconds
    pub long_break_duration: u32, // seconds
    pub long_break_interval: u32, // completed work sessions between long breaks
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: 25 * 60,
            break_duration: 5 * 60,
            long_break_duration: 15 * 60,
            long_break_interval: 4,
        }
    }
}

impl PomodoroSettings {
    pub fn duration_for(&self, session: Session) -> u32 {
        match session {
            Session::Work => self.work_duration,
            Session::Break => self.break_duration,
        }
    }

    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.work_duration {
            self.work_duration = v;
        }
        if let Some(v) = patch.break_duration {
            self.break_duration = v;
        }
        if let Some(v) = patch.long_break_duration {
            self.long_break_duration = v;
        }
        if let Some(v) = patch.long_break_interval {
            self.long_break_interval = v;
        }
    }
}

/// Partial settings update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub work_duration: Option<u32>,
    pub break_duration: Option<u32>,
    pub long_break_duration: Option<u32>,
    pub long_break_interval: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomodoroStats {
    pub total_minutes_today: u32,
    pub sessions_completed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusGoal {
    pub main_goal: String,
    pub how_to_achieve: String,
}

impl FocusGoal {
    pub fn is_set(&self) -> bool {
        !self.main_goal.trim().is_empty()
    }
}

/// The declared edge taken when a session's countdown expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnd {
    pub next: Session,
    pub next_duration: u32,
    /// Work flows straight into its break; a finished break waits for the
    /// user to start the next work session.
    pub auto_start: bool,
    pub completed_work: bool,
}

/// Transition table for the work/break state machine.
///
/// `sessions_completed_after` is the completed-work-session count *after*
/// accounting for the session that just ended; every
/// `long_break_interval`-th completed work session earns the long break.
pub fn session_end(
    current: Session,
    settings: &PomodoroSettings,
    sessions_completed_after: u32,
) -> SessionEnd {
    match current {
        Session::Work => {
            // An interval of zero disables long breaks entirely.
            let interval = settings.long_break_interval;
            let next_duration = if interval > 0 && sessions_completed_after % interval == 0 {
                settings.long_break_duration
            } else {
                settings.break_duration
            };
            SessionEnd {
                next: Session::Break,
                next_duration,
                auto_start: true,
                completed_work: true,
            }
        }
        Session::Break => SessionEnd {
            next: Session::Work,
            next_duration: settings.work_duration,
            auto_start: false,
            completed_work: false,
        },
    }
}
