use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakCategory {
    Energizing,
    Restorative,
}

impl BreakCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BreakCategory::Energizing => "Energizing",
            BreakCategory::Restorative => "Restorative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakActivity {
    pub id: String,
    pub category: BreakCategory,
    /// Suggested length in minutes.
    pub duration: u32,
    pub description: String,
}

impl Default for BreakActivity {
    fn default() -> Self {
        Self {
            id: String::new(),
            category: BreakCategory::Energizing,
            duration: 5,
            description: String::new(),
        }
    }
}

fn activity(id: &str, category: BreakCategory, duration: u32, description: &str) -> BreakActivity {
    BreakActivity {
        id: id.to_string(),
        category,
        duration,
        description: description.to_string(),
    }
}

pub fn default_break_activities() -> Vec<BreakActivity> {
    use BreakCategory::{Energizing, Restorative};
    vec![
        activity("energize-1", Energizing, 5, "Quick Walk or Simple Chore"),
        activity("energize-2", Energizing, 5, "Hydrate & Move (stretch)"),
        activity("energize-3", Energizing, 5, "Doodle or listen to a song"),
        activity("energize-4", Energizing, 15, "Go for a proper walk"),
        activity("restore-1", Restorative, 5, "Connect with a pet"),
        activity("restore-2", Restorative, 5, "Review your long-term goals"),
        activity("restore-3", Restorative, 5, "Stand outside or by a window"),
        activity("restore-4", Restorative, 10, "Mindful listening with eyes closed"),
        activity("restore-5", Restorative, 20, "Take a strategic nap (set an alarm)"),
    ]
}

/// A curated playlist shown in the browse-categories panel.
#[derive(Debug, Clone)]
pub struct PlaylistCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub url: &'static str,
}

pub fn playlist_categories() -> Vec<PlaylistCategory> {
    vec![
        PlaylistCategory {
            name: "Lo-fi beats",
            description: "Perfect for chill studying",
            icon: "🌙",
            url: "https://music.youtube.com/channel/UCkXd-JReGCj32ZjQVywYUqw",
        },
        PlaylistCategory {
            name: "Hardstyle",
            description: "Perfect for high energy workouts",
            icon: "⚡",
            url: "https://music.youtube.com/channel/UCostFi-t69RswIeX3w1EZnA",
        },
        PlaylistCategory {
            name: "Aesthetic Beats",
            description: "Perfect for upbeat studying",
            icon: "😎",
            url: "https://www.youtube.com/playlist?list=PL1oyW7M3mIp8lwCAvchxWdUATSzl09rdv",
        },
        PlaylistCategory {
            name: "Drum and Bass",
            description: "Perfect for upbeat studying",
            icon: "🥁",
            url: "https://www.youtube.com/playlist?list=PLwi8dzVzBhPUzCa1klpaLQer0qMs9rY3M",
        },
        PlaylistCategory {
            name: "Hard Techno",
            description: "Perfect for loud studying",
            icon: "☢",
            url: "https://www.youtube.com/playlist?list=PLWIwHErYlmlrklTcqynBBrBd1Bkn2hpaH",
        },
        PlaylistCategory {
            name: "Classical",
            description: "Perfect for focused studying",
            icon: "🎻",
            url: "https://music.youtube.com/playlist?list=OLAK5uy_m7p7tqwzdAJVSJYc8Q3l-UVpmjJjPV9zc",
        },
    ]
}
