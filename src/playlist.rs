use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Track {
    pub id: String,
    pub title: String,
    /// Human-readable duration, e.g. "3m 45s".
    pub duration: String,
    pub thumbnail: String,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            duration: "Unknown".to_string(),
            thumbnail: String::new(),
        }
    }
}

/// One playlist context. The coordinator keeps three of these: the active
/// playlist bound to the player plus the archived work and break slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Playlist {
    pub items: Vec<Track>,
    pub current_index: usize,
    /// Playback intent, mirrored to the embedded player. Not ground truth.
    pub is_playing: bool,
    pub volume: u8,
    pub audio_only: bool,
    pub shuffle: bool,
    pub repeat: bool,
}

impl Default for Playlist {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_index: 0,
            is_playing: false,
            volume: 70,
            audio_only: false,
            shuffle: false,
            repeat: false,
        }
    }
}

impl Playlist {
    pub fn from_tracks(items: Vec<Track>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.items.get(self.current_index)
    }

    /// Fisher-Yates shuffle of the item list itself, cursor reset to the
    /// top. The previous order is not kept anywhere; turning shuffle off
    /// later leaves the permuted order in place.
    pub fn shuffle_in_place(&mut self) {
        self.items.shuffle(&mut rand::rng());
        self.current_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {}", id),
            duration: "3m 0s".to_string(),
            thumbnail: format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id),
        }
    }

    fn sample(n: usize) -> Playlist {
        Playlist::from_tracks((0..n).map(|i| track(&i.to_string())).collect())
    }

    #[test]
    fn shuffle_is_a_permutation_of_the_same_tracks() {
        let mut playlist = sample(20);
        playlist.current_index = 7;
        let mut before: Vec<String> = playlist.items.iter().map(|t| t.id.clone()).collect();

        playlist.shuffle_in_place();

        let mut after: Vec<String> = playlist.items.iter().map(|t| t.id.clone()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert_eq!(playlist.current_index, 0);
    }

    #[test]
    fn current_track_is_none_when_empty() {
        let playlist = Playlist::default();
        assert!(playlist.current_track().is_none());
        assert_eq!(playlist.volume, 70);
    }

    #[test]
    fn shuffling_an_empty_playlist_is_a_no_op() {
        let mut playlist = Playlist::default();
        playlist.shuffle_in_place();
        assert!(playlist.is_empty());
        assert_eq!(playlist.current_index, 0);
    }
}
