use crate::playlist::Track;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// What can go wrong fetching tracks. Resolved to a user-facing message
/// at the call site that asked for the fetch; never enters the
/// coordinator's mutation path.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL. Please provide a valid YouTube or YouTube Music URL")]
    InvalidUrl,
    #[error("No playable videos found")]
    NotFound,
    #[error("Invalid YouTube API key")]
    InvalidKey,
    #[error("Failed to load content: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Unknown(e.to_string())
    }
}

// ---- wire shapes (decoupled from the internal Track type) ----

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DurationListResponse {
    #[serde(default)]
    items: Vec<DurationItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DurationItem {
    id: String,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    title: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

// ---- URL form recognition ----

fn video_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:(?:youtube\.com|music\.youtube\.com)/(?:watch\?v=|shorts/)|youtu\.be/)([^&?/]+)")
            .expect("valid regex")
    })
}

fn playlist_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[?&]list=([^&]+)").expect("valid regex"))
}

fn channel_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/channel/(UC[\w-]+)").expect("valid regex"))
}

pub fn extract_video_id(url: &str) -> Option<String> {
    video_id_re()
        .captures(url)
        .map(|c| c[1].to_string())
}

pub fn extract_playlist_id(url: &str) -> Option<String> {
    playlist_id_re()
        .captures(url)
        .map(|c| c[1].to_string())
}

pub fn extract_channel_id(url: &str) -> Option<String> {
    channel_id_re()
        .captures(url)
        .map(|c| c[1].to_string())
}

/// A channel's full catalog lives in its auto-generated uploads playlist,
/// whose id is the channel id with the `UC` prefix swapped for `UU`.
fn uploads_playlist_id(channel_id: &str) -> String {
    format!("UU{}", &channel_id[2..])
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", video_id)
}

/// "PT1H2M3S" -> "1h 2m 3s".
fn format_iso_duration(iso: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid regex")
    });
    let Some(caps) = re.captures(iso) else {
        return "Unknown".to_string();
    };
    let mut parts = Vec::new();
    if let Some(h) = caps.get(1) {
        parts.push(format!("{}h", h.as_str()));
    }
    if let Some(m) = caps.get(2) {
        parts.push(format!("{}m", m.as_str()));
    }
    if let Some(s) = caps.get(3) {
        parts.push(format!("{}s", s.as_str()));
    }
    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Thin client for the videos/playlists/search endpoints. The coordinator
/// only ever sees the resulting `Vec<Track>`.
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Resolves any supported URL form (single video, playlist, radio/mix,
    /// channel) to an ordered, non-empty track list.
    pub async fn fetch_items(&self, url: &str) -> Result<Vec<Track>, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::InvalidUrl);
        }

        if let Some(video_id) = extract_video_id(url) {
            if !url.contains("list=") {
                return self.fetch_video(&video_id).await;
            }
        }

        if let Some(channel_id) = extract_channel_id(url) {
            return self.fetch_playlist(&uploads_playlist_id(&channel_id)).await;
        }

        let Some(playlist_id) = extract_playlist_id(url) else {
            return Err(FetchError::InvalidUrl);
        };

        // Radio/mix lists have no retrievable items; fall back to a genre
        // search the way the mix id encodes it.
        if playlist_id.starts_with("RDCLAK") {
            return self.fetch_music_mix(&playlist_id).await;
        }

        self.fetch_playlist(&playlist_id).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.http.get(url).send().await?;
        if response.status() == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::InvalidKey);
        }
        if !response.status().is_success() {
            return Err(FetchError::Unknown(format!("HTTP {}", response.status())));
        }
        Ok(response.json().await?)
    }

    async fn fetch_video(&self, video_id: &str) -> Result<Vec<Track>, FetchError> {
        let url = format!(
            "{}/videos?part=snippet,contentDetails&id={}&key={}",
            API_BASE, video_id, self.api_key
        );
        let data: VideoListResponse = self.get_json(&url).await?;
        let Some(video) = data.items.into_iter().next() else {
            return Err(FetchError::NotFound);
        };
        Ok(vec![Track {
            thumbnail: thumbnail_url(&video.id),
            id: video.id,
            title: video.snippet.title,
            duration: format_iso_duration(&video.content_details.duration),
        }])
    }

    async fn fetch_playlist(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError> {
        let mut tracks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/playlistItems?part=snippet&maxResults=50&playlistId={}&key={}",
                API_BASE, playlist_id, self.api_key
            );
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(token);
            }
            let page: PlaylistItemsResponse = self.get_json(&url).await?;

            let ids: Vec<&str> = page
                .items
                .iter()
                .map(|item| item.snippet.resource_id.video_id.as_str())
                .collect();
            let durations = self.fetch_durations(&ids).await?;

            for item in &page.items {
                // Playlist listings include tombstones for videos the API
                // can no longer serve.
                if item.snippet.title == "Private video" || item.snippet.title == "Deleted video" {
                    continue;
                }
                let video_id = &item.snippet.resource_id.video_id;
                tracks.push(Track {
                    id: video_id.clone(),
                    title: item.snippet.title.clone(),
                    duration: durations
                        .iter()
                        .find(|(id, _)| id == video_id)
                        .map(|(_, d)| d.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    thumbnail: thumbnail_url(video_id),
                });
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if tracks.is_empty() {
            return Err(FetchError::NotFound);
        }
        Ok(tracks)
    }

    async fn fetch_durations(&self, ids: &[&str]) -> Result<Vec<(String, String)>, FetchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!(
            "{}/videos?part=contentDetails&id={}&key={}",
            API_BASE,
            ids.join(","),
            self.api_key
        );
        let data: DurationListResponse = self.get_json(&url).await?;
        Ok(data
            .items
            .into_iter()
            .map(|item| {
                let duration = format_iso_duration(&item.content_details.duration);
                (item.id, duration)
            })
            .collect())
    }

    async fn fetch_music_mix(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"RDCLAK5uy_([^_]+)").expect("valid regex"));
        let Some(caps) = re.captures(playlist_id) else {
            return Err(FetchError::InvalidUrl);
        };
        let genre = caps[1].replace('_', " ");

        let url = format!(
            "{}/search?part=snippet&type=video&videoCategoryId=10&maxResults=25&key={}&q=music%20{}",
            API_BASE, self.api_key, genre
        );
        let data: SearchResponse = self.get_json(&url).await?;
        let ids: Vec<String> = data
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            return Err(FetchError::NotFound);
        }

        let url = format!(
            "{}/videos?part=snippet,contentDetails&id={}&key={}",
            API_BASE,
            ids.join(","),
            self.api_key
        );
        let data: VideoListResponse = self.get_json(&url).await?;
        let tracks: Vec<Track> = data
            .items
            .into_iter()
            .map(|video| Track {
                thumbnail: thumbnail_url(&video.id),
                id: video.id,
                title: video.snippet.title,
                duration: format_iso_duration(&video.content_details.duration),
            })
            .collect();
        if tracks.is_empty() {
            return Err(FetchError::NotFound);
        }
        Ok(tracks)
    }
}
