//! Educational video suggestions from the YouTube Data API, with demo videos
//! whenever no key is configured or the API call fails.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::quiz::models::LearningPathRecord;
use crate::recommendations::cache::TtlCache;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const SEARCH_LANGUAGE: &str = "es";
pub const TOPICS_PER_PATH: usize = 2;
pub const MAX_PATH_VIDEOS: usize = 12;
const FALLBACK_DURATION: &str = "10 min";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSuggestion {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub duration: String,
    pub thumbnail: String,
    pub instructor: String,
    pub difficulty: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Error)]
enum VideoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    items: Vec<DetailItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailItem {
    id: String,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct VideoService {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    cache: TtlCache<String, Vec<VideoSuggestion>>,
}

impl std::fmt::Debug for VideoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoService")
            .field("api_url", &self.api_url)
            .field("live", &self.api_key.is_some())
            .finish()
    }
}

impl VideoService {
    pub fn new(api_key: Option<String>, api_url: String, ttl: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client for the video service")?;
        Ok(Self {
            client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache: TtlCache::new(ttl),
        })
    }

    /// Searches educational videos for `query`. Never fails: any problem
    /// yields the demo videos for the query.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<VideoSuggestion> {
        let key = format!("search_{query}_{max_results}_{SEARCH_LANGUAGE}");
        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, "Video cache hit");
            return hit;
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return demo_videos(query, max_results);
        };

        match self.fetch(api_key, query, max_results).await {
            Ok(videos) => {
                self.cache.set(key, videos.clone());
                videos
            }
            Err(e) => {
                warn!(query, "YouTube search failed, serving demo videos: {e}");
                demo_videos(query, max_results)
            }
        }
    }

    async fn fetch(
        &self,
        api_key: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<VideoSuggestion>, VideoError> {
        let search_query = format!("{query} educativo tutorial español -musica -gaming");
        let max = max_results.to_string();
        let search: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("key", api_key),
                    ("q", search_query.as_str()),
                    ("type", "video"),
                    ("part", "snippet"),
                    ("maxResults", max.as_str()),
                    ("relevanceLanguage", SEARCH_LANGUAGE),
                    ("videoDefinition", "high"),
                    ("videoDuration", "medium"),
                    ("order", "relevance"),
                ],
            )
            .await?;

        let items: Vec<(String, Snippet)> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id.map(|id| (id, item.snippet)))
            .collect();
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let ids = items
            .iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let details: DetailsResponse = self
            .get_json(
                "videos",
                &[
                    ("key", api_key),
                    ("id", ids.as_str()),
                    ("part", "snippet,contentDetails,statistics"),
                ],
            )
            .await?;

        Ok(items
            .into_iter()
            .map(|(id, snippet)| {
                let iso = details
                    .items
                    .iter()
                    .find(|d| d.id == id)
                    .and_then(|d| d.content_details.as_ref())
                    .and_then(|c| c.duration.as_deref())
                    .unwrap_or("PT10M");
                let thumbnail = snippet
                    .thumbnails
                    .medium
                    .or(snippet.thumbnails.default)
                    .map(|t| t.url)
                    .unwrap_or_default();
                VideoSuggestion {
                    url: format!("https://www.youtube.com/watch?v={id}"),
                    subject: subject_from_title(&snippet.title),
                    difficulty: difficulty_from_text(&snippet.title, &snippet.description)
                        .to_string(),
                    duration: format_duration(iso),
                    thumbnail,
                    instructor: snippet.channel_title,
                    title: snippet.title,
                    description: snippet.description,
                    id,
                }
            })
            .collect())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, VideoError> {
        let response = self
            .client
            .get(format!("{}/{endpoint}", self.api_url))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(VideoError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Up to two topics per path, deduplicated by id, capped at twelve.
    /// Stops searching once the cap is reached.
    pub async fn videos_for_paths(
        &self,
        paths: &[LearningPathRecord],
        per_path: usize,
    ) -> Vec<VideoSuggestion> {
        let mut seen = HashSet::new();
        let mut videos = Vec::new();
        'paths: for path in paths {
            for topic in topics_for_path(path).iter().take(TOPICS_PER_PATH) {
                if videos.len() >= MAX_PATH_VIDEOS {
                    break 'paths;
                }
                for video in self.search(topic, per_path).await {
                    if seen.insert(video.id.clone()) {
                        videos.push(video);
                    }
                }
            }
        }
        videos.truncate(MAX_PATH_VIDEOS);
        videos
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Topics for a path: its interests, then subjects named in its title.
pub fn topics_for_path(record: &LearningPathRecord) -> Vec<String> {
    const TITLE_TOPICS: &[(&str, &[&str])] = &[
        ("matemáticas", &["matemática", "álgebra", "cálculo", "geometría"]),
        ("física", &["física", "mecánica", "óptica"]),
        ("química", &["química", "orgánica", "inorgánica"]),
        ("biología", &["biología", "anatomía", "genética"]),
        ("examen", &["exani", "unam", "ipn", "admisión"]),
    ];

    let mut topics: Vec<String> = Vec::new();
    let mut push = |topic: &str| {
        let topic = topic.trim();
        if !topic.is_empty() && !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
    };

    for interest in record.path.interests.split(',') {
        push(interest);
    }
    let title = record.path.title.to_lowercase();
    for (topic, keywords) in TITLE_TOPICS {
        if keywords.iter().any(|k| title.contains(k)) {
            push(topic);
        }
    }
    topics
}

/// ISO-8601 `PT#H#M#S` → "1h 2min" or "10 min 05 seg".
pub fn format_duration(iso: &str) -> String {
    let Some(rest) = iso.strip_prefix("PT") else {
        return FALLBACK_DURATION.to_string();
    };

    let (mut hours, mut minutes, mut seconds) = (0u64, 0u64, 0u64);
    let mut digits = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let Ok(value) = digits.parse::<u64>() else {
            return FALLBACK_DURATION.to_string();
        };
        match c {
            'H' => hours = value,
            'M' => minutes = value,
            'S' => seconds = value,
            _ => return FALLBACK_DURATION.to_string(),
        }
        digits.clear();
    }
    if !digits.is_empty() {
        return FALLBACK_DURATION.to_string();
    }

    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes} min {seconds:02} seg")
    }
}

fn subject_from_title(title: &str) -> String {
    const SUBJECTS: &[(&str, &[&str])] = &[
        ("Matemáticas", &["matemática", "algebra", "cálculo", "geometría", "trigonometría"]),
        ("Física", &["física", "mecánica", "termodinámica", "electromagnetismo"]),
        ("Química", &["química", "orgánica", "inorgánica", "bioquímica"]),
        ("Biología", &["biología", "anatomía", "genética", "ecología"]),
        ("Historia", &["historia", "civilización", "cultura", "sociedad"]),
        ("Literatura", &["literatura", "poesía", "narrativa", "ensayo"]),
        ("Inglés", &["inglés", "english", "grammar", "vocabulary"]),
    ];
    let lower = title.to_lowercase();
    SUBJECTS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(subject, _)| (*subject).to_string())
        .unwrap_or_else(|| "General".to_string())
}

fn difficulty_from_text(title: &str, description: &str) -> &'static str {
    let content = format!("{title} {description}").to_lowercase();
    if ["básico", "principiante", "introducción"]
        .iter()
        .any(|k| content.contains(k))
    {
        "Básico"
    } else if ["avanzado", "experto", "profesional"]
        .iter()
        .any(|k| content.contains(k))
    {
        "Avanzado"
    } else {
        "Intermedio"
    }
}

fn slug(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    for c in query.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Two placeholder videos about `query`. Ids are query-scoped so demo videos
/// for different topics survive deduplication.
pub fn demo_videos(query: &str, max_results: usize) -> Vec<VideoSuggestion> {
    let subject = subject_from_title(query);
    let slug = slug(query);
    let videos = vec![
        VideoSuggestion {
            id: format!("demo-{slug}-1"),
            title: format!("{query}: Conceptos Fundamentales"),
            subject: subject.clone(),
            duration: "15 min 30 seg".to_string(),
            thumbnail:
                "https://images.unsplash.com/photo-1509228468518-180dd4864904?w=300&h=200&fit=crop"
                    .to_string(),
            instructor: "Prof. Demo".to_string(),
            difficulty: "Intermedio".to_string(),
            url: "#".to_string(),
            description: format!("Video educativo sobre {query}"),
        },
        VideoSuggestion {
            id: format!("demo-{slug}-2"),
            title: format!("Guía Completa de {query}"),
            subject,
            duration: "22 min 45 seg".to_string(),
            thumbnail:
                "https://images.unsplash.com/photo-1532634922-8fe0b757fb13?w=300&h=200&fit=crop"
                    .to_string(),
            instructor: "Dr. Ejemplo".to_string(),
            difficulty: "Avanzado".to_string(),
            url: "#".to_string(),
            description: format!("Tutorial avanzado de {query}"),
        },
    ];
    videos.into_iter().take(max_results).collect()
}

/// Generic study videos for users with no learning paths yet.
pub fn general_study_videos() -> Vec<VideoSuggestion> {
    let thumbnail =
        "https://images.unsplash.com/photo-1434030216411-0b793f4b4173?w=300&h=200&fit=crop";
    vec![
        VideoSuggestion {
            id: "study-1".to_string(),
            title: "Técnicas de Estudio Efectivas".to_string(),
            subject: "Estudio".to_string(),
            duration: "12 min 30 seg".to_string(),
            thumbnail: thumbnail.to_string(),
            instructor: "Prof. Estudio Eficaz".to_string(),
            difficulty: "Básico".to_string(),
            url: "#".to_string(),
            description: "Métodos prácticos para estudiar mejor.".to_string(),
        },
        VideoSuggestion {
            id: "study-2".to_string(),
            title: "Preparación para Exámenes de Admisión".to_string(),
            subject: "Admisión".to_string(),
            duration: "25 min 45 seg".to_string(),
            thumbnail: thumbnail.to_string(),
            instructor: "Dr. Preparación".to_string(),
            difficulty: "Intermedio".to_string(),
            url: "#".to_string(),
            description: "Estrategias para los exámenes de admisión universitaria.".to_string(),
        },
    ]
}
