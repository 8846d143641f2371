use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::quiz::models::LearningPathRecord;
use crate::recommendations::cache::TtlCache;
use crate::recommendations::synthesizer::{recommend_courses, CourseSuggestion};
use crate::recommendations::videos::{general_study_videos, VideoService, VideoSuggestion};

/// Course and video recommendations for the learning paths in history,
/// memoized per path-id signature.
pub struct ContentService {
    courses: TtlCache<String, Vec<CourseSuggestion>>,
    rng: Mutex<StdRng>,
    videos: VideoService,
}

impl ContentService {
    /// `seed` makes course synthesis reproducible; `None` seeds from entropy.
    pub fn new(course_ttl: Duration, seed: Option<u64>, videos: VideoService) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            courses: TtlCache::new(course_ttl),
            rng: Mutex::new(rng),
            videos,
        }
    }

    pub fn course_cache_key(paths: &[LearningPathRecord], limit: usize) -> String {
        let ids: Vec<String> = paths.iter().map(|p| p.id.to_string()).collect();
        format!("courses_[{}]_{limit}", ids.join(","))
    }

    pub fn recommended_courses(
        &self,
        paths: &[LearningPathRecord],
        limit: usize,
    ) -> Vec<CourseSuggestion> {
        let key = Self::course_cache_key(paths, limit);
        if let Some(hit) = self.courses.get(&key) {
            debug!(%key, "Course cache hit");
            return hit;
        }

        let courses = recommend_courses(paths, limit, &mut *self.rng.lock());
        self.courses.set(key, courses.clone());
        courses
    }

    /// Videos to keep studying with: general ones when there are no paths yet.
    pub async fn continue_studying_videos(
        &self,
        paths: &[LearningPathRecord],
        limit: usize,
    ) -> Vec<VideoSuggestion> {
        if paths.is_empty() {
            return general_study_videos().into_iter().take(limit).collect();
        }
        let per_path = limit.div_ceil(paths.len()).max(1);
        let mut videos = self.videos.videos_for_paths(paths, per_path).await;
        videos.truncate(limit);
        videos
    }

    /// Drops both the course and the video caches.
    pub fn clear_cache(&self) {
        self.courses.clear();
        self.videos.clear_cache();
    }

    pub fn cached_course_lists(&self) -> usize {
        self.courses.len()
    }
}
