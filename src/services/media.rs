//! # 운동 이미지/영상 라이브러리
//!
//! 운동 이름으로 예시 이미지와 영상 URL을 찾습니다.
//! 표는 서버 시작 시 한 번 만들어져 `AppState`에 `Arc<dyn ExerciseMedia>`로 공유됩니다.
//! `EXERCISE_MEDIA_PATH` JSON 파일로 기본 표에 항목을 덧붙일 수 있습니다.

use std::{path::Path, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::error::AppError;

/// 운동 이름 → 미디어 URL 조회 인터페이스
pub trait ExerciseMedia: Send + Sync {
    fn image_for(&self, exercise_name: &str) -> Option<String>;
    fn video_for(&self, exercise_name: &str) -> Option<String>;
}

/// 정의 순서를 유지하는 이름 → URL 표
#[derive(Debug, Clone, Default)]
pub struct MediaTable {
    entries: Vec<(String, String)>,
}

impl MediaTable {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        table.extend(entries);
        table
    }

    /// 항목을 추가합니다. 이미 있는 키는 URL만 교체하고 순서는 유지합니다.
    pub fn extend<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, url) in entries {
            let key = key.into().trim().to_lowercase();
            let url = url.into();
            match self.entries.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = url,
                None => self.entries.push((key, url)),
            }
        }
    }

    /// 정확히 일치하는 키가 우선이고, 없으면 정의 순서대로
    /// 양방향 부분 문자열 일치를 찾습니다.
    pub fn lookup(&self, exercise_name: &str) -> Option<&str> {
        let query = exercise_name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        if let Some((_, url)) = self.entries.iter().find(|(k, _)| *k == query) {
            return Some(url);
        }

        self.entries
            .iter()
            .find(|(k, _)| query.contains(k.as_str()) || k.contains(query.as_str()))
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// 기본 운동 라이브러리
#[derive(Debug, Clone)]
pub struct StaticMediaLibrary {
    images: MediaTable,
    videos: MediaTable,
}

/// `EXERCISE_MEDIA_PATH` 파일 형식
#[derive(Debug, Default, Deserialize)]
struct MediaFile {
    #[serde(default)]
    images: Vec<MediaEntry>,
    #[serde(default)]
    videos: Vec<MediaEntry>,
}

#[derive(Debug, Deserialize)]
struct MediaEntry {
    name: String,
    url: String,
}

impl StaticMediaLibrary {
    pub fn new(images: MediaTable, videos: MediaTable) -> Self {
        Self { images, videos }
    }

    /// 기본 이미지 표만 가진 라이브러리 (기본 영상 표는 비어 있음)
    pub fn builtin() -> Self {
        Self::new(MediaTable::new(BUILTIN_IMAGES.iter().copied()), MediaTable::default())
    }

    /// 기본 표에 JSON 파일의 항목을 덧붙입니다.
    ///
    /// ```json
    /// { "images": [{ "name": "supino reto", "url": "https://..." }],
    ///   "videos": [{ "name": "agachamento", "url": "https://youtu.be/..." }] }
    /// ```
    pub async fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut library = Self::builtin();
        let Some(path) = path else {
            return Ok(library);
        };

        let raw = tokio::fs::read_to_string(Path::new(path)).await?;
        let file: MediaFile = serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(format!("Invalid exercise media file {}: {}", path, e))
        })?;

        library
            .images
            .extend(file.images.into_iter().map(|e| (e.name, e.url)));
        library
            .videos
            .extend(file.videos.into_iter().map(|e| (e.name, e.url)));

        tracing::info!(
            path,
            images = library.images.len(),
            videos = library.videos.len(),
            "Loaded exercise media library"
        );
        Ok(library)
    }
}

impl ExerciseMedia for StaticMediaLibrary {
    fn image_for(&self, exercise_name: &str) -> Option<String> {
        self.images.lookup(exercise_name).map(str::to_string)
    }

    fn video_for(&self, exercise_name: &str) -> Option<String> {
        self.videos.lookup(exercise_name).map(to_embed_url)
    }
}

static VIDEO_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:[?&]v=|youtu\.be/|/embed/)([\w-]+)").ok());

/// 영상 URL을 임베드 가능한 형태로 바꿉니다.
///
/// 이미 `/embed/` 경로면 그대로, ID를 찾을 수 없어도 그대로 반환합니다.
pub fn to_embed_url(url: &str) -> String {
    if url.contains("/embed/") {
        return url.to_string();
    }

    VIDEO_ID
        .as_ref()
        .and_then(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|id| format!("https://www.youtube.com/embed/{}", id.as_str()))
        .unwrap_or_else(|| url.to_string())
}

const CHEST: &str = "https://images.unsplash.com/photo-1571019614242-c5c5dee9f50b?w=400";
const PUSH_UP: &str = "https://images.unsplash.com/photo-1598971639058-fab3c3109a00?w=400";
const BACK: &str = "https://images.unsplash.com/photo-1603287681836-b174ce5074c2?w=400";
const SHOULDERS: &str = "https://images.unsplash.com/photo-1532029837206-abbe2b7620e3?w=400";
const BICEPS: &str = "https://images.unsplash.com/photo-1581009146145-b5ef050c149a?w=400";
const TRICEPS: &str = "https://images.unsplash.com/photo-1530822847156-5df684ec5ee1?w=400";
const SQUAT: &str = "https://images.unsplash.com/photo-1574680096145-d05b474e2155?w=400";
const LEG_MACHINE: &str = "https://images.unsplash.com/photo-1434608519344-49d77a699e1d?w=400";
const ABS: &str = "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=400";
const PLANK: &str = "https://images.unsplash.com/photo-1566241142559-40e1dab266c6?w=400";

/// 기본 이미지 표 (부분 일치는 이 순서대로 검사)
const BUILTIN_IMAGES: &[(&str, &str)] = &[
    // 가슴
    ("supino reto", CHEST),
    ("supino inclinado", CHEST),
    ("supino declinado", CHEST),
    ("crucifixo", CHEST),
    ("crossover", CHEST),
    ("flexão", PUSH_UP),
    // 등
    ("puxada", BACK),
    ("puxada frontal", BACK),
    ("remada", BACK),
    ("remada curvada", BACK),
    ("remada baixa", BACK),
    ("pulldown", BACK),
    // 어깨
    ("desenvolvimento", SHOULDERS),
    ("elevação lateral", SHOULDERS),
    ("elevação frontal", SHOULDERS),
    // 이두
    ("rosca", BICEPS),
    ("rosca direta", BICEPS),
    ("rosca alternada", BICEPS),
    ("rosca martelo", BICEPS),
    ("rosca scott", BICEPS),
    // 삼두
    ("tríceps", TRICEPS),
    ("tríceps pulley", TRICEPS),
    ("tríceps corda", TRICEPS),
    ("tríceps testa", TRICEPS),
    ("tríceps francês", TRICEPS),
    // 하체
    ("agachamento", SQUAT),
    ("leg press", LEG_MACHINE),
    ("extensora", LEG_MACHINE),
    ("flexora", LEG_MACHINE),
    ("cadeira extensora", LEG_MACHINE),
    ("cadeira flexora", LEG_MACHINE),
    ("stiff", SQUAT),
    ("levantamento terra", SQUAT),
    ("panturrilha", LEG_MACHINE),
    ("gêmeos", LEG_MACHINE),
    // 복근
    ("abdominal", ABS),
    ("prancha", PLANK),
    ("crunch", ABS),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins_over_partial() {
        let table = MediaTable::new([("rosca", "a"), ("rosca martelo", "b")]);
        assert_eq!(table.lookup("Rosca Martelo"), Some("b"));
    }

    #[test]
    fn partial_match_follows_definition_order() {
        let table = MediaTable::new([("remada", "row"), ("remada curvada", "bent")]);
        // "remada curvada com barra" 에는 두 키가 모두 포함되지만 먼저 정의된 키가 이김
        assert_eq!(table.lookup("Remada curvada com barra"), Some("row"));
    }

    #[test]
    fn query_contained_in_key_matches() {
        let table = MediaTable::new([("cadeira extensora", "ext")]);
        assert_eq!(table.lookup("extensora"), Some("ext"));
        assert_eq!(table.lookup("burpee"), None);
        assert_eq!(table.lookup("   "), None);
    }

    #[test]
    fn builtin_library_resolves_common_exercises() {
        let library = StaticMediaLibrary::builtin();
        assert_eq!(library.image_for("Supino Reto").as_deref(), Some(CHEST));
        assert_eq!(library.image_for("Agachamento livre").as_deref(), Some(SQUAT));
        assert_eq!(library.image_for("Bench Press"), None);
        assert_eq!(library.video_for("Supino Reto"), None);
    }

    #[test]
    fn videos_are_normalized_to_embed_urls() {
        let library = StaticMediaLibrary::new(
            MediaTable::default(),
            MediaTable::new([("agachamento", "https://www.youtube.com/watch?v=abc123XY_-z")]),
        );
        assert_eq!(
            library.video_for("Agachamento").as_deref(),
            Some("https://www.youtube.com/embed/abc123XY_-z")
        );
    }

    #[test]
    fn embed_url_shapes() {
        assert_eq!(
            to_embed_url("https://youtu.be/QWERTY12345"),
            "https://www.youtube.com/embed/QWERTY12345"
        );
        assert_eq!(
            to_embed_url("https://www.youtube.com/watch?feature=share&v=id_1"),
            "https://www.youtube.com/embed/id_1"
        );
        assert_eq!(
            to_embed_url("https://www.youtube.com/embed/already"),
            "https://www.youtube.com/embed/already"
        );
        assert_eq!(to_embed_url("https://vimeo.com/12345"), "https://vimeo.com/12345");
    }

    #[test]
    fn extending_a_table_replaces_existing_keys_in_place() {
        let mut table = MediaTable::new([("remada", "old"), ("puxada", "p")]);
        table.extend([("REMADA ", "new"), ("burpee", "b")]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("remada"), Some("new"));
        assert_eq!(table.lookup("burpee"), Some("b"));
    }
}
