use chrono::NaiveDateTime;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BeatmapRecord {
    pub beatmap_id: i32,
    pub beatmapset_id: Option<i32>,
    pub user_id: i32,
    pub filename: Option<String>,
    pub checksum: Option<String>,
    pub version: String,
    pub total_length: i32,
    pub hit_length: i32,
    pub count_total: i32,
    pub count_normal: i32,
    pub count_slider: i32,
    pub count_spinner: i32,
    pub diff_drain: f32,
    pub diff_size: f32,
    pub diff_overall: f32,
    pub diff_approach: f32,
    pub playmode: i8,
    pub approved: i8,
    pub last_update: NaiveDateTime,
    pub difficultyrating: f64,
    pub playcount: i32,
    pub passcount: i32,
    pub orphaned: bool,
    pub youtube_preview: Option<String>,
    pub score_version: i32,
    pub deleted_at: Option<NaiveDateTime>,
    pub bpm: Option<f64>,
}
