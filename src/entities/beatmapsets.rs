use chrono::NaiveDateTime;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BeatmapSetRecord {
    pub beatmapset_id: i32,
    pub approved: i8,
    pub approved_date: Option<NaiveDateTime>,
    pub submit_date: Option<NaiveDateTime>,
}
