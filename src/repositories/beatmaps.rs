use crate::common::context::Context;
use crate::entities::beatmaps::BeatmapRecord;
use crate::snapshot::schema::{
    FILTER_RANKED_NOT_DELETED, FILTER_RANKED_OR_APPROVED, SchemaVersion,
};
use futures::stream::BoxStream;

// Columns are selected and bound by name; reordering the source table
// cannot silently shift values into the wrong snapshot column.
const READ_FIELDS: &str = r#"beatmap_id, beatmapset_id, user_id, filename, checksum,
version, total_length, hit_length, countTotal AS count_total, countNormal AS count_normal,
countSlider AS count_slider, countSpinner AS count_spinner, diff_drain, diff_size,
diff_overall, diff_approach, playmode, approved, last_update, difficultyrating,
playcount, passcount, orphaned, youtube_preview, score_version, deleted_at, bpm"#;

fn count_query(version: SchemaVersion) -> &'static str {
    const QUERY_V1: &str = const_str::concat!(
        "SELECT COUNT(*) FROM osu_beatmaps WHERE ",
        FILTER_RANKED_OR_APPROVED,
    );
    const QUERY_V2: &str = const_str::concat!(
        "SELECT COUNT(*) FROM osu_beatmaps WHERE ",
        FILTER_RANKED_NOT_DELETED,
    );
    match version {
        SchemaVersion::V1 => QUERY_V1,
        SchemaVersion::V2 => QUERY_V2,
    }
}

fn select_query(version: SchemaVersion) -> &'static str {
    const QUERY_V1: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM osu_beatmaps WHERE ",
        FILTER_RANKED_OR_APPROVED,
    );
    const QUERY_V2: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM osu_beatmaps WHERE ",
        FILTER_RANKED_NOT_DELETED,
    );
    match version {
        SchemaVersion::V1 => QUERY_V1,
        SchemaVersion::V2 => QUERY_V2,
    }
}

pub async fn count_eligible<C: Context>(ctx: &C, version: SchemaVersion) -> sqlx::Result<i64> {
    sqlx::query_scalar(count_query(version))
        .fetch_one(ctx.db())
        .await
}

/// Forward-only stream over the eligible rows, in the source's natural
/// order. Nothing downstream relies on that order.
pub fn stream_eligible<C: Context>(
    ctx: &C,
    version: SchemaVersion,
) -> BoxStream<'_, sqlx::Result<BeatmapRecord>> {
    sqlx::query_as::<_, BeatmapRecord>(select_query(version)).fetch(ctx.db())
}
