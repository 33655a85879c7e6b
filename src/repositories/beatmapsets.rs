use crate::common::context::Context;
use crate::entities::beatmapsets::BeatmapSetRecord;
use crate::snapshot::schema::FILTER_RANKED_OR_APPROVED;
use futures::stream::BoxStream;

const READ_FIELDS: &str = "beatmapset_id, approved, approved_date, submit_date";

const COUNT_QUERY: &str = const_str::concat!(
    "SELECT COUNT(*) FROM osu_beatmapsets WHERE ",
    FILTER_RANKED_OR_APPROVED,
);

const SELECT_QUERY: &str = const_str::concat!(
    "SELECT ",
    READ_FIELDS,
    " FROM osu_beatmapsets WHERE ",
    FILTER_RANKED_OR_APPROVED,
);

pub async fn count_eligible<C: Context>(ctx: &C) -> sqlx::Result<i64> {
    sqlx::query_scalar(COUNT_QUERY).fetch_one(ctx.db()).await
}

pub fn stream_eligible<C: Context>(ctx: &C) -> BoxStream<'_, sqlx::Result<BeatmapSetRecord>> {
    sqlx::query_as::<_, BeatmapSetRecord>(SELECT_QUERY).fetch(ctx.db())
}
