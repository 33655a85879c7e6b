pub mod beatmaps;
pub mod beatmapsets;
