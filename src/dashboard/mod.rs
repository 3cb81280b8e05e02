// Dashboard module - State the live feed and REST API keep current
pub mod comparison;
pub mod feed;
pub mod live;
pub mod model;
pub mod series;
pub mod servers;
pub mod time;

pub use comparison::{
    ComparisonData, ComparisonRow, ComparisonSelection, ComparisonStats, series_key,
};
pub use feed::{LiveSeries, ServerFeed};
pub use live::parse_live_data_payload;
pub use model::{
    BulkServerData, DataPointQuery, RawDataPoint, Server, ServerDataPoint, sanitize_points,
};
pub use series::{SeriesBuffer, SeriesStats, downsample, downsample_keep_last};
pub use servers::{ServerDirectory, SortOption};
pub use time::{TimeRange, parse_duration};
