pub mod observation_source;
pub mod snapshot_reader;
pub mod station_directory;

pub use observation_source::{IpmaSource, ObservationSource, StaticSource};
pub use snapshot_reader::{
    assign_territories, extract_embedded_json, filter_by_date, parse_snapshot,
    partition_by_territory,
};
pub use station_directory::{CachedDirectory, FogosDirectory, StationDirectory};
