mod json_schema;

pub use json_schema::{EntryOutput, ListingResult, StatsResult};
