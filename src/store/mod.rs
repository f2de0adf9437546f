pub mod csv;
pub mod sample;

pub use csv::CsvStore;
pub use sample::{Sample, AGENT_COUNT_COLUMN, AGENT_LOG_COLUMN, DATE_COLUMN};
