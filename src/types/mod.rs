pub mod format;
pub mod reading;
pub mod series;
pub mod station;
