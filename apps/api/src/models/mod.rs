pub mod jobs;
pub mod profile;
