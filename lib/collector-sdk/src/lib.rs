pub mod agent;
pub mod report;
