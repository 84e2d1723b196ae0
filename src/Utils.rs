//! different utility modules used throughout the project
/// tiny module to set up terminal logging from a level string
pub mod logger;
