pub mod config;
pub mod db;
pub mod model;
pub mod report;
pub mod storage;
pub mod utils;
