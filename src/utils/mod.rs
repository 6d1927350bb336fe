pub mod db_utils;
pub mod serde_utils;
