pub mod db;
pub mod progress;
pub mod settings;
