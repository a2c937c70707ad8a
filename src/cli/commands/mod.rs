pub mod compare;
pub mod config;
pub mod estimate;
pub mod generate;
pub mod history;
pub mod init;
pub mod models;
pub mod scan;
