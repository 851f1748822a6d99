pub mod config;
pub mod db;
pub mod error;
pub mod indicators;
pub mod message;
pub mod poller;
pub mod state;
pub mod ws;
