pub mod signal_service;
pub mod watch_service;
