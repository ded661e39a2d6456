pub mod articles;
pub mod assemble;
pub mod config;
pub mod package;
pub mod serve;
pub mod watch;
