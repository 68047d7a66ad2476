pub mod completions;
pub mod config;
pub mod doctor;
pub mod hook;
pub mod send;
pub mod speak;
