pub mod audience;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod loader;
pub mod locale;
pub mod message;
pub mod repeat;
pub mod selection;
pub mod tables;
pub mod world;
