extern crate anyhow;
extern crate colored;
extern crate reqwest;
extern crate serde_derive;

pub mod app;
pub mod clipboard;
pub mod console;
pub mod notify;
pub mod paper;
pub mod settings;
pub mod vault;
