#![deny(warnings)]

pub mod clipboard;
pub mod config;
pub mod glossary;
pub mod history;
pub mod lang;
pub mod orchestrator;
pub mod scheduler;
pub mod settings;
pub mod translate;
pub mod util;
