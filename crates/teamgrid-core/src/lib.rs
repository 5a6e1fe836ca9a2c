pub mod cache;
pub mod calendar;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod io;
pub mod member;
pub mod paths;
pub mod prefs;
pub mod project;
pub mod record;
pub mod selection;
pub mod store;
pub mod types;
pub mod view;

pub use error::{GridError, Result};
