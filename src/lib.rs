// src/lib.rs

//! brewmap: brewery name resolution and rating scraping for Untappd.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
