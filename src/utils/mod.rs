// src/utils/mod.rs

pub mod text;
pub mod time;
