// backend/src/domain/mod.rs

pub mod aggregation;
pub mod export;
pub mod lifecycle;
pub mod validation;
pub mod view_prefs;
