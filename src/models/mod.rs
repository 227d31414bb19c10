//! Data models

pub mod activity;
pub mod category;
pub mod enums;
pub mod equipment;
pub mod extension;
pub mod loan;
pub mod return_record;
pub mod user;
