pub mod domain;
pub mod error;
pub mod listing;
pub mod protocol;
