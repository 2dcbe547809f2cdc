//! Ecopot Common Library
//!
//! CLIと各フロントエンドで共有される型とユーティリティ

pub mod error;
pub mod inventory;
pub mod json;
pub mod normalizer;
pub mod notifications;
pub mod parser;
pub mod transcript;
pub mod types;

pub use error::{Error, Result};
pub use inventory::{Health, Plant, PlantInventory};
pub use json::Json;
pub use normalizer::{
    count_records, display_key, excluded_keys, normalize, normalize_entries, render_lines,
    FieldRecord, FieldValue, DEFAULT_EXCLUDED_KEYS,
};
pub use notifications::{relative_time, Notification, NotificationCenter};
pub use parser::parse_identify_response;
pub use transcript::{Attachment, Author, Transcript, Turn};
pub use types::{data_uri, CandidateResult, IdentifyRequest, DEFAULT_ENDPOINT, PLANT_DETAILS};
