// Test fixture: request and response models of a small harbour service

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response envelope
#[derive(Serialize)]
pub struct ApiResult<T> {
    /// Status code e.g. 0
    pub code: i32,
    pub data: T,
}

/// A body of salt water
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeaBody {
    /// Sea name e.g. Baltic
    #[validate(required)]
    pub sea_name: String,
    /// Depth in metres e.g. 459
    #[validate(range(min = 1, max = 11000))]
    pub max_depth: u32,
    /// Neighbouring seas
    pub neighbours: Vec<SeaBody>,
    /// Ports e.g. ["Gdansk", "Riga"]
    pub ports: Vec<String>,
    pub status: SeaStatus,
    /// Surveyed on e.g. 2024-05-01
    pub surveyed: NaiveDate,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeaStatus {
    /// Open to traffic
    Open,
    /// Frozen over
    Frozen,
}

#[derive(Deserialize)]
pub struct SeaQuery {
    /// Part of the name e.g. Bal
    pub keyword: Option<String>,
    pub status: SeaStatus,
}

pub fn touch(sea: &mut SeaBody) {
    sea.max_depth += 1;
}
