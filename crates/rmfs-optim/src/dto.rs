//! Wire types for the optimizer protocol.
//!
//! Field names follow the wire format exactly (including the inconsistent
//! casing of `STATUS` and `availableBots`); serde renames keep the Rust side
//! idiomatic.

use serde::{Deserialize, Serialize};

// ── /init ─────────────────────────────────────────────────────────────────────

/// One-time setup payload: static layout facts and agent identities.
#[derive(Debug, Clone, Serialize)]
pub struct InitRequest {
    /// Storage address → access-point address.
    pub access_points: std::collections::BTreeMap<String, String>,

    /// Station identifiers.
    pub bot_ids: Vec<i64>,

    /// Picker identifiers.
    pub picker_ids: Vec<i64>,

    /// Station cruise speed, m/s.
    pub bot_speed: f64,

    /// Picker walking speed, m/s.
    pub picker_speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitResponse {
    #[serde(rename = "STATUS")]
    pub status: String,
}

// ── Batch snapshot ────────────────────────────────────────────────────────────

/// One order as the optimizer sees it.
///
/// `bot_id` is the gathering station for in-progress partial orders, `-1`
/// for pending whole orders.  `items` holds only the still-open addresses;
/// `times` the matching per-item service seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub order_id: i64,
    pub bot_id: i64,
    /// Seconds since simulation start; `-1.0` when the order has no deadline.
    pub deadline: f64,
    pub items: Vec<String>,
    pub times: Vec<f64>,
}

/// One picker as the optimizer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerInfo {
    pub picker_id: i64,
    /// Wire position (address tag, or `r<row>c<col>` for untagged waypoints).
    pub position: String,
    /// `true` while the picker is bound to an assist.
    pub busy: bool,
}

/// One station as the optimizer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotInfo {
    pub bot_id: i64,
    pub position: String,
    /// Open addresses of the order the station is currently gathering.
    pub items: Vec<String>,
}

/// The consistent snapshot every batch-taking endpoint receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBatch {
    pub no_bots: usize,
    pub no_pickers: usize,
    /// The station on whose behalf the call is made.
    pub caller_id: i64,
    pub orders: Vec<OrderInfo>,
    pub pickers: Vec<PickerInfo>,
    pub bots: Vec<BotInfo>,
    #[serde(rename = "availableBots")]
    pub available_bots: Vec<i64>,
}

// ── Responses ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ItemResponse {
    /// The next pick address for the calling station.
    pub item: String,
}

/// One `(item, bot)` step of a picker's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerAssignment {
    pub item: String,
    pub bot_id: i64,
}

/// Ordered assist assignments for one picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerSchedule {
    pub picker_id: i64,
    pub assignments: Vec<PickerAssignment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickerSchedulesResponse {
    pub picker_schedules: Vec<PickerSchedule>,
}
