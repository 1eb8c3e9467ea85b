// SPDX-License-Identifier: MIT

//! Maintenance reminder model.
//!
//! Reminder management itself lives outside this crate; the model exists so
//! hydration round-trips the `reminders` storage key without data loss.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderTrigger {
    Distance,
    Date,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub trigger_type: ReminderTrigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_date: Option<String>,
    pub is_active: bool,
    pub is_custom: bool,
}
