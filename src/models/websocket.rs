use crate::dashboard::DashboardSnapshot;
use serde::{ Serialize, Deserialize };

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "refresh")]
    Refresh,
    #[serde(rename = "remove")] Remove {
        query_id: String,
    },
    #[serde(rename = "confirm")]
    Confirm,
    #[serde(rename = "cancel")]
    Cancel,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "snapshot")] Snapshot(DashboardSnapshot),
    #[serde(rename = "error")] Error {
        message: String,
    },
}
