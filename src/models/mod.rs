pub mod booking_model;
pub mod combo_model;
pub mod movie_model;
pub mod review_model;
pub mod room_model;
pub mod seat_model;
pub mod showtime_model;
pub mod theater_model;
pub mod user_model;

use serde::{Deserialize, Serialize};

/// Soft-delete flag shared by every catalog/venue resource. Deleting a
/// record sets it to `inactive`; the document stays queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusPatch {
    pub status: Status,
}
