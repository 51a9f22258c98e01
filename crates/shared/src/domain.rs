use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One entry of the board. The activity name is the catalog key and is not
/// repeated inside the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    /// Capacity minus roster length. Not clamped: an over-enrolled activity
    /// reports a negative value.
    pub fn spots_left(&self) -> i64 {
        i64::from(self.max_participants) - self.participants.len() as i64
    }
}

/// Activity name -> activity, in the order the server produced them.
pub type Catalog = IndexMap<String, Activity>;
