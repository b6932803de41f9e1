use serde::{Deserialize, Serialize};

/// A clinic doctor. Created once by seeding, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
}
