use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

/// The single "current user". For doctors `id` is the doctor's id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn patient() -> Self {
        Self {
            id: "user123".to_string(),
            name: "Patient User".to_string(),
            role: Role::Patient,
        }
    }

    pub fn doctor(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: Role::Doctor,
        }
    }

    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }
}

impl Default for User {
    fn default() -> Self {
        Self::patient()
    }
}
