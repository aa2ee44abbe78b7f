use serde::{Deserialize, Serialize};
use std::fmt;

/// How a consultation can take place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConsultationMode {
    Online,
    #[serde(rename = "In-Person")]
    InPerson,
}

impl fmt::Display for ConsultationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsultationMode::Online => write!(f, "Online"),
            ConsultationMode::InPerson => write!(f, "In-Person"),
        }
    }
}

impl std::str::FromStr for ConsultationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(ConsultationMode::Online),
            "in-person" | "inperson" | "in_person" => Ok(ConsultationMode::InPerson),
            other => Err(format!("unknown consultation mode: {other}")),
        }
    }
}

/// A practitioner patients can book. Immutable once seeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub location: String,
    pub mode: Vec<ConsultationMode>,
    pub bio: String,
    pub image_url: String,
    pub rating: f32,
}

impl Doctor {
    pub fn offers(&self, mode: ConsultationMode) -> bool {
        self.mode.contains(&mode)
    }
}
