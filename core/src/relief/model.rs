use serde::{Deserialize, Serialize};

pub const UNKNOWN_MARKER: &str = "Unknown";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UrgencyLevel {
    Critical,
    High,
    Moderate,
    Low,
}

impl UrgencyLevel {
    /// Display order for charts and legends, most severe first.
    pub const ALL: [UrgencyLevel; 4] = [
        UrgencyLevel::Critical,
        UrgencyLevel::High,
        UrgencyLevel::Moderate,
        UrgencyLevel::Low,
    ];

    pub fn weight(self) -> u8 {
        match self {
            UrgencyLevel::Critical => 4,
            UrgencyLevel::High => 3,
            UrgencyLevel::Moderate => 2,
            UrgencyLevel::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Critical => "Critical",
            UrgencyLevel::High => "High",
            UrgencyLevel::Moderate => "Moderate",
            UrgencyLevel::Low => "Low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn badge_label(self) -> String {
        self.as_str().to_uppercase()
    }

    pub fn chart_color(self) -> &'static str {
        match self {
            UrgencyLevel::Critical => "#ef4444",
            UrgencyLevel::High => "#f97316",
            UrgencyLevel::Moderate => "#eab308",
            UrgencyLevel::Low => "#3b82f6",
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One food/water relief request. Immutable once created.
///
/// Field names serialize in camelCase; the persisted cache payload is a JSON
/// array of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FoodRequest {
    pub id: String,
    pub requester_name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    pub needs: String,
    pub people_count: u32,
    pub urgency: UrgencyLevel,
    pub timestamp: String, // RFC3339 UTC capture instant
    pub original_text: String,
}

/// A validated extraction candidate: a [`FoodRequest`] minus `id`/`timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCandidate {
    pub requester_name: String,
    pub location: String,
    pub contact_number: Option<String>,
    pub needs: String,
    pub people_count: u32,
    pub urgency: UrgencyLevel,
    pub original_text: String,
}

impl RequestCandidate {
    pub fn into_request(self, id: String, timestamp: String) -> FoodRequest {
        FoodRequest {
            id,
            requester_name: self.requester_name,
            location: self.location,
            contact_number: self.contact_number,
            needs: self.needs,
            people_count: self.people_count,
            urgency: self.urgency,
            timestamp,
            original_text: self.original_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_weights_are_strictly_ordered() {
        let w: Vec<u8> = UrgencyLevel::ALL.iter().map(|u| u.weight()).collect();
        assert_eq!(w, vec![4, 3, 2, 1]);
    }

    #[test]
    fn urgency_parse_is_case_insensitive_but_closed() {
        assert_eq!(UrgencyLevel::parse("critical"), Some(UrgencyLevel::Critical));
        assert_eq!(UrgencyLevel::parse(" High "), Some(UrgencyLevel::High));
        assert_eq!(UrgencyLevel::parse("Severe"), None);
    }

    #[test]
    fn request_serializes_in_cache_shape() {
        let r = FoodRequest {
            id: "req-1".to_string(),
            requester_name: "Rahim".to_string(),
            location: "Sylhet".to_string(),
            contact_number: None,
            needs: "rice".to_string(),
            people_count: 5,
            urgency: UrgencyLevel::High,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            original_text: "need rice".to_string(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["requesterName"], "Rahim");
        assert_eq!(v["peopleCount"], 5);
        assert_eq!(v["urgency"], "High");
        assert!(v.get("contactNumber").is_none());
    }
}
