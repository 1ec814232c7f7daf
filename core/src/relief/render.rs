use super::model::FoodRequest;
use crate::determinism::clock::parse_rfc3339;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use time::macros::format_description;

pub const NO_CONTACT_TEXT: &str = "No contact number available";

/// Everything the detail overlay shows for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub id: String,
    pub requester_name: String,
    pub urgency_badge: String,
    pub urgency_color: String,
    pub received_at: String,
    pub location: String,
    pub impact: String,
    pub contact: String,
    pub call_link: Option<String>,
    pub needs: String,
    pub original_text: String,
}

impl RequestDetails {
    pub fn from_request(r: &FoodRequest) -> Self {
        Self {
            id: r.id.clone(),
            requester_name: r.requester_name.clone(),
            urgency_badge: r.urgency.badge_label(),
            urgency_color: r.urgency.chart_color().to_string(),
            received_at: display_timestamp(&r.timestamp),
            location: r.location.clone(),
            impact: format!("~{} People", r.people_count),
            contact: r
                .contact_number
                .clone()
                .unwrap_or_else(|| NO_CONTACT_TEXT.to_string()),
            call_link: r.contact_number.as_deref().map(tel_link),
            needs: r.needs.clone(),
            original_text: r.original_text.clone(),
        }
    }
}

pub fn tel_link(contact: &str) -> String {
    let dialable: String = contact
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{}", dialable)
}

/// `YYYY-MM-DD HH:MM UTC`, or the raw value when it does not parse.
pub fn display_timestamp(raw: &str) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    parse_rfc3339(raw)
        .and_then(|t| t.to_offset(time::UtcOffset::UTC).format(&fmt).ok())
        .unwrap_or_else(|| raw.to_string())
}

pub fn render_request_markdown(r: &FoodRequest) -> String {
    let d = RequestDetails::from_request(r);
    let mut lines = vec![
        format!("# {} [{}]", d.requester_name, d.urgency_badge),
        String::new(),
        format!("- Received: {}", d.received_at),
        format!("- Location: {}", d.location),
        format!("- Impact: {}", d.impact),
        format!("- Contact: {}", d.contact),
        String::new(),
        "## Reported Needs".to_string(),
        String::new(),
        d.needs,
        String::new(),
        "## Original Message".to_string(),
        String::new(),
    ];
    lines.extend(d.original_text.lines().map(|l| format!("> {}", l)));
    lines.join("\n")
}

pub fn render_view_csv(rows: &[&FoodRequest]) -> CoreResult<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "id",
        "requesterName",
        "location",
        "contactNumber",
        "needs",
        "peopleCount",
        "urgency",
        "timestamp",
        "originalText",
    ])?;
    for r in rows {
        let people = r.people_count.to_string();
        w.write_record([
            r.id.as_str(),
            r.requester_name.as_str(),
            r.location.as_str(),
            r.contact_number.as_deref().unwrap_or(""),
            r.needs.as_str(),
            people.as_str(),
            r.urgency.as_str(),
            r.timestamp.as_str(),
            r.original_text.as_str(),
        ])?;
    }
    let bytes = w
        .into_inner()
        .map_err(|e| CoreError::InvalidInput(format!("csv flush failed: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| CoreError::InvalidInput(format!("csv was not utf-8: {}", e)))
}
