//! The editable meeting-protocol document.
//!
//! Header scalars plus ordered child collections. The synchronization
//! engine treats the whole document as one replace unit, so these types
//! only need deterministic serde encodings; there is no diff structure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A meeting protocol as edited in the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolDocument {
    /// Protocol title shown in lists and exports.
    pub title: String,

    /// Date of the meeting the protocol records.
    pub meeting_date: Option<NaiveDate>,

    /// Free-text meeting location.
    pub location: Option<String>,

    /// Participants, in the order entered.
    pub attendees: Vec<Attendee>,

    /// Decisions taken, in the order recorded.
    pub decisions: Vec<Decision>,

    /// Free-form content sections, in display order.
    pub sections: Vec<Section>,
}

impl ProtocolDocument {
    /// Create an empty protocol with just a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn add_attendee(&mut self, attendee: Attendee) {
        self.attendees.push(attendee);
    }

    pub fn add_decision(&mut self, decision: Decision) {
        self.decisions.push(decision);
    }

    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }
}

/// A meeting participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,

    /// Role in the meeting (chair, minute-taker, guest, ...).
    pub role: Option<String>,

    /// Whether the person actually attended or was only invited.
    pub present: bool,
}

impl Attendee {
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            present: true,
        }
    }
}

/// A decision recorded during the meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub text: String,

    /// Person responsible for follow-up.
    pub owner: Option<String>,

    /// Follow-up due date.
    pub due: Option<NaiveDate>,
}

/// A free-form content section of the protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use protocol_sync::DocumentSnapshot;

    use super::*;

    fn sample() -> ProtocolDocument {
        let mut protocol = ProtocolDocument::titled("Q3 board meeting");
        protocol.meeting_date = NaiveDate::from_ymd_opt(2026, 8, 28);
        protocol.add_attendee(Attendee::present("A. Vogel"));
        protocol.add_decision(Decision {
            text: "Approve the revised budget".to_string(),
            owner: Some("A. Vogel".to_string()),
            due: NaiveDate::from_ymd_opt(2026, 9, 15),
        });
        protocol.add_section(Section::new("Budget", "Discussed line items."));
        protocol
    }

    #[test]
    fn test_equal_documents_snapshot_equal() {
        let a = DocumentSnapshot::capture(&sample()).unwrap();
        let b = DocumentSnapshot::capture(&sample()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_section_edit_changes_snapshot() {
        let baseline = DocumentSnapshot::capture(&sample()).unwrap();

        let mut edited = sample();
        edited.sections[0].body.push_str(" Follow-up next week.");
        let current = DocumentSnapshot::capture(&edited).unwrap();

        assert_ne!(baseline, current);
    }

    #[test]
    fn test_attendee_order_is_part_of_the_state() {
        let mut forward = ProtocolDocument::titled("Ordering");
        forward.add_attendee(Attendee::present("First"));
        forward.add_attendee(Attendee::present("Second"));

        let mut reversed = ProtocolDocument::titled("Ordering");
        reversed.add_attendee(Attendee::present("Second"));
        reversed.add_attendee(Attendee::present("First"));

        let a = DocumentSnapshot::capture(&forward).unwrap();
        let b = DocumentSnapshot::capture(&reversed).unwrap();
        assert_ne!(a, b);
    }
}
