//! Room inquiries
//!
//! The CTA hands a prefilled [`InquiryDraft`] to the host's inquiry dialog.
//! Field validation lives here so every host applies the same rules.

use std::rc::Rc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::host::{InquiryFlow, SessionSource};
use crate::models::{Room, UserProfile};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryField {
    Phone,
    Email,
    Name,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: InquiryField,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: InquiryField, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Inquiry form contents as typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryDraft {
    pub room_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// `YYYY-MM-DD`, empty until picked
    pub date: String,
    pub min_date: NaiveDate,
}

impl InquiryDraft {
    pub fn prefill(room_id: &str, profile: &UserProfile, today: NaiveDate) -> Self {
        Self {
            room_id: room_id.to_string(),
            name: profile.name.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
            phone: profile.phone.clone().unwrap_or_default(),
            date: String::new(),
            min_date: today,
        }
    }

    /// Errors in form order: phone, email, name, date
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if !is_phone(self.phone.trim()) {
            errors.push(FieldError::new(
                InquiryField::Phone,
                "Please enter your contact number.",
            ));
        }
        if !is_email(self.email.trim()) {
            errors.push(FieldError::new(
                InquiryField::Email,
                "Please enter a valid email address.",
            ));
        }
        if self.name.trim().chars().count() < 2 {
            errors.push(FieldError::new(InquiryField::Name, "Please enter your name."));
        }

        let date = self.date.trim();
        if date.is_empty() {
            errors.push(FieldError::new(InquiryField::Date, "Please pick a date."));
        } else if self.parsed_date().is_none() {
            errors.push(FieldError::new(
                InquiryField::Date,
                "Please pick a valid future date.",
            ));
        }

        errors
    }

    /// Picked date, if it parses and is not before the minimum
    fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .ok()
            .filter(|date| *date >= self.min_date)
    }

    pub fn into_request(self) -> Result<InquiryRequest> {
        if let Some(first) = self.validate().first() {
            return Err(Error::Validation(first.message.to_string()));
        }
        let date = self
            .parsed_date()
            .ok_or_else(|| Error::Validation("Please pick a valid future date.".to_string()))?;

        Ok(InquiryRequest {
            id: Uuid::new_v4(),
            room_id: self.room_id,
            phone: to_e164_ph(self.phone.trim()),
            email: self.email.trim().to_string(),
            name: self.name.trim().to_string(),
            date,
        })
    }
}

/// A validated inquiry ready to submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryRequest {
    pub id: Uuid,
    pub room_id: String,
    pub phone: String,
    pub email: String,
    pub name: String,
    pub date: NaiveDate,
}

/// At least seven digits, any punctuation
pub fn is_phone(value: &str) -> bool {
    value.chars().filter(char::is_ascii_digit).count() >= 7
}

/// `local@domain.tld` shape with no whitespace
pub fn is_email(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    value.match_indices('@').any(|(at, _)| {
        let domain = &value[at + 1..];
        at > 0
            && domain
                .match_indices('.')
                .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
    })
}

/// Philippine number in E.164 form
pub fn to_e164_ph(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return String::new();
    }
    if digits.starts_with("09") && digits.len() == 11 {
        format!("+63{}", &digits[1..])
    } else if digits.starts_with('9') && digits.len() == 10 {
        format!("+63{}", digits)
    } else if digits.starts_with("63") {
        format!("+{}", digits)
    } else if digits.starts_with('0') && digits.len() > 1 {
        format!("+63{}", &digits[1..])
    } else {
        format!("+{}", digits)
    }
}

/// CTA target: the inquiry dialog for signed-in users, sign-in otherwise
pub struct InquiryLauncher {
    session: Rc<dyn SessionSource>,
    flow: Rc<dyn InquiryFlow>,
}

impl InquiryLauncher {
    pub fn new(session: Rc<dyn SessionSource>, flow: Rc<dyn InquiryFlow>) -> Self {
        Self { session, flow }
    }

    pub fn launch(&self, room: &Room) {
        match self.session.current_user() {
            Some(profile) => {
                tracing::debug!(room_id = %room.id, "Opening inquiry");
                let today = Local::now().date_naive();
                self.flow
                    .open_inquiry(InquiryDraft::prefill(&room.id, &profile, today));
            }
            None => {
                tracing::debug!(room_id = %room.id, "Inquiry needs sign-in");
                self.flow.prompt_sign_in();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: Some("Ana Cruz".to_string()),
            email: Some("ana@example.ph".to_string()),
            phone: Some("0917 123 4567".to_string()),
        }
    }

    fn messages(draft: &InquiryDraft) -> Vec<&'static str> {
        draft.validate().into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_prefill_from_profile() {
        let draft = InquiryDraft::prefill("R001", &profile(), today());
        assert_eq!(draft.room_id, "R001");
        assert_eq!(draft.name, "Ana Cruz");
        assert_eq!(draft.date, "");
        assert_eq!(draft.min_date, today());
        assert_eq!(messages(&draft), vec!["Please pick a date."]);
    }

    #[test]
    fn test_validation_messages() {
        let draft = InquiryDraft::prefill("R001", &UserProfile::default(), today());
        assert_eq!(
            messages(&draft),
            vec![
                "Please enter your contact number.",
                "Please enter a valid email address.",
                "Please enter your name.",
                "Please pick a date.",
            ]
        );
    }

    #[test]
    fn test_past_or_garbled_date_rejected() {
        let mut draft = InquiryDraft::prefill("R001", &profile(), today());
        draft.date = "2025-05-31".to_string();
        assert_eq!(messages(&draft), vec!["Please pick a valid future date."]);
        draft.date = "next week".to_string();
        assert_eq!(messages(&draft), vec!["Please pick a valid future date."]);
        draft.date = "2025-06-01".to_string();
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email("a@b.c"));
        assert!(is_email("first.last@mail.example.ph"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.c"));
        assert!(!is_email("a@.c"));
        assert!(!is_email("a@b."));
        assert!(!is_email("a b@c.d"));
    }

    #[test]
    fn test_phone_normalization() {
        assert!(is_phone("123-4567"));
        assert!(!is_phone("12345"));
        assert_eq!(to_e164_ph("0917 123 4567"), "+639171234567");
        assert_eq!(to_e164_ph("9171234567"), "+639171234567");
        assert_eq!(to_e164_ph("+63 917 123 4567"), "+639171234567");
        assert_eq!(to_e164_ph(""), "");
    }

    #[test]
    fn test_into_request() {
        let mut draft = InquiryDraft::prefill("S101", &profile(), today());
        draft.name = "  Ana Cruz ".to_string();
        draft.date = "2025-07-15".to_string();
        let request = draft.into_request().unwrap();
        assert_eq!(request.room_id, "S101");
        assert_eq!(request.name, "Ana Cruz");
        assert_eq!(request.phone, "+639171234567");
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());
        assert!(!request.id.is_nil());
    }

    #[test]
    fn test_into_request_rejects_invalid() {
        let draft = InquiryDraft::prefill("S101", &profile(), today());
        assert!(matches!(draft.into_request(), Err(Error::Validation(_))));
    }

    struct FixedSession(Option<UserProfile>);

    impl SessionSource for FixedSession {
        fn current_user(&self) -> Option<UserProfile> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingFlow {
        drafts: RefCell<Vec<InquiryDraft>>,
        prompts: RefCell<usize>,
    }

    impl InquiryFlow for RecordingFlow {
        fn open_inquiry(&self, draft: InquiryDraft) {
            self.drafts.borrow_mut().push(draft);
        }

        fn prompt_sign_in(&self) {
            *self.prompts.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_launcher_routes_by_session() {
        let room = Room::new("R001", crate::models::RoomType::Dorm, "Room 001", 4000);
        let flow = Rc::new(RecordingFlow::default());

        InquiryLauncher::new(Rc::new(FixedSession(None)), flow.clone()).launch(&room);
        assert_eq!(*flow.prompts.borrow(), 1);
        assert!(flow.drafts.borrow().is_empty());

        InquiryLauncher::new(Rc::new(FixedSession(Some(profile()))), flow.clone()).launch(&room);
        assert_eq!(flow.drafts.borrow().len(), 1);
        assert_eq!(flow.drafts.borrow()[0].email, "ana@example.ph");
    }
}
