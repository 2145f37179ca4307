use crate::contact::Contact;
use crate::form::FormState;

/// The at-most-one contact whose fields are loaded into the form.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    active: Option<Contact>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check or uncheck `record`. Checking replaces any previous selection
    /// and returns the form filled from `record`; unchecking clears the
    /// selection and returns a pristine form.
    pub fn select(&mut self, checked: bool, record: &Contact) -> FormState {
        if checked {
            tracing::info!(email = %record.email, "contact selected");
            self.active = Some(record.clone());
            FormState::from_contact(record)
        } else {
            tracing::info!(email = %record.email, "contact deselected");
            self.active = None;
            FormState::new()
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&Contact> {
        self.active.as_ref()
    }

    /// Rows are keyed by email. Contacts without an email only match an
    /// identical record.
    pub fn is_selected(&self, record: &Contact) -> bool {
        self.active.as_ref().is_some_and(|active| {
            if active.email.is_empty() {
                active == record
            } else {
                active.email == record.email
            }
        })
    }
}
