use std::collections::BTreeMap;
use std::fmt;

use regex::{Regex, RegexBuilder};
use time::macros::format_description;
use time::Date;

use crate::contact::{Contact, Field};
use crate::regions;
use crate::search::Criteria;

pub const PHONE_PATTERN: &str = r"^\+1\d{10}$";
pub const DEFAULT_POSTAL_PATTERN: &str = r"^[A-Z]\d[A-Z] ?\d[A-Z]\d$";

const LAST_NAME_REQUIRED: &str = "Last Name is required";
const PHONE_FORMAT: &str = "Correct Format: +1XXXXXXXXXX";
const POSTAL_FORMAT: &str = "Correct Format eg: A1A 1A1";
const DATE_FORMAT: &str = "Correct Format: YYYY-MM-DD";
const REGION_UNKNOWN: &str = "Unknown region code";

#[derive(Debug, Clone)]
pub struct ValidationRules {
    phone: Regex,
    postal_code: Regex,
    require_last_name: bool,
}

impl ValidationRules {
    /// Rules using `postal_pattern` for the zip code field. The pattern is
    /// matched case-insensitively.
    pub fn new(postal_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            phone: Regex::new(PHONE_PATTERN)?,
            postal_code: RegexBuilder::new(postal_pattern)
                .case_insensitive(true)
                .build()?,
            require_last_name: true,
        })
    }

    /// Same rules without the mandatory last name; used for command-line
    /// queries.
    pub fn without_required_last_name(mut self) -> Self {
        self.require_last_name = false;
        self
    }

    pub fn postal_pattern(&self) -> &str {
        self.postal_code.as_str()
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new(DEFAULT_POSTAL_PATTERN).expect("built-in postal pattern compiles")
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    messages: BTreeMap<Field, String>,
}

impl FormErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.messages.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.messages.insert(field, message.to_string());
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field.label(), message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// Editable contents of the search form, one value per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: [String; Field::COUNT],
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form filled from `contact`. A region code outside the selector's
    /// list loads as blank so the selector can still show it.
    pub fn from_contact(contact: &Contact) -> Self {
        let mut form = Self::new();
        for field in Field::ALL {
            form.set(field, contact.get(field));
        }
        if !regions::is_valid(&contact.state) {
            form.set(Field::State, "");
        }
        form
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn is_pristine(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    pub fn criteria(&self) -> Criteria {
        Field::ALL
            .into_iter()
            .fold(Criteria::new(), |criteria, field| {
                criteria.with(field, self.get(field))
            })
    }

    pub fn validate(&self, rules: &ValidationRules) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if rules.require_last_name && self.get(Field::LastName).is_empty() {
            errors.insert(Field::LastName, LAST_NAME_REQUIRED);
        }

        let phone = self.get(Field::PhoneNumber);
        if !phone.is_empty() && !rules.phone.is_match(phone) {
            errors.insert(Field::PhoneNumber, PHONE_FORMAT);
        }

        let zip = self.get(Field::ZipCode);
        if !zip.is_empty() && !rules.postal_code.is_match(zip) {
            errors.insert(Field::ZipCode, POSTAL_FORMAT);
        }

        let dob = self.get(Field::DateOfBirth);
        if !dob.is_empty() && parse_birth_date(dob).is_none() {
            errors.insert(Field::DateOfBirth, DATE_FORMAT);
        }

        if !regions::is_valid(self.get(Field::State)) {
            errors.insert(Field::State, REGION_UNKNOWN);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub fn parse_birth_date(value: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormState {
        let mut form = FormState::new();
        form.set(Field::LastName, "Smith");
        form
    }

    #[test]
    fn test_pristine_form_requires_last_name() {
        let errors = FormState::new()
            .validate(&ValidationRules::default())
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::LastName), Some(LAST_NAME_REQUIRED));
    }

    #[test]
    fn test_optional_last_name() {
        let rules = ValidationRules::default().without_required_last_name();
        assert!(FormState::new().validate(&rules).is_ok());
    }

    #[test]
    fn test_phone_pattern() {
        let rules = ValidationRules::default();
        let mut form = filled();
        form.set(Field::PhoneNumber, "+14165550101");
        assert!(form.validate(&rules).is_ok());

        for bad in ["4165550101", "+1416555010", "+141655501012", "+2416555010a"] {
            form.set(Field::PhoneNumber, bad);
            let errors = form.validate(&rules).unwrap_err();
            assert_eq!(errors.get(Field::PhoneNumber), Some(PHONE_FORMAT), "{bad}");
        }
    }

    #[test]
    fn test_default_postal_pattern() {
        let rules = ValidationRules::default();
        let mut form = filled();
        for good in ["M5H 2N2", "m5h2n2", "K1A 0A9"] {
            form.set(Field::ZipCode, good);
            assert!(form.validate(&rules).is_ok(), "{good}");
        }
        for bad in ["12345", "M5H-2N2", "M5H 2N"] {
            form.set(Field::ZipCode, bad);
            assert_eq!(
                form.validate(&rules).unwrap_err().get(Field::ZipCode),
                Some(POSTAL_FORMAT),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_configured_postal_pattern() {
        let rules = ValidationRules::new(r"^\d{5}$").unwrap();
        let mut form = filled();
        form.set(Field::ZipCode, "90210");
        assert!(form.validate(&rules).is_ok());
        form.set(Field::ZipCode, "M5H 2N2");
        assert!(form.validate(&rules).is_err());
    }

    #[test]
    fn test_invalid_postal_pattern_is_error() {
        assert!(ValidationRules::new("(").is_err());
    }

    #[test]
    fn test_birth_date_format() {
        let rules = ValidationRules::default();
        let mut form = filled();
        form.set(Field::DateOfBirth, "1988-04-12");
        assert!(form.validate(&rules).is_ok());
        form.set(Field::DateOfBirth, "1988-02-30");
        assert_eq!(
            form.validate(&rules).unwrap_err().get(Field::DateOfBirth),
            Some(DATE_FORMAT)
        );
        form.set(Field::DateOfBirth, "12/04/1988");
        assert!(form.validate(&rules).is_err());
    }

    #[test]
    fn test_region_must_be_known() {
        let rules = ValidationRules::default();
        let mut form = filled();
        form.set(Field::State, "ON");
        assert!(form.validate(&rules).is_ok());
        form.set(Field::State, "CA");
        assert!(form.validate(&rules).unwrap_err().get(Field::State).is_some());
    }

    #[test]
    fn test_from_contact_blanks_unknown_region() {
        let contact = Contact {
            last_name: "Smith".into(),
            city: "Toronto".into(),
            state: "CA".into(),
            ..Default::default()
        };
        let form = FormState::from_contact(&contact);
        assert_eq!(form.get(Field::State), "");
        assert_eq!(form.get(Field::City), "Toronto");
        assert!(form.validate(&ValidationRules::default()).is_ok());
    }

    #[test]
    fn test_from_contact_copies_all_fields() {
        let contact = Contact {
            first_name: "Emily".into(),
            last_name: "Smith".into(),
            date_of_birth: "1988-04-12".into(),
            email: "emily@example.com".into(),
            phone_number: "+14165550101".into(),
            address: "12 Queen St W".into(),
            city: "Toronto".into(),
            state: "ON".into(),
            zip_code: "M5H 2N2".into(),
        };
        let form = FormState::from_contact(&contact);
        for field in Field::ALL {
            assert_eq!(form.get(field), contact.get(field));
        }
    }

    #[test]
    fn test_criteria_skips_blank_fields() {
        let mut form = filled();
        form.set(Field::City, "TOR");
        let criteria = form.criteria();
        let active: Vec<_> = criteria.active().collect();
        assert_eq!(active, vec![(Field::LastName, "smith"), (Field::City, "tor")]);
    }

    #[test]
    fn test_errors_display() {
        let errors = FormState::new()
            .validate(&ValidationRules::default())
            .unwrap_err();
        assert_eq!(errors.to_string(), "Last Name: Last Name is required");
    }
}
