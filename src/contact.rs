use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const BUNDLED_CONTACTS: &str = include_str!("../data/contacts.json");

/// A single contact. Every field is a plain string; missing keys in the
/// source data load as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Field identifiers, in the order the search form shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FirstName,
    LastName,
    DateOfBirth,
    Email,
    PhoneNumber,
    Address,
    City,
    State,
    ZipCode,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::FirstName,
        Field::LastName,
        Field::DateOfBirth,
        Field::Email,
        Field::PhoneNumber,
        Field::Address,
        Field::City,
        Field::State,
        Field::ZipCode,
    ];

    pub const COUNT: usize = 9;

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::DateOfBirth => "Date of Birth",
            Field::Email => "Email",
            Field::PhoneNumber => "Phone Number",
            Field::Address => "Street Address",
            Field::City => "City",
            Field::State => "State",
            Field::ZipCode => "Zip Code",
        }
    }

    /// Key used in the JSON data file.
    pub fn key(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::DateOfBirth => "dateOfBirth",
            Field::Email => "email",
            Field::PhoneNumber => "phoneNumber",
            Field::Address => "address",
            Field::City => "city",
            Field::State => "state",
            Field::ZipCode => "zipCode",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Field::FirstName => 0,
            Field::LastName => 1,
            Field::DateOfBirth => 2,
            Field::Email => 3,
            Field::PhoneNumber => 4,
            Field::Address => 5,
            Field::City => 6,
            Field::State => 7,
            Field::ZipCode => 8,
        }
    }

    /// Parse a JSON key (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }

    pub fn is_required(self) -> bool {
        matches!(self, Field::LastName)
    }
}

impl Contact {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Email => &self.email,
            Field::PhoneNumber => &self.phone_number,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::ZipCode => &self.zip_code,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read contact data at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse contact data from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Contacts compiled into the binary.
pub fn load_bundled() -> Result<Vec<Contact>, DataError> {
    parse(BUNDLED_CONTACTS, "bundled data")
}

pub fn load_file(path: &Path) -> Result<Vec<Contact>, DataError> {
    let raw = fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw, &path.display().to_string())
}

/// Load from `path` when given, otherwise the bundled list.
pub fn load(path: Option<&Path>) -> Result<Vec<Contact>, DataError> {
    let contacts = match path {
        Some(path) => load_file(path)?,
        None => load_bundled()?,
    };
    tracing::info!(
        count = contacts.len(),
        source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "bundled".into()),
        "loaded contacts"
    );
    Ok(contacts)
}

fn parse(raw: &str, origin: &str) -> Result<Vec<Contact>, DataError> {
    serde_json::from_str(raw).map_err(|source| DataError::Parse {
        origin: origin.to_string(),
        source,
    })
}
