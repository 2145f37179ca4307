use ratatui::layout::Constraint;

use crate::contact::Field;

/// Which half of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    /// The search form
    Form,
    /// The results table
    Results,
}

impl Focus {
    pub fn title(self) -> &'static str {
        match self {
            Focus::Form => "SEARCH FOR A CONTACT",
            Focus::Results => "SEARCH RESULTS",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Focus::Form => Focus::Results,
            Focus::Results => Focus::Form,
        }
    }
}

/// Form rows as laid out on screen. Tab order follows `Field::ALL`.
pub const FORM_ROWS: [&[Field]; 4] = [
    &[Field::FirstName, Field::LastName, Field::DateOfBirth],
    &[Field::Email, Field::PhoneNumber],
    &[Field::Address],
    &[Field::City, Field::State, Field::ZipCode],
];

/// Next field in tab order, wrapping around.
pub fn next_field(field: Field) -> Field {
    Field::ALL[(field.index() + 1) % Field::COUNT]
}

/// Previous field in tab order, wrapping around.
pub fn prev_field(field: Field) -> Field {
    Field::ALL[(field.index() + Field::COUNT - 1) % Field::COUNT]
}

/// Columns of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Selected,
    Name,
    DateOfBirth,
    Address,
    City,
    State,
    ZipCode,
    Email,
    Phone,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Selected,
        Column::Name,
        Column::DateOfBirth,
        Column::Address,
        Column::City,
        Column::State,
        Column::ZipCode,
        Column::Email,
        Column::Phone,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Column::Selected => "",
            Column::Name => "Name",
            Column::DateOfBirth => "Birth Date",
            Column::Address => "Address",
            Column::City => "City",
            Column::State => "State",
            Column::ZipCode => "Zip Code",
            Column::Email => "Email",
            Column::Phone => "Phone Number",
        }
    }

    /// Relative width used when splitting the table.
    pub fn weight(self) -> u16 {
        match self {
            Column::Selected => 0,
            Column::State => 2,
            Column::ZipCode => 3,
            Column::DateOfBirth | Column::City | Column::Phone => 4,
            Column::Name | Column::Address => 5,
            Column::Email => 6,
        }
    }

    /// The checkbox column is fixed; the rest share the remaining width.
    pub fn constraint(self) -> Constraint {
        match self {
            Column::Selected => Constraint::Length(3),
            other => Constraint::Fill(other.weight()),
        }
    }
}
