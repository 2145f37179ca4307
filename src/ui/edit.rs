use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::contact::Field;
use crate::form::FormState;
use crate::regions;

/// Line editors backing the search form, one per field. The region field is
/// never edited as text; it only changes through [`FormEditor::cycle_region`].
#[derive(Default)]
pub struct FormEditor {
    inputs: [Input; Field::COUNT],
}

impl FormEditor {
    pub fn load(&mut self, form: &FormState) {
        for field in Field::ALL {
            self.inputs[field.index()] = Input::new(form.get(field).to_string());
        }
    }

    pub fn clear(&mut self) {
        for input in &mut self.inputs {
            input.reset();
        }
    }

    pub fn state(&self) -> FormState {
        let mut form = FormState::new();
        for field in Field::ALL {
            form.set(field, self.value(field));
        }
        form
    }

    pub fn value(&self, field: Field) -> &str {
        self.inputs[field.index()].value()
    }

    pub fn visual_cursor(&self, field: Field) -> usize {
        self.inputs[field.index()].visual_cursor()
    }

    pub fn cycle_region(&mut self, delta: isize) {
        let next = regions::cycle(self.value(Field::State), delta);
        self.inputs[Field::State.index()] = Input::new(next.to_string());
    }

    /// Returns true when the key was consumed by the field's editor.
    pub fn handle_key_event(&mut self, field: Field, key: KeyEvent) -> bool {
        if field == Field::State {
            return false;
        }
        self.inputs[field.index()]
            .handle_event(&Event::Key(key))
            .is_some()
    }
}
