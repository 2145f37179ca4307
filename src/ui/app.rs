use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::{Config, UiColors};
use crate::contact::{Contact, Field};
use crate::form::FormErrors;
use crate::pagination::Pager;
use crate::search;
use crate::selection::Selection;

use super::draw;
use super::edit::FormEditor;
use super::panes::{self, Focus};

#[derive(Debug, Clone, Default)]
pub struct HelpModal {
    pub scroll: usize,
}

#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<HelpEntry>,
}

#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub action: &'static str,
    pub keys: String,
}

pub struct App<'a> {
    config: &'a Config,
    /// Every loaded contact; never modified.
    contacts: Vec<Contact>,
    /// Output of the last search, or every contact after a reset.
    pub results: Vec<Contact>,
    pub pager: Pager,
    pub selection: Selection,
    pub editor: FormEditor,
    pub errors: FormErrors,
    pub focus: Focus,
    pub form_field: Field,
    /// Highlighted row within the current page.
    pub cursor: usize,
    pub status: Option<String>,
    pub help_modal: Option<HelpModal>,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, contacts: Vec<Contact>) -> Self {
        Self {
            config,
            results: contacts.clone(),
            contacts,
            pager: Pager::new(config.page_size),
            selection: Selection::new(),
            editor: FormEditor::default(),
            errors: FormErrors::default(),
            focus: Focus::Form,
            form_field: Field::FirstName,
            cursor: 0,
            status: None,
            help_modal: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            draw::render(terminal, self)?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Dispatch one key. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Ok(true);
        }

        if self.help_modal.is_some() {
            self.handle_help_modal_key(key);
            return Ok(false);
        }

        let config = self.config;
        let global = &config.keys.global;
        if self.key_matches_any(&key, &global.quit) {
            return Ok(true);
        }
        if self.key_matches_any(&key, &global.help) {
            self.help_modal = Some(HelpModal::default());
            return Ok(false);
        }
        if self.key_matches_any(&key, &global.reset) {
            self.reset();
            return Ok(false);
        }

        match self.focus {
            Focus::Form => {
                self.handle_form_key(key);
                Ok(false)
            }
            Focus::Results => self.handle_results_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.form;

        if self.key_matches_any(&key, &keys.submit) {
            self.submit();
            return;
        }
        if self.key_matches_any(&key, &keys.focus_results) {
            self.focus = self.focus.toggle();
            return;
        }
        if self.key_matches_any(&key, &keys.next) {
            self.form_field = panes::next_field(self.form_field);
            return;
        }
        if self.key_matches_any(&key, &keys.prev) {
            self.form_field = panes::prev_field(self.form_field);
            return;
        }
        if self.form_field == Field::State {
            if self.key_matches_any(&key, &keys.region_next) {
                self.editor.cycle_region(1);
            } else if self.key_matches_any(&key, &keys.region_prev) {
                self.editor.cycle_region(-1);
            }
            return;
        }

        self.editor.handle_key_event(self.form_field, key);
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Result<bool> {
        let config = self.config;
        let keys = &config.keys.results;

        if self.key_matches_any(&key, &keys.quit) {
            return Ok(true);
        }
        if self.key_matches_any(&key, &keys.back) {
            self.focus = self.focus.toggle();
            return Ok(false);
        }
        if self.key_matches_any(&key, &keys.next) {
            self.move_cursor(1);
            return Ok(false);
        }
        if self.key_matches_any(&key, &keys.prev) {
            self.move_cursor(-1);
            return Ok(false);
        }
        if self.key_matches_any(&key, &keys.page_next) {
            self.next_page();
            return Ok(false);
        }
        if self.key_matches_any(&key, &keys.page_prev) {
            self.prev_page();
            return Ok(false);
        }
        if self.key_matches_any(&key, &keys.toggle) {
            self.toggle_current();
            return Ok(false);
        }
        Ok(false)
    }

    fn handle_help_modal_key(&mut self, key: KeyEvent) {
        let close = self.key_matches_any(&key, &self.config.keys.global.help)
            || matches!(key.code, KeyCode::Esc | KeyCode::Char('q'));
        if close {
            self.help_modal = None;
            return;
        }
        if let Some(modal) = self.help_modal.as_mut() {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => modal.scroll = modal.scroll.saturating_add(1),
                KeyCode::Char('k') | KeyCode::Up => modal.scroll = modal.scroll.saturating_sub(1),
                _ => {}
            }
        }
    }

    /// Validate the form and, when it passes, replace the results with the
    /// matching contacts.
    pub fn submit(&mut self) {
        let form = self.editor.state();
        match form.validate(&self.config.validation) {
            Err(errors) => {
                tracing::debug!(errors = %errors, "search form rejected");
                self.set_status(format!("{} field(s) need attention", errors.len()));
                self.errors = errors;
            }
            Ok(()) => {
                self.errors = FormErrors::default();
                let criteria = form.criteria();
                self.results = search::filter(&self.contacts, &criteria);
                self.pager.reset();
                self.cursor = 0;
                tracing::info!(
                    criteria = criteria.active().count(),
                    matched = self.results.len(),
                    "search submitted"
                );
                self.set_status(format!("{} contact(s) found", self.results.len()));
            }
        }
    }

    /// Clear the form and selection and show every contact again.
    pub fn reset(&mut self) {
        self.editor.clear();
        self.selection.clear();
        self.errors = FormErrors::default();
        self.results = self.contacts.clone();
        self.pager.reset();
        self.cursor = 0;
        self.form_field = Field::FirstName;
        self.set_status("Form reset");
        tracing::info!("search form reset");
    }

    pub fn current_page(&self) -> &[Contact] {
        self.pager.slice(&self.results)
    }

    pub fn current_contact(&self) -> Option<&Contact> {
        self.current_page().get(self.cursor)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.current_page().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let index = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = index as usize;
    }

    pub fn next_page(&mut self) {
        if self.pager.next(self.results.len()) {
            self.cursor = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.pager.prev(self.results.len()) {
            self.cursor = 0;
        }
    }

    /// Check the highlighted row, or uncheck it when it is already the
    /// active selection.
    pub fn toggle_current(&mut self) {
        let Some(contact) = self.current_contact().cloned() else {
            self.set_status("No contact on this page");
            return;
        };
        let checked = !self.selection.is_selected(&contact);
        let form = self.selection.select(checked, &contact);
        self.editor.load(&form);
        self.errors = FormErrors::default();
        if checked {
            self.set_status(format!("Selected {}", contact.display_name()));
        } else {
            self.set_status("Selection cleared");
        }
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }

    pub fn help_entries(&self) -> Vec<HelpSection> {
        let keys = &self.config.keys;
        vec![
            HelpSection {
                title: "GLOBAL",
                entries: vec![
                    HelpEntry { action: "Quit", keys: format!("Ctrl+C, {}", join(&keys.global.quit)) },
                    HelpEntry { action: "Help", keys: join(&keys.global.help) },
                    HelpEntry { action: "Reset form", keys: join(&keys.global.reset) },
                ],
            },
            HelpSection {
                title: "SEARCH FORM",
                entries: vec![
                    HelpEntry { action: "Next field", keys: join(&keys.form.next) },
                    HelpEntry { action: "Previous field", keys: join(&keys.form.prev) },
                    HelpEntry { action: "Search", keys: join(&keys.form.submit) },
                    HelpEntry { action: "Go to results", keys: join(&keys.form.focus_results) },
                    HelpEntry { action: "Next region", keys: join(&keys.form.region_next) },
                    HelpEntry { action: "Previous region", keys: join(&keys.form.region_prev) },
                ],
            },
            HelpSection {
                title: "RESULTS",
                entries: vec![
                    HelpEntry { action: "Next row", keys: join(&keys.results.next) },
                    HelpEntry { action: "Previous row", keys: join(&keys.results.prev) },
                    HelpEntry { action: "Next page", keys: join(&keys.results.page_next) },
                    HelpEntry { action: "Previous page", keys: join(&keys.results.page_prev) },
                    HelpEntry { action: "Select / deselect", keys: join(&keys.results.toggle) },
                    HelpEntry { action: "Back to form", keys: join(&keys.results.back) },
                    HelpEntry { action: "Quit", keys: join(&keys.results.quit) },
                ],
            },
        ]
    }

    /// Check if the key event matches any of the bindings in the list
    fn key_matches_any(&self, event: &KeyEvent, bindings: &[String]) -> bool {
        bindings.iter().any(|b| key_matches_single(event, b))
    }
}

fn join(bindings: &[String]) -> String {
    bindings.join(", ")
}

/// Check if the key event matches a single binding string
fn key_matches_single(event: &KeyEvent, binding: &str) -> bool {
    let trimmed = binding.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Ctrl/Alt/Super combinations are never bound
    let disallowed = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    if event.modifiers.intersects(disallowed) {
        return false;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "enter" => matches!(event.code, KeyCode::Enter),
        "tab" => matches!(event.code, KeyCode::Tab),
        "backtab" | "shift+tab" => matches!(event.code, KeyCode::BackTab),
        "backspace" => matches!(event.code, KeyCode::Backspace),
        "esc" | "escape" => matches!(event.code, KeyCode::Esc),
        "space" => matches!(event.code, KeyCode::Char(' ')),
        "up" => matches!(event.code, KeyCode::Up),
        "down" => matches!(event.code, KeyCode::Down),
        "left" => matches!(event.code, KeyCode::Left),
        "right" => matches!(event.code, KeyCode::Right),
        "pageup" | "page_up" => matches!(event.code, KeyCode::PageUp),
        "pagedown" | "page_down" => matches!(event.code, KeyCode::PageDown),
        "home" => matches!(event.code, KeyCode::Home),
        "end" => matches!(event.code, KeyCode::End),
        name if name.len() > 1 && name.starts_with('f') => name[1..]
            .parse::<u8>()
            .map(|n| matches!(event.code, KeyCode::F(f) if f == n))
            .unwrap_or(false),
        // Single character - case-sensitive (m != M, since M requires Shift)
        _ => {
            let mut chars = trimmed.chars();
            if let (Some(first), None) = (chars.next(), chars.next()) {
                matches!(event.code, KeyCode::Char(c) if c == first)
            } else {
                false
            }
        }
    }
}
