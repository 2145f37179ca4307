use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::line::NORMAL as LINE;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use ratatui::{Frame, Terminal};

use crate::config::RgbColor;
use crate::contact::{Contact, Field};

use super::app::App;
use super::panes::{Column, Focus, FORM_ROWS};

const FORM_HELP: &str = "Tab/Up/Down: field  Enter: search  F2: results  F5: reset  F1: help";
const REGION_HELP: &str = "Left/Right: change region  Enter: search  F2: results";
const RESULTS_HELP: &str = "j/k: row  h/l: page  Space: select  Esc: form  q: quit";
const HELP_MODAL_FOOTER: &str = "j/k: scroll  Esc/q: close";
const EMPTY_RESULTS: &str = "No contacts match";

/// Two lines per field (label, value) plus the block border.
const FORM_HEIGHT: u16 = FORM_ROWS.len() as u16 * 2 + 2;

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(FORM_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    draw_form(frame, layout[1], app);
    draw_results(frame, layout[2], app);
    draw_pager(frame, layout[3], app);
    draw_footer(frame, layout[4], app);
    draw_help_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "CHOOSE A CONTACT",
        header_text_style(app).add_modifier(Modifier::BOLD),
    )];
    if let Some(active) = app.selection.active() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("selected: {}", active.display_name()),
            selection_style(app),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_form(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focus == Focus::Form;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, active))
        .title(Span::styled(Focus::Form.title(), header_text_style(app)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(FORM_ROWS.iter().map(|_| Constraint::Length(2)))
        .split(inner);

    for (row_area, fields) in rows.iter().zip(FORM_ROWS.iter()) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(fields.iter().map(|_| Constraint::Fill(1)))
            .spacing(2)
            .split(*row_area);
        for (cell, field) in cells.iter().zip(fields.iter()) {
            draw_form_field(frame, *cell, app, *field);
        }
    }
}

fn draw_form_field(frame: &mut Frame<'_>, area: Rect, app: &App, field: Field) {
    if area.width == 0 || area.height < 2 {
        return;
    }
    let focused = app.focus == Focus::Form && app.form_field == field;

    let mut label = Vec::new();
    if field.is_required() {
        label.push(Span::styled("*", error_style(app)));
    }
    label.push(Span::styled(field.label(), header_text_style(app)));
    if let Some(message) = app.errors.get(field) {
        label.push(Span::raw(" "));
        label.push(Span::styled(message.to_string(), error_style(app)));
    }
    let label_area = Rect { height: 1, ..area };
    frame.render_widget(Paragraph::new(Line::from(label)), label_area);

    let value_area = Rect {
        y: area.y + 1,
        height: 1,
        ..area
    };
    let value_style = if focused {
        selection_style(app)
    } else if app.errors.get(field).is_some() {
        error_style(app)
    } else {
        Style::default().add_modifier(Modifier::UNDERLINED)
    };

    let value = app.editor.value(field);
    if field == Field::State {
        let shown = if value.is_empty() { "--" } else { value };
        let text = format!("< {} >", shown);
        frame.render_widget(Paragraph::new(text).style(value_style), value_area);
        return;
    }

    // Keep the cursor visible in narrow fields.
    let cursor = app.editor.visual_cursor(field);
    let width = value_area.width as usize;
    let offset = cursor.saturating_sub(width.saturating_sub(1));
    let padded = format!("{:<width$}", value, width = width);
    frame.render_widget(
        Paragraph::new(padded)
            .style(value_style)
            .scroll((0, offset as u16)),
        value_area,
    );

    if focused {
        let x = value_area.x.saturating_add((cursor - offset) as u16);
        frame.set_cursor_position((x, value_area.y));
    }
}

fn draw_results(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focus == Focus::Results;
    let title = format!("{} ({})", Focus::Results.title(), app.results.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, active))
        .title(Span::styled(title, header_text_style(app)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let page = app.current_page();
    if page.is_empty() {
        let message = Line::styled(EMPTY_RESULTS, header_text_style(app));
        let area = centered_row(inner, message.width());
        frame.render_widget(Paragraph::new(message), area);
        return;
    }

    let header = Row::new(Column::ALL.iter().map(|c| Cell::from(c.title())))
        .style(header_text_style(app).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = page
        .iter()
        .map(|contact| {
            let checked = app.selection.is_selected(contact);
            Row::new(
                Column::ALL
                    .iter()
                    .map(|column| Cell::from(column_text(*column, contact, checked))),
            )
        })
        .collect();
    let widths = Column::ALL.iter().map(|c| c.constraint());

    let mut table = Table::new(rows, widths).header(header).column_spacing(2);
    let mut state = TableState::default();
    if active {
        table = table.highlight_style(selection_style(app));
        state.select(Some(app.cursor));
    }
    frame.render_stateful_widget(table, inner, &mut state);
}

fn column_text(column: Column, contact: &Contact, checked: bool) -> String {
    match column {
        Column::Selected => if checked { "[x]" } else { "[ ]" }.to_string(),
        Column::Name => contact.display_name(),
        Column::DateOfBirth => contact.date_of_birth.clone(),
        Column::Address => contact.address.clone(),
        Column::City => contact.city.clone(),
        Column::State => contact.state.clone(),
        Column::ZipCode => contact.zip_code.clone(),
        Column::Email => contact.email.clone(),
        Column::Phone => contact.phone_number.clone(),
    }
}

fn draw_pager(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let count = app.results.len();
    let enabled = header_text_style(app).add_modifier(Modifier::BOLD);
    let disabled = Style::default().add_modifier(Modifier::DIM);

    let line = Line::from(vec![
        Span::styled(
            "◀ Previous",
            if app.pager.can_prev(count) { enabled } else { disabled },
        ),
        Span::raw("    "),
        Span::raw(app.pager.label(count)),
        Span::raw("    "),
        Span::styled(
            "Next ▶",
            if app.pager.can_next(count) { enabled } else { disabled },
        ),
    ]);
    let area = centered_row(area, line.width());
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let hint = match app.focus {
        Focus::Form if app.form_field == Field::State => REGION_HELP,
        Focus::Form => FORM_HELP,
        Focus::Results => RESULTS_HELP,
    };
    let message = match &app.status {
        Some(status) => format!("{}  |  {}", status, hint),
        None => hint.to_string(),
    };

    let colors = app.ui_colors();
    let style = Style::default()
        .fg(color(colors.status_fg))
        .bg(color(colors.status_bg));

    let background = Block::default().style(Style::default().bg(color(colors.status_bg)));
    frame.render_widget(background, area);
    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn draw_help_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    if app.help_modal.is_none() {
        return;
    }

    let width = area.width.saturating_mul(2).saturating_div(3).max(40).min(area.width);
    let height = area.height.saturating_mul(4).saturating_div(5).max(10).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let modal_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, modal_area);

    let header_style = header_text_style(app);
    let content_width = width.saturating_sub(2) as usize;
    let action_width = 20usize;

    let sections = app.help_entries();
    let mut lines: Vec<Line> = Vec::new();
    for (section_idx, section) in sections.iter().enumerate() {
        let header_text = format!(" {} ", section.title);
        let padding_total = content_width.saturating_sub(header_text.len());
        let left_pad = padding_total / 2;
        let right_pad = padding_total - left_pad;
        lines.push(Line::from(Span::styled(
            format!(
                "{}{}{}",
                LINE.horizontal.repeat(left_pad),
                header_text,
                LINE.horizontal.repeat(right_pad)
            ),
            header_style,
        )));

        for entry in &section.entries {
            lines.push(Line::from(vec![
                Span::raw(format!("{:<width$}", entry.action, width = action_width)),
                Span::styled(entry.keys.clone(), header_style),
            ]));
        }

        if section_idx < sections.len() - 1 {
            lines.push(Line::from(""));
        }
    }

    // borders (2) + footer line (1)
    let viewport = height.saturating_sub(3) as usize;
    let max_scroll = lines.len().saturating_sub(viewport);
    let scroll = match app.help_modal.as_mut() {
        Some(modal) => {
            modal.scroll = modal.scroll.min(max_scroll);
            modal.scroll
        }
        None => 0,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true))
        .title(Span::styled("HELP", header_style));
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    if inner.height == 0 {
        return;
    }
    let body = Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    };
    let footer = Rect {
        y: inner.y + inner.height.saturating_sub(1),
        height: 1,
        ..inner
    };

    let visible: Vec<Line> = lines.into_iter().skip(scroll).take(viewport).collect();
    frame.render_widget(Paragraph::new(visible), body);
    let footer = centered_row(footer, HELP_MODAL_FOOTER.len());
    frame.render_widget(
        Paragraph::new(HELP_MODAL_FOOTER).style(header_style),
        footer,
    );
}

/// One-line rect of `width` cells centered horizontally in `area`.
fn centered_row(area: Rect, width: usize) -> Rect {
    let width = (width.min(u16::MAX as usize) as u16).min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        height: area.height.min(1),
        ..area
    }
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn border_style(app: &App, active: bool) -> Style {
    let colors = app.ui_colors();
    let style = Style::default().fg(color(colors.border));
    if active {
        style.add_modifier(Modifier::BOLD)
    } else {
        style.add_modifier(Modifier::DIM)
    }
}

fn header_text_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.header))
}

fn error_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    /// Screen text with trailing blanks and empty rows dropped.
    fn buffer_to_string(buffer: &Buffer) -> String {
        let area = buffer.area();
        let mut lines = Vec::new();

        for y in area.top()..area.bottom() {
            let mut line = String::new();
            for x in area.left()..area.right() {
                line.push_str(buffer[(x, y)].symbol());
            }
            let trimmed = line.trim_end();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }

        lines.join("\n")
    }

    fn create_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(width, height)).unwrap()
    }

    fn render_screen(app: &mut App, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = create_terminal(width, height);
        render(&mut terminal, app).unwrap();
        terminal
    }

    #[allow(clippy::too_many_arguments)]
    fn person(
        first: &str,
        last: &str,
        dob: &str,
        address: &str,
        city: &str,
        state: &str,
        zip: &str,
        email: &str,
        phone: &str,
    ) -> Contact {
        Contact {
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: dob.into(),
            address: address.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip.into(),
            email: email.into(),
            phone_number: phone.into(),
        }
    }

    fn pioneers() -> Vec<Contact> {
        vec![
            person("Ada", "Lovelace", "1815-12-10", "12 Queen St", "Toronto", "ON", "M5H 2N2", "ada@example.com", "+14165550101"),
            person("Alan", "Turing", "1912-06-23", "4 King St", "Ottawa", "ON", "K1P 1J1", "alan@example.com", "+16135550102"),
            person("Grace", "Hopper", "1906-12-09", "9 Bay Rd", "Halifax", "NS", "B3H 1A1", "grace@example.com", "+19025550103"),
            person("Linus", "Torvalds", "1969-12-28", "7 Elm Ave", "Regina", "SK", "S4P 3Y2", "linus@example.com", "+13065550104"),
            person("Edsger", "Dijkstra", "1930-05-11", "2 Pine Cres", "Calgary", "AB", "T2P 1J9", "edsger@example.com", "+14035550105"),
            person("Barbara", "Liskov", "1939-11-07", "5 Oak Dr", "Winnipeg", "MB", "R3C 4T3", "bl@example.com", "+12045550106"),
            person("Ken", "Thompson", "1943-02-04", "3 Main St", "Montreal", "QC", "H3B 1A7", "ken@example.com", "+15145550107"),
        ]
    }

    fn pager_cell_has_dim(buffer: &Buffer, y: u16, symbol: &str) -> bool {
        let area = buffer.area();
        (area.left()..area.right())
            .map(|x| &buffer[(x, y)])
            .find(|cell| cell.symbol() == symbol)
            .map(|cell| cell.modifier.contains(Modifier::DIM))
            .unwrap_or(false)
    }

    #[test]
    fn test_first_page_snapshot() {
        let config = Config::default();
        let mut app = App::new(&config, pioneers());
        let terminal = render_screen(&mut app, 120, 22);
        let buffer = terminal.backend().buffer();

        insta::assert_snapshot!("first_page", buffer_to_string(buffer));
        assert!(pager_cell_has_dim(buffer, 20, "◀"));
        assert!(!pager_cell_has_dim(buffer, 20, "▶"));
    }

    #[test]
    fn test_empty_results_snapshot() {
        let config = Config::default();
        let mut app = App::new(&config, Vec::new());
        let terminal = render_screen(&mut app, 120, 22);
        let buffer = terminal.backend().buffer();

        insta::assert_snapshot!("empty_results", buffer_to_string(buffer));
        assert!(pager_cell_has_dim(buffer, 20, "◀"));
        assert!(pager_cell_has_dim(buffer, 20, "▶"));
    }

    #[test]
    fn test_validation_errors_with_selection_snapshot() {
        let config = Config::default();
        let mut app = App::new(&config, pioneers());
        app.focus = Focus::Results;
        app.toggle_current();
        app.editor.clear();
        for c in "123".chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            app.editor.handle_key_event(Field::PhoneNumber, key);
        }
        app.submit();

        let terminal = render_screen(&mut app, 120, 22);
        insta::assert_snapshot!(
            "validation_errors_with_selection",
            buffer_to_string(terminal.backend().buffer())
        );
    }

    #[test]
    fn test_help_modal_snapshot() {
        let config = Config::default();
        let mut app = App::new(&config, pioneers());
        app.help_modal = Some(Default::default());
        let terminal = render_screen(&mut app, 120, 30);
        insta::assert_snapshot!("help_modal", buffer_to_string(terminal.backend().buffer()));
    }

    #[test]
    fn test_help_modal_scroll_is_clamped() {
        let config = Config::default();
        let mut app = App::new(&config, pioneers());
        app.help_modal = Some(crate::ui::app::HelpModal { scroll: 99 });
        render_screen(&mut app, 120, 22);
        // 21 help lines in a 14 line viewport
        assert_eq!(app.help_modal.as_ref().map(|m| m.scroll), Some(7));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let config = Config::default();
        let mut app = App::new(&config, pioneers());
        app.help_modal = Some(Default::default());
        render_screen(&mut app, 10, 5);
    }
}
