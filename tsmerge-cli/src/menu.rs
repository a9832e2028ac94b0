//! Terminal list-selection menu used by the interactive conflict strategy.
//!
//! The menu is drawn on stderr in raw mode so stdout stays clean for the
//! merge summary.

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use tsmerge::{Error, Selector};

use crate::config::MenuCfg;

/// Marker and color of the highlighted option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTheme {
    pub marker: String,
    pub highlight: Color,
}

impl Default for MenuTheme {
    fn default() -> Self {
        MenuTheme {
            marker: ">".to_string(),
            highlight: Color::Cyan,
        }
    }
}

impl MenuTheme {
    pub fn from_config(config: Option<&MenuCfg>) -> Result<Self, String> {
        let mut theme = MenuTheme::default();
        let Some(config) = config else {
            return Ok(theme);
        };
        if let Some(marker) = &config.marker {
            theme.marker = marker.clone();
        }
        if let Some(name) = &config.highlight {
            theme.highlight =
                parse_color(name).ok_or_else(|| format!("Unknown menu highlight color: {}", name))?;
        }
        Ok(theme)
    }
}

fn parse_color(name: &str) -> Option<Color> {
    let color = match name.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "dark_red" => Color::DarkRed,
        "dark_green" => Color::DarkGreen,
        "dark_yellow" => Color::DarkYellow,
        "dark_blue" => Color::DarkBlue,
        "dark_magenta" => Color::DarkMagenta,
        "dark_cyan" => Color::DarkCyan,
        _ => return None,
    };
    Some(color)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Move(usize),
    Select(usize),
    Cancel,
    Ignore,
}

fn handle_key(key: KeyEvent, selected: usize, len: usize) -> MenuAction {
    if key.kind != KeyEventKind::Press || len == 0 {
        return MenuAction::Ignore;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            MenuAction::Move(selected.checked_sub(1).unwrap_or(len - 1))
        }
        KeyCode::Down | KeyCode::Char('j') => MenuAction::Move((selected + 1) % len),
        KeyCode::Home => MenuAction::Move(0),
        KeyCode::End => MenuAction::Move(len - 1),
        KeyCode::Enter => MenuAction::Select(selected),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => MenuAction::Cancel,
        KeyCode::Esc | KeyCode::Char('q') => MenuAction::Cancel,
        KeyCode::Char(c) => match c.to_digit(10) {
            Some(n) if n >= 1 && (n as usize) <= len => MenuAction::Move(n as usize - 1),
            _ => MenuAction::Ignore,
        },
        _ => MenuAction::Ignore,
    }
}

/// Plain text of every menu line; the first line is the title.
fn menu_lines(
    title: &str,
    options: &[String],
    selected: usize,
    marker: &str,
    width: usize,
) -> Vec<String> {
    let blank = " ".repeat(marker.chars().count());
    let mut lines = Vec::with_capacity(options.len() + 2);
    lines.push(truncate(title, width));
    for (index, option) in options.iter().enumerate() {
        let prefix = if index == selected { marker } else { blank.as_str() };
        lines.push(truncate(&format!("{} {}. {}", prefix, index + 1, option), width));
    }
    lines.push(truncate("↑/↓ move · Enter select · Esc cancel", width));
    lines
}

fn truncate(line: &str, width: usize) -> String {
    if width == 0 || line.chars().count() <= width {
        return line.to_string();
    }
    let mut out: String = line.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = crossterm::execute!(io::stderr(), cursor::Show);
    }
}

/// A crossterm menu on stderr.
pub struct TerminalMenu {
    theme: MenuTheme,
}

impl TerminalMenu {
    pub fn new(theme: MenuTheme) -> Self {
        TerminalMenu { theme }
    }

    fn draw(
        &self,
        out: &mut impl Write,
        lines: &[String],
        selected: usize,
        previous: u16,
    ) -> io::Result<u16> {
        if previous > 0 {
            queue!(out, cursor::MoveUp(previous), cursor::MoveToColumn(0))?;
        }
        queue!(out, terminal::Clear(ClearType::FromCursorDown))?;
        for (index, line) in lines.iter().enumerate() {
            // Option lines start at index 1.
            if index == selected + 1 {
                queue!(
                    out,
                    SetForegroundColor(self.theme.highlight),
                    Print(line),
                    ResetColor
                )?;
            } else {
                queue!(out, Print(line))?;
            }
            queue!(out, Print("\r\n"))?;
        }
        out.flush()?;
        Ok(lines.len() as u16)
    }
}

impl Selector for TerminalMenu {
    fn select(&mut self, title: &str, options: &[String]) -> Result<Option<usize>, Error> {
        if options.is_empty() {
            return Ok(None);
        }

        let mut stderr = io::stderr();
        let _guard = RawModeGuard::enable()?;
        queue!(stderr, cursor::Hide)?;

        let mut selected = 0;
        let mut drawn = 0;
        loop {
            let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
            let lines = menu_lines(title, options, selected, &self.theme.marker, width);
            drawn = self.draw(&mut stderr, &lines, selected, drawn)?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            match handle_key(key, selected, options.len()) {
                MenuAction::Move(index) => selected = index,
                MenuAction::Select(index) => {
                    tracing::debug!(title, choice = index, "menu selection");
                    return Ok(Some(index));
                }
                MenuAction::Cancel => return Ok(None),
                MenuAction::Ignore => {}
            }
        }
    }
}
