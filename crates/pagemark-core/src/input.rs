//! Discrete input events and the fixed command set.
//!
//! Events arrive either from a display surface (clicks and key presses) or
//! as text lines, one event per line:
//!
//! ```text
//! click 10 20          # primary click at display coordinates
//! click right 10 20    # secondary click (ignored by the session)
//! key e                # key press routed through the key map
//! extract              # command words
//! template 3
//! ```

use crate::error::PagemarkError;
use crate::templates::SlotId;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Extract,
    RemoveLastRegion,
    MarkUnprocessed,
    NextDocument,
    PrevDocument,
    Save,
    FlipPageForward,
    FlipPageBackward,
    SelectTemplate(SlotId),
    Quit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Extract => write!(f, "extract"),
            Command::RemoveLastRegion => write!(f, "undo"),
            Command::MarkUnprocessed => write!(f, "skip"),
            Command::NextDocument => write!(f, "next"),
            Command::PrevDocument => write!(f, "prev"),
            Command::Save => write!(f, "save"),
            Command::FlipPageForward => write!(f, "forward"),
            Command::FlipPageBackward => write!(f, "back"),
            Command::SelectTemplate(id) => write!(f, "template {id}"),
            Command::Quit => write!(f, "quit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Click { button: Button, x: f64, y: f64 },
    Key(char),
    Command(Command),
}

/// Default key bindings. Unmapped keys (and non-digit template selectors)
/// yield `None` and are ignored.
pub fn command_for_key(key: char) -> Option<Command> {
    match key {
        'e' => Some(Command::Extract),
        'u' => Some(Command::RemoveLastRegion),
        'x' => Some(Command::MarkUnprocessed),
        'n' => Some(Command::NextDocument),
        'p' => Some(Command::PrevDocument),
        's' => Some(Command::Save),
        ']' => Some(Command::FlipPageForward),
        '[' => Some(Command::FlipPageBackward),
        'q' => Some(Command::Quit),
        c => SlotId::from_digit(c).map(Command::SelectTemplate),
    }
}

/// Parse one line of the text event syntax.
///
/// Returns `Ok(None)` for blank lines, `#` comments and template numbers
/// outside 0-9, which select nothing.
pub fn parse_event(line: &str) -> Result<Option<Event>, PagemarkError> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    let words: Vec<&str> = line.split_whitespace().collect();
    let invalid = || PagemarkError::InvalidEvent(line.trim().to_string());

    let event = match words.as_slice() {
        [] => return Ok(None),
        ["click", x, y] | ["click", "left", x, y] => Event::Click {
            button: Button::Primary,
            x: parse_coord(x).ok_or_else(invalid)?,
            y: parse_coord(y).ok_or_else(invalid)?,
        },
        ["click", "right", x, y] => Event::Click {
            button: Button::Secondary,
            x: parse_coord(x).ok_or_else(invalid)?,
            y: parse_coord(y).ok_or_else(invalid)?,
        },
        ["key", key] => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Event::Key(c),
                _ => return Err(invalid()),
            }
        }
        ["template", n] => {
            let number = n.parse::<u32>().map_err(|_| invalid())?;
            match u8::try_from(number).ok().and_then(SlotId::new) {
                Some(slot) => Event::Command(Command::SelectTemplate(slot)),
                None => {
                    debug!(number, "no such template slot, ignored");
                    return Ok(None);
                }
            }
        }
        [word] => Event::Command(parse_command_word(word).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };
    Ok(Some(event))
}

fn parse_command_word(word: &str) -> Option<Command> {
    match word {
        "extract" => Some(Command::Extract),
        "undo" => Some(Command::RemoveLastRegion),
        "skip" => Some(Command::MarkUnprocessed),
        "next" => Some(Command::NextDocument),
        "prev" => Some(Command::PrevDocument),
        "save" => Some(Command::Save),
        "forward" => Some(Command::FlipPageForward),
        "back" => Some(Command::FlipPageBackward),
        "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn parse_coord(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
