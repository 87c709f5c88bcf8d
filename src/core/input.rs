//! Key events and raw sequence decoding.

use std::borrow::Cow;
use std::fmt;
use std::ops::BitOr;

const MOD_SHIFT: u8 = 1;
const MOD_ALT: u8 = 2;
const MOD_CTRL: u8 = 4;

/// Modifier set attached to a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(MOD_SHIFT);
    pub const ALT: Modifiers = Modifiers(MOD_ALT);
    pub const CONTROL: Modifiers = Modifiers(MOD_CTRL);

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Decodes the xterm modifier parameter (`1 + bitmask`) used in CSI sequences.
    fn from_xterm_param(param: u8) -> Modifiers {
        let bits = param.saturating_sub(1);
        Modifiers(bits & (MOD_SHIFT | MOD_ALT | MOD_CTRL))
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// Physical key identity, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Tab,
    Enter,
    Escape,
    Spacebar,
    PageUp,
    PageDown,
    End,
    Home,
    LeftArrow,
    UpArrow,
    RightArrow,
    DownArrow,
    Insert,
    Delete,
    F(u8),
    /// A character key. Letters are stored lower-case; the event's
    /// `character` carries the typed case.
    Char(char),
}

impl Key {
    /// Canonical key name used in chord strings.
    pub fn name(&self) -> Cow<'static, str> {
        let name = match self {
            Key::Backspace => "Backspace",
            Key::Tab => "Tab",
            Key::Enter => "Enter",
            Key::Escape => "Escape",
            Key::Spacebar => "Spacebar",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::End => "End",
            Key::Home => "Home",
            Key::LeftArrow => "LeftArrow",
            Key::UpArrow => "UpArrow",
            Key::RightArrow => "RightArrow",
            Key::DownArrow => "DownArrow",
            Key::Insert => "Insert",
            Key::Delete => "Delete",
            Key::F(n) => return Cow::Owned(format!("F{n}")),
            Key::Char(ch) if ch.is_ascii_alphabetic() => {
                return Cow::Owned(ch.to_ascii_uppercase().to_string())
            }
            Key::Char(ch) if ch.is_ascii_digit() => return Cow::Owned(format!("D{ch}")),
            Key::Char(ch) => return Cow::Owned(ch.to_string()),
        };
        Cow::Borrowed(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One key press as delivered by a terminal surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Text the key produces, if any. Control keys may carry their control code.
    pub character: Option<char>,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers, character: Option<char>) -> Self {
        Self {
            key,
            modifiers,
            character,
        }
    }

    /// Unmodified press of a named key that produces no text.
    pub fn named(key: Key) -> Self {
        Self::new(key, Modifiers::NONE, None)
    }

    /// Press of `key` with `modifiers` and no text.
    pub fn chord(key: Key, modifiers: Modifiers) -> Self {
        Self::new(key, modifiers, None)
    }

    /// Key event that types `ch`.
    pub fn from_char(ch: char) -> Self {
        match ch {
            '\r' | '\n' => Self::new(Key::Enter, Modifiers::NONE, Some('\r')),
            '\t' => Self::new(Key::Tab, Modifiers::NONE, Some('\t')),
            ' ' => Self::new(Key::Spacebar, Modifiers::NONE, Some(' ')),
            c if c.is_ascii_uppercase() => {
                Self::new(Key::Char(c.to_ascii_lowercase()), Modifiers::SHIFT, Some(c))
            }
            c => Self::new(Key::Char(c), Modifiers::NONE, Some(c)),
        }
    }

    /// Control+letter chord carrying its control code.
    pub fn ctrl(letter: char) -> Self {
        let lower = letter.to_ascii_lowercase();
        let code = (lower as u32).wrapping_sub(96);
        let character = if (1..=26).contains(&code) {
            char::from_u32(code)
        } else {
            None
        };
        Self::new(Key::Char(lower), Modifiers::CONTROL, character)
    }
}

/// Decodes one complete terminal input sequence into a key event.
///
/// Returns `None` for sequences that do not map to a key (mouse reports,
/// unrecognized CSI finals, stray responses).
pub fn parse_key_event(data: &str) -> Option<KeyEvent> {
    if let Some(event) = legacy_sequence_key(data) {
        return Some(event);
    }

    let mut chars = data.chars();
    let first = chars.next()?;
    let rest = chars.as_str();

    if first == '\x1b' {
        if rest.is_empty() {
            return Some(KeyEvent::new(Key::Escape, Modifiers::NONE, Some('\x1b')));
        }
        if let Some(body) = rest.strip_prefix('[') {
            return parse_csi(body);
        }
        if let Some(body) = rest.strip_prefix('O') {
            return parse_ss3(body);
        }
        // ESC-prefixed single key: Alt chord.
        let mut inner = rest.chars();
        let ch = inner.next()?;
        if inner.next().is_some() {
            return None;
        }
        let base = parse_single(ch)?;
        return Some(KeyEvent::new(
            base.key,
            base.modifiers | Modifiers::ALT,
            base.character,
        ));
    }

    if !rest.is_empty() {
        return None;
    }
    parse_single(first)
}

fn parse_single(ch: char) -> Option<KeyEvent> {
    let event = match ch {
        '\r' | '\n' => KeyEvent::new(Key::Enter, Modifiers::NONE, Some('\r')),
        '\t' => KeyEvent::new(Key::Tab, Modifiers::NONE, Some('\t')),
        '\x7f' => KeyEvent::new(Key::Backspace, Modifiers::NONE, Some('\x7f')),
        '\x00' => KeyEvent::new(Key::Spacebar, Modifiers::CONTROL, Some('\x00')),
        '\x1b' => KeyEvent::new(Key::Escape, Modifiers::NONE, Some('\x1b')),
        c if ('\x01'..='\x1a').contains(&c) => {
            let letter = char::from_u32(c as u32 + 96)?;
            KeyEvent::new(Key::Char(letter), Modifiers::CONTROL, Some(c))
        }
        c if c.is_control() => return None,
        c => KeyEvent::from_char(c),
    };
    Some(event)
}

fn parse_csi(body: &str) -> Option<KeyEvent> {
    let final_char = body.chars().last()?;
    let params = &body[..body.len() - final_char.len_utf8()];
    let mut fields = params.split(';');
    let first = fields.next().unwrap_or("");
    let modifiers = fields
        .next()
        .and_then(|value| value.parse::<u8>().ok())
        .map(Modifiers::from_xterm_param)
        .unwrap_or(Modifiers::NONE);

    let key = match final_char {
        'A' => Key::UpArrow,
        'B' => Key::DownArrow,
        'C' => Key::RightArrow,
        'D' => Key::LeftArrow,
        'H' => Key::Home,
        'F' => Key::End,
        'P' => Key::F(1),
        'Q' => Key::F(2),
        'R' => Key::F(3),
        'S' => Key::F(4),
        'Z' => return Some(KeyEvent::chord(Key::Tab, Modifiers::SHIFT)),
        '~' => tilde_key(first.parse::<u8>().ok()?)?,
        _ => return None,
    };
    if final_char != '~' && !first.is_empty() && first != "1" {
        return None;
    }
    Some(KeyEvent::chord(key, modifiers))
}

fn parse_ss3(body: &str) -> Option<KeyEvent> {
    let key = match body {
        "A" => Key::UpArrow,
        "B" => Key::DownArrow,
        "C" => Key::RightArrow,
        "D" => Key::LeftArrow,
        "H" => Key::Home,
        "F" => Key::End,
        "P" => Key::F(1),
        "Q" => Key::F(2),
        "R" => Key::F(3),
        "S" => Key::F(4),
        "M" => return Some(KeyEvent::new(Key::Enter, Modifiers::NONE, Some('\r'))),
        _ => return None,
    };
    Some(KeyEvent::named(key))
}

fn tilde_key(code: u8) -> Option<Key> {
    let key = match code {
        1 | 7 => Key::Home,
        2 => Key::Insert,
        3 => Key::Delete,
        4 | 8 => Key::End,
        5 => Key::PageUp,
        6 => Key::PageDown,
        11..=15 => Key::F(code - 10),
        17..=21 => Key::F(code - 11),
        23 | 24 => Key::F(code - 12),
        _ => return None,
    };
    Some(key)
}

fn legacy_sequence_key(data: &str) -> Option<KeyEvent> {
    let (key, modifiers) = match data {
        "\x1b[a" => (Key::UpArrow, Modifiers::SHIFT),
        "\x1b[b" => (Key::DownArrow, Modifiers::SHIFT),
        "\x1b[c" => (Key::RightArrow, Modifiers::SHIFT),
        "\x1b[d" => (Key::LeftArrow, Modifiers::SHIFT),
        "\x1bOa" => (Key::UpArrow, Modifiers::CONTROL),
        "\x1bOb" => (Key::DownArrow, Modifiers::CONTROL),
        "\x1bOc" => (Key::RightArrow, Modifiers::CONTROL),
        "\x1bOd" => (Key::LeftArrow, Modifiers::CONTROL),
        "\x1b[2$" => (Key::Insert, Modifiers::SHIFT),
        "\x1b[3$" => (Key::Delete, Modifiers::SHIFT),
        "\x1b[2^" => (Key::Insert, Modifiers::CONTROL),
        "\x1b[3^" => (Key::Delete, Modifiers::CONTROL),
        "\x1b[7$" => (Key::Home, Modifiers::SHIFT),
        "\x1b[8$" => (Key::End, Modifiers::SHIFT),
        "\x1b[7^" => (Key::Home, Modifiers::CONTROL),
        "\x1b[8^" => (Key::End, Modifiers::CONTROL),
        "\x1b[[A" => (Key::F(1), Modifiers::NONE),
        "\x1b[[B" => (Key::F(2), Modifiers::NONE),
        "\x1b[[C" => (Key::F(3), Modifiers::NONE),
        "\x1b[[D" => (Key::F(4), Modifiers::NONE),
        "\x1b[[E" => (Key::F(5), Modifiers::NONE),
        "\x1b[[5~" => (Key::PageUp, Modifiers::NONE),
        "\x1b[[6~" => (Key::PageDown, Modifiers::NONE),
        _ => return None,
    };
    Some(KeyEvent::chord(key, modifiers))
}
