// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Raw stdin bytes in, key and paste events out. Covers what the kiosk
// keyboard produces:
//
// - ASCII and UTF-8 characters, Ctrl+letter
// - CSI and SS3 cursor/editing keys, with xterm modifier parameters
// - Alt+key as ESC followed by a character
// - Bracketed paste (`CSI 200~ ... CSI 201~`)
//
// Escape sequences can straddle reads, so unparsed bytes stay buffered.
// A lone ESC is ambiguous until more bytes arrive or time passes; the
// event loop calls [`Parser::flush`] on a quiet tick to turn it into an
// Escape key.

use bitflags::bitflags;

// ─── Events ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Text delivered between bracketed-paste delimiters.
    Paste(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Ctrl+C, which raw mode delivers as a byte instead of a signal.
    #[must_use]
    pub fn is_interrupt(&self) -> bool {
        self.code == KeyCode::Char('c') && self.modifiers.contains(Modifiers::CTRL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// xterm modifier bits; a CSI modifier parameter is `1 + bits`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes; returns every event they complete.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let rest = &self.buf[pos..];
            if self.in_paste {
                let Some(end) = find(rest, PASTE_END) else { break };
                events.push(Event::Paste(String::from_utf8_lossy(&rest[..end]).into_owned()));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }
            match parse(rest) {
                Parsed::Event(event, n) => {
                    events.push(event);
                    pos += n;
                }
                Parsed::PasteStart => {
                    self.in_paste = true;
                    pos += PASTE_START.len();
                }
                Parsed::Skip(n) => pos += n,
                Parsed::Incomplete => break,
            }
        }

        self.buf.drain(..pos);
        events
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty() && !self.in_paste
    }

    /// Resolve whatever is still buffered as literal keys: ESC becomes
    /// Escape, control bytes become Ctrl+letter, anything else is dropped.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.in_paste {
            return Vec::new();
        }
        let events = self
            .buf
            .iter()
            .filter_map(|&b| match b {
                0x1B => Some(key(KeyCode::Escape)),
                0x20..=0x7E => Some(key(KeyCode::Char(char::from(b)))),
                _ => control(b),
            })
            .collect();
        self.buf.clear();
        events
    }
}

// ─── Stateless parsing ──────────────────────────────────────────────────────

enum Parsed {
    Event(Event, usize),
    PasteStart,
    Skip(usize),
    Incomplete,
}

fn parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Incomplete;
    };
    match first {
        0x1B => parse_escape(buf),
        0x08 | 0x7F => Parsed::Event(key(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(key(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(key(KeyCode::Enter), 1),
        0x20..=0x7E => Parsed::Event(key(KeyCode::Char(char::from(first))), 1),
        0xC0..=0xF7 => parse_utf8(buf),
        b => control(b).map_or(Parsed::Skip(1), |event| Parsed::Event(event, 1)),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };
    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key_with(KeyCode::Escape, Modifiers::ALT), 2),
        0x20..=0x7E => Parsed::Event(key_with(KeyCode::Char(char::from(second)), Modifiers::ALT), 2),
        _ => Parsed::Event(key(KeyCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter and intermediate bytes, then one final byte.
    let Some(end) = buf[2..].iter().position(|b| !(0x20..=0x3F).contains(b)).map(|i| i + 2) else {
        return if PASTE_START.starts_with(buf) || buf.len() < 32 {
            Parsed::Incomplete
        } else {
            Parsed::Skip(buf.len())
        };
    };
    let consumed = end + 1;
    let last = buf[end];
    if !(0x40..=0x7E).contains(&last) {
        return Parsed::Skip(end);
    }
    if &buf[..consumed] == PASTE_START {
        return Parsed::PasteStart;
    }

    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).copied().map_or(Modifiers::empty(), decode_modifiers);

    let code = match (last, params.first().copied().unwrap_or(0)) {
        (b'A', _) => KeyCode::Up,
        (b'B', _) => KeyCode::Down,
        (b'C', _) => KeyCode::Right,
        (b'D', _) => KeyCode::Left,
        (b'H', _) | (b'~', 1 | 7) => KeyCode::Home,
        (b'F', _) | (b'~', 4 | 8) => KeyCode::End,
        (b'~', 3) => KeyCode::Delete,
        _ => return Parsed::Skip(consumed),
    };
    Parsed::Event(key_with(code, modifiers), consumed)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&last) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match last {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(key(code), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    };
    if buf.len() < len {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| Parsed::Event(key(KeyCode::Char(ch)), len))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn key(code: KeyCode) -> Event {
    key_with(code, Modifiers::empty())
}

const fn key_with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

/// Ctrl+letter for 0x01..=0x1A and Ctrl+@ for NUL.
fn control(b: u8) -> Option<Event> {
    let ch = match b {
        0x00 => '@',
        0x01..=0x1A => char::from(b'a' + b - 1),
        _ => return None,
    };
    Some(key_with(KeyCode::Char(ch), Modifiers::CTRL))
}

/// Semicolon-separated decimal parameters; empty fields are 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |n, &d| n.saturating_mul(10).saturating_add(u16::from(d - b'0')))
        })
        .collect()
}

fn decode_modifiers(param: u16) -> Modifiers {
    let bits = u8::try_from(param.saturating_sub(1)).unwrap_or(0);
    Modifiers::from_bits_truncate(bits)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
