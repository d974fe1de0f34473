use plate_core::{BlockKind, Mark};

use crate::format::Format;

/// Logical key of a key-down event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// The character typed, after layout mapping.
    Character(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Unidentified,
}

impl Key {
    /// Parses a DOM-style key name: a single character, or `Enter`,
    /// `ArrowLeft` and friends. Anything else is [`Key::Unidentified`].
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Key::Character(ch);
        }
        match name.to_ascii_lowercase().as_str() {
            "enter" => Key::Enter,
            "tab" => Key::Tab,
            "escape" | "esc" => Key::Escape,
            "backspace" => Key::Backspace,
            "delete" => Key::Delete,
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "backtick" | "backquote" => Key::Character('`'),
            "space" => Key::Character(' '),
            _ => Key::Unidentified,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };
    pub const META: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Ctrl on Linux and Windows, Cmd on macOS. Either counts.
    pub fn is_primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            default_prevented: false,
        }
    }

    /// Parses combos such as `ctrl+b`, `meta+shift+I` or `ctrl+backtick`.
    pub fn from_combo(combo: &str) -> Option<Self> {
        let mut modifiers = Modifiers::NONE;
        let mut parts: Vec<&str> = combo.split('+').collect();
        // `ctrl++` binds the plus key itself.
        if combo.ends_with("++") {
            parts.truncate(parts.len().saturating_sub(2));
            parts.push("+");
        }
        let (key, mods) = parts.split_last()?;
        for part in mods {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                _ => return None,
            }
        }
        if key.is_empty() {
            return None;
        }
        Some(Self::new(Key::from_name(key), modifiers))
    }

    /// Marks the event as handled so the host skips its default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

fn binding(key: Key, modifiers: Modifiers) -> Option<Format> {
    let Key::Character(ch) = key else {
        return None;
    };
    match ch.to_ascii_lowercase() {
        'b' if modifiers.is_primary() => Some(Format::mark(Mark::Bold)),
        'i' if modifiers.is_primary() => Some(Format::mark(Mark::Italic)),
        'u' if modifiers.is_primary() => Some(Format::mark(Mark::Underline)),
        '`' if modifiers.ctrl => Some(Format::block(BlockKind::Code)),
        _ => None,
    }
}

/// Maps a key-down event onto a format. A bound event is marked handled;
/// an unbound one is left untouched.
pub fn resolve_key(event: &mut KeyEvent) -> Option<Format> {
    let Some(format) = binding(event.key, event.modifiers) else {
        log::trace!("unbound key {:?} with {:?}", event.key, event.modifiers);
        return None;
    };
    event.prevent_default();
    Some(format)
}
