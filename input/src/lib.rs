//! Typed vocabulary for an input-injection backend.
//!
//! This crate holds no device code. It defines the closed set of mouse
//! buttons and special keys the automation layer understands, each mapped to
//! the injection backend's name for it, plus [`KeySequence`], the validated
//! ordered list of things to type. An injector collaborator consumes these
//! values; locating *where* to click or type is the `vision`/`ocr` crates'
//! job.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown mouse button {0:?}")]
    UnknownButton(String),

    #[error("unknown key name {0:?}")]
    UnknownKey(String),

    /// Key sequences hold only non-empty text and special keys.
    #[error("empty text element in key sequence")]
    EmptyText,
}

/// A mouse button, by the backend's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

impl FromStr for MouseButton {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            other => Err(Error::UnknownButton(other.to_string())),
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declares the key enum together with its backend-name table, so a variant
/// cannot exist without a mapping.
macro_rules! special_keys {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A special (non-character) key, by the backend's name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Key {
            $($variant),+
        }

        impl Key {
            pub const ALL: &'static [Key] = &[$(Key::$variant),+];

            /// The injection backend's name for this key.
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => $name),+
                }
            }
        }
    };
}

special_keys! {
    Accept => "accept",
    Add => "add",
    Alt => "alt",
    AltLeft => "altleft",
    AltRight => "altright",
    Apps => "apps",
    Backspace => "backspace",
    BrowserBack => "browserback",
    BrowserFavorites => "browserfavorites",
    BrowserForward => "browserforward",
    BrowserHome => "browserhome",
    BrowserRefresh => "browserrefresh",
    BrowserSearch => "browsersearch",
    BrowserStop => "browserstop",
    CapsLock => "capslock",
    Clear => "clear",
    Command => "command",
    Convert => "convert",
    Ctrl => "ctrl",
    CtrlLeft => "ctrlleft",
    CtrlRight => "ctrlright",
    Decimal => "decimal",
    Del => "del",
    Delete => "delete",
    Divide => "divide",
    Down => "down",
    End => "end",
    Enter => "enter",
    Esc => "esc",
    Escape => "escape",
    Execute => "execute",
    F1 => "f1",
    F2 => "f2",
    F3 => "f3",
    F4 => "f4",
    F5 => "f5",
    F6 => "f6",
    F7 => "f7",
    F8 => "f8",
    F9 => "f9",
    F10 => "f10",
    F11 => "f11",
    F12 => "f12",
    F13 => "f13",
    F14 => "f14",
    F15 => "f15",
    F16 => "f16",
    F17 => "f17",
    F18 => "f18",
    F19 => "f19",
    F20 => "f20",
    F21 => "f21",
    F22 => "f22",
    F23 => "f23",
    F24 => "f24",
    Final => "final",
    Fn => "fn",
    Hanguel => "hanguel",
    Hangul => "hangul",
    Hanja => "hanja",
    Help => "help",
    Home => "home",
    Insert => "insert",
    Junja => "junja",
    Kana => "kana",
    Kanji => "kanji",
    LaunchApp1 => "launchapp1",
    LaunchApp2 => "launchapp2",
    LaunchMail => "launchmail",
    LaunchMediaSelect => "launchmediaselect",
    Left => "left",
    ModeChange => "modechange",
    Multiply => "multiply",
    NextTrack => "nexttrack",
    NonConvert => "nonconvert",
    Num0 => "num0",
    Num1 => "num1",
    Num2 => "num2",
    Num3 => "num3",
    Num4 => "num4",
    Num5 => "num5",
    Num6 => "num6",
    Num7 => "num7",
    Num8 => "num8",
    Num9 => "num9",
    NumLock => "numlock",
    Option => "option",
    OptionLeft => "optionleft",
    OptionRight => "optionright",
    PageDown => "pagedown",
    PageUp => "pageup",
    Pause => "pause",
    PgDn => "pgdn",
    PgUp => "pgup",
    PlayPause => "playpause",
    PrevTrack => "prevtrack",
    Print => "print",
    PrintScreen => "printscreen",
    Return => "return",
    Right => "right",
    ScrollLock => "scrolllock",
    Select => "select",
    Separator => "separator",
    Shift => "shift",
    ShiftLeft => "shiftleft",
    ShiftRight => "shiftright",
    Sleep => "sleep",
    Space => "space",
    Stop => "stop",
    Subtract => "subtract",
    Tab => "tab",
    Up => "up",
    VolumeDown => "volumedown",
    VolumeMute => "volumemute",
    VolumeUp => "volumeup",
    Win => "win",
    WinLeft => "winleft",
    WinRight => "winright",
    Yen => "yen",
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Key::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| Error::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One element a caller may type: literal text, or a special key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Text(String),
    Key(Key),
}

impl From<&str> for KeyInput {
    fn from(text: &str) -> Self {
        KeyInput::Text(text.to_string())
    }
}

impl From<String> for KeyInput {
    fn from(text: String) -> Self {
        KeyInput::Text(text)
    }
}

impl From<Key> for KeyInput {
    fn from(key: Key) -> Self {
        KeyInput::Key(key)
    }
}

/// An ordered, validated list of things to type.
///
/// Every mutating operation funnels through the same validation, so a
/// sequence can never hold an empty text element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySequence {
    items: Vec<KeyInput>,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items<I, T>(items: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<KeyInput>,
    {
        let mut sequence = Self::new();
        sequence.extend(items)?;
        Ok(sequence)
    }

    fn validate(item: &KeyInput) -> Result<(), Error> {
        match item {
            KeyInput::Text(text) if text.is_empty() => Err(Error::EmptyText),
            _ => Ok(()),
        }
    }

    pub fn push(&mut self, item: impl Into<KeyInput>) -> Result<(), Error> {
        let item = item.into();
        Self::validate(&item)?;
        self.items.push(item);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, item: impl Into<KeyInput>) -> Result<(), Error> {
        let item = item.into();
        Self::validate(&item)?;
        self.items.insert(index, item);
        Ok(())
    }

    /// Appends every item, or nothing: validation runs before the sequence
    /// is touched.
    pub fn extend<I, T>(&mut self, items: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<KeyInput>,
    {
        let incoming: Vec<KeyInput> = items.into_iter().map(Into::into).collect();
        for item in &incoming {
            Self::validate(item)?;
        }
        self.items.extend(incoming);
        Ok(())
    }

    /// A new sequence holding the items of `range`; already-validated items
    /// need no re-check.
    pub fn slice(&self, range: Range<usize>) -> KeySequence {
        KeySequence {
            items: self.items[range].to_vec(),
        }
    }

    pub fn items(&self) -> &[KeyInput] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The backend key names an injector holds down for this sequence,
    /// deduplicated in first-seen order. Each character of a text element
    /// counts once, so pressing and releasing "meet" touches `e` a single
    /// time.
    pub fn unique_key_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut remember = |name: String| {
            if !names.contains(&name) {
                names.push(name);
            }
        };
        for item in &self.items {
            match item {
                KeyInput::Text(text) => {
                    for ch in text.chars() {
                        remember(ch.to_string());
                    }
                }
                KeyInput::Key(key) => remember(key.name().to_string()),
            }
        }
        names
    }
}

impl<'a> IntoIterator for &'a KeySequence {
    type Item = &'a KeyInput;
    type IntoIter = std::slice::Iter<'a, KeyInput>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_round_trip_through_their_names() {
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            assert_eq!(button.name().parse::<MouseButton>().unwrap(), button);
        }
        assert_eq!(
            "LEFT".parse::<MouseButton>().unwrap(),
            MouseButton::Left,
            "button parsing is case-insensitive"
        );
        assert!("side".parse::<MouseButton>().is_err());
    }

    #[test]
    fn keys_round_trip_through_their_names() {
        for key in Key::ALL {
            assert_eq!(key.name().parse::<Key>().unwrap(), *key);
        }
        assert!("sideways".parse::<Key>().is_err());
    }

    #[test]
    fn every_key_name_is_unique() {
        let mut names: Vec<&str> = Key::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Key::ALL.len());
    }

    #[test]
    fn empty_text_is_rejected_everywhere() {
        let mut sequence = KeySequence::new();
        assert_eq!(sequence.push(""), Err(Error::EmptyText));
        assert_eq!(sequence.insert(0, ""), Err(Error::EmptyText));
        assert_eq!(sequence.extend(["ok", ""]), Err(Error::EmptyText));
        assert!(sequence.is_empty(), "a failed extend appends nothing");
    }

    #[test]
    fn sequences_build_from_mixed_items() {
        let mut sequence = KeySequence::from_items(["hello"]).unwrap();
        sequence.push(Key::Enter).unwrap();
        sequence.insert(0, Key::Shift).unwrap();

        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.items()[0], KeyInput::Key(Key::Shift));
        assert_eq!(sequence.items()[1], KeyInput::Text("hello".to_string()));
    }

    #[test]
    fn slicing_preserves_order() {
        let mut sequence = KeySequence::from_items(["a", "b"]).unwrap();
        sequence.push(Key::Tab).unwrap();

        let tail = sequence.slice(1..3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.items()[1], KeyInput::Key(Key::Tab));
    }

    #[test]
    fn held_keys_deduplicate_characters() {
        let mut sequence = KeySequence::from_items(["meet"]).unwrap();
        sequence.push(Key::Ctrl).unwrap();
        sequence.push(Key::Ctrl).unwrap();

        assert_eq!(sequence.unique_key_names(), vec!["m", "e", "t", "ctrl"]);
    }
}
