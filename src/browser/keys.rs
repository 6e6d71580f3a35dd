//! Key names and key combos as understood by CDP `Input.dispatchKeyEvent`.

use anyhow::Result;

/// CDP modifier bit flags.
pub const MODIFIER_ALT: i64 = 1;
pub const MODIFIER_CONTROL: i64 = 2;
pub const MODIFIER_META: i64 = 4;
pub const MODIFIER_SHIFT: i64 = 8;

/// Everything CDP needs to emit a realistic key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDefinition {
    /// DOM `KeyboardEvent.key`
    pub key: String,
    /// DOM `KeyboardEvent.code`
    pub code: String,
    /// Windows virtual key code (what `keyCode` reports)
    pub key_code: i64,
    /// Text inserted by the key, if any
    pub text: Option<String>,
}

/// A key plus the modifiers held while it is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub modifiers: i64,
    pub key: KeyDefinition,
}

impl KeyCombo {
    /// Parse `Enter`, `Control+o`, `Shift+Tab`, `Control++`.
    pub fn parse(combo: &str) -> Result<Self> {
        if combo.is_empty() {
            anyhow::bail!("Empty key combo");
        }

        // A trailing "+" after a separator is the plus key itself.
        let (prefix, key_name) = if combo == "+" {
            ("", "+")
        } else if let Some(prefix) = combo.strip_suffix("++") {
            (prefix, "+")
        } else {
            match combo.rsplit_once('+') {
                Some((prefix, key)) => (prefix, key),
                None => ("", combo),
            }
        };

        let mut modifiers = 0;
        if !prefix.is_empty() {
            for name in prefix.split('+') {
                modifiers |= modifier_flag(name)?;
            }
        }

        let mut key = KeyDefinition::named(key_name)?;
        // Chords with Control/Alt/Meta insert no text; Shift alone still does.
        if modifiers & (MODIFIER_CONTROL | MODIFIER_ALT | MODIFIER_META) != 0 {
            key.text = None;
        }

        Ok(Self { modifiers, key })
    }
}

fn modifier_flag(name: &str) -> Result<i64> {
    match name.to_lowercase().as_str() {
        "alt" | "option" => Ok(MODIFIER_ALT),
        "control" | "ctrl" => Ok(MODIFIER_CONTROL),
        "meta" | "cmd" | "command" => Ok(MODIFIER_META),
        "shift" => Ok(MODIFIER_SHIFT),
        other => anyhow::bail!("Unknown modifier: {}", other),
    }
}

impl KeyDefinition {
    /// Look up a named key (`Enter`, `Tab`, `ArrowUp`, ...) or a single character.
    pub fn named(name: &str) -> Result<Self> {
        let special = match name {
            "Enter" => Some(("Enter", 13, Some("\r"))),
            "Tab" => Some(("Tab", 9, Some("\t"))),
            "Backspace" => Some(("Backspace", 8, None)),
            "Escape" => Some(("Escape", 27, None)),
            "Delete" => Some(("Delete", 46, None)),
            "Home" => Some(("Home", 36, None)),
            "End" => Some(("End", 35, None)),
            "PageUp" => Some(("PageUp", 33, None)),
            "PageDown" => Some(("PageDown", 34, None)),
            "ArrowUp" => Some(("ArrowUp", 38, None)),
            "ArrowDown" => Some(("ArrowDown", 40, None)),
            "ArrowLeft" => Some(("ArrowLeft", 37, None)),
            "ArrowRight" => Some(("ArrowRight", 39, None)),
            "Space" => return Ok(Self::from_char(' ')),
            _ => None,
        };

        if let Some((code, key_code, text)) = special {
            return Ok(Self {
                key: name.to_string(),
                code: code.to_string(),
                key_code,
                text: text.map(str::to_string),
            });
        }

        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self::from_char(c)),
            _ => anyhow::bail!("Unknown key: {}", name),
        }
    }

    /// Key event for typing a single character.
    pub fn from_char(c: char) -> Self {
        if c == '\n' || c == '\r' {
            return Self {
                key: "Enter".to_string(),
                code: "Enter".to_string(),
                key_code: 13,
                text: Some("\r".to_string()),
            };
        }

        let (code, key_code) = if c.is_ascii_alphabetic() {
            let upper = c.to_ascii_uppercase();
            (format!("Key{}", upper), upper as i64)
        } else if c.is_ascii_digit() {
            (format!("Digit{}", c), c as i64)
        } else if c == ' ' {
            ("Space".to_string(), 32)
        } else {
            (punctuation_code(c).to_string(), 0)
        };

        Self {
            key: c.to_string(),
            code,
            key_code,
            text: Some(c.to_string()),
        }
    }
}

fn punctuation_code(c: char) -> &'static str {
    match c {
        '.' | '>' => "Period",
        ',' | '<' => "Comma",
        '-' | '_' => "Minus",
        '=' | '+' => "Equal",
        '/' | '?' => "Slash",
        ';' | ':' => "Semicolon",
        '\'' | '"' => "Quote",
        '[' | '{' => "BracketLeft",
        ']' | '}' => "BracketRight",
        '\\' | '|' => "Backslash",
        '`' | '~' => "Backquote",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_o_has_no_text() {
        let combo = KeyCombo::parse("Control+o").unwrap();
        assert_eq!(combo.modifiers, MODIFIER_CONTROL);
        assert_eq!(combo.key.key, "o");
        assert_eq!(combo.key.code, "KeyO");
        assert_eq!(combo.key.key_code, 79);
        assert_eq!(combo.key.text, None);
    }

    #[test]
    fn enter_inserts_carriage_return() {
        let combo = KeyCombo::parse("Enter").unwrap();
        assert_eq!(combo.modifiers, 0);
        assert_eq!(combo.key.key_code, 13);
        assert_eq!(combo.key.text.as_deref(), Some("\r"));
    }

    #[test]
    fn multiple_modifiers_accumulate() {
        let combo = KeyCombo::parse("Ctrl+Shift+Tab").unwrap();
        assert_eq!(combo.modifiers, MODIFIER_CONTROL | MODIFIER_SHIFT);
        assert_eq!(combo.key.key, "Tab");
    }

    #[test]
    fn plus_key_after_modifier() {
        let combo = KeyCombo::parse("Control++").unwrap();
        assert_eq!(combo.modifiers, MODIFIER_CONTROL);
        assert_eq!(combo.key.key, "+");

        let bare = KeyCombo::parse("+").unwrap();
        assert_eq!(bare.modifiers, 0);
        assert_eq!(bare.key.text.as_deref(), Some("+"));
    }

    #[test]
    fn shift_keeps_text() {
        let combo = KeyCombo::parse("Shift+a").unwrap();
        assert_eq!(combo.key.text.as_deref(), Some("a"));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(KeyCombo::parse("Hyper+x").is_err());
        assert!(KeyCombo::parse("Control+Banana").is_err());
        assert!(KeyCombo::parse("").is_err());
    }

    #[test]
    fn characters_map_to_codes() {
        let space = KeyDefinition::from_char(' ');
        assert_eq!(space.code, "Space");
        assert_eq!(space.key_code, 32);

        let digit = KeyDefinition::from_char('7');
        assert_eq!(digit.code, "Digit7");

        let dot = KeyDefinition::from_char('.');
        assert_eq!(dot.code, "Period");
        assert_eq!(dot.text.as_deref(), Some("."));
    }
}
