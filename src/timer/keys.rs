//! Keystroke vocabulary

/// A key the timer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    /// `.` switches between minutes and seconds entry
    ToggleMode,
    Backspace,
    Escape,
    /// Return, Space or keypad Enter
    Confirm,
    /// `r` restarts with the previous duration
    RepeatLast,
}

impl Key {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Key::ToggleMode),
            '\u{1B}' => Some(Key::Escape),
            // delete, forward delete
            '\u{7F}' | '\u{08}' | '\u{F728}' => Some(Key::Backspace),
            '\r' | '\n' | ' ' | '\u{03}' => Some(Key::Confirm),
            'r' | 'R' => Some(Key::RepeatLast),
            _ => c.to_digit(10).map(|d| Key::Digit(d as u8)),
        }
    }

    /// Keys typed on one terminal line. An empty line is a lone Return.
    pub fn parse_line(line: &str) -> Vec<Self> {
        if line.is_empty() {
            return vec![Key::Confirm];
        }
        line.chars().filter_map(Key::from_char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_char() {
        assert_eq!(Key::from_char('7'), Some(Key::Digit(7)));
        assert_eq!(Key::from_char('.'), Some(Key::ToggleMode));
        assert_eq!(Key::from_char('\u{1B}'), Some(Key::Escape));
        assert_eq!(Key::from_char('\u{F728}'), Some(Key::Backspace));
        assert_eq!(Key::from_char(' '), Some(Key::Confirm));
        assert_eq!(Key::from_char('r'), Some(Key::RepeatLast));
        assert_eq!(Key::from_char('x'), None);
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(Key::parse_line(""), vec![Key::Confirm]);
        assert_eq!(
            Key::parse_line("1.3x"),
            vec![Key::Digit(1), Key::ToggleMode, Key::Digit(3)]
        );
    }
}
