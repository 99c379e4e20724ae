//! Line-based key commands — the headless stand-in for keyboard events.
//!
//! `+w` press, `-w` release, a bare key is a tap (press immediately followed
//! by release), `q` quits. Unrecognized input is ignored, same as unknown
//! keys on a real keyboard.

use syncrover_core::ControlKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Down(ControlKey),
    Up(ControlKey),
    Tap(ControlKey),
    Quit,
}

pub fn parse_line(line: &str) -> Option<KeyCommand> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "q" | "quit" => Some(KeyCommand::Quit),
        _ => {
            if let Some(key) = line.strip_prefix('+') {
                ControlKey::from_key(key).map(KeyCommand::Down)
            } else if let Some(key) = line.strip_prefix('-') {
                ControlKey::from_key(key).map(KeyCommand::Up)
            } else {
                ControlKey::from_key(&line).map(KeyCommand::Tap)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_press_release_and_tap() {
        assert_eq!(parse_line("+w"), Some(KeyCommand::Down(ControlKey::Forward)));
        assert_eq!(parse_line("-shift"), Some(KeyCommand::Up(ControlKey::Boost)));
        assert_eq!(parse_line("l"), Some(KeyCommand::Tap(ControlKey::Lights)));
        assert_eq!(parse_line("  H "), Some(KeyCommand::Tap(ControlKey::Horn)));
        assert_eq!(parse_line("quit"), Some(KeyCommand::Quit));
    }

    #[test]
    fn ignores_unrecognized_input() {
        for line in ["", "+x", "-", "hello world", "+"] {
            assert_eq!(parse_line(line), None, "{line:?} should be ignored");
        }
    }
}
