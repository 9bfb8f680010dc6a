use crate::wizard::SessionAction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const SCRIPT_KEYS_ENV: &str = "INVITEFLOW_SCRIPT_KEYS";

/// One step of a scripted run: a key press, or a pause until search results land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedKey {
    Key(KeyEvent),
    WaitForSearch,
}

pub fn session_action_from_key(key: KeyEvent) -> Option<SessionAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(SessionAction::Cancel);
    }
    match key.code {
        KeyCode::Up => Some(SessionAction::MovePrev),
        KeyCode::Down => Some(SessionAction::MoveNext),
        KeyCode::Esc => Some(SessionAction::Back),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            Some(SessionAction::Newline)
        }
        KeyCode::Enter => Some(SessionAction::Submit),
        KeyCode::Backspace => Some(SessionAction::Backspace),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(SessionAction::Input(c))
        }
        _ => None,
    }
}

/// Parses a comma separated key script such as `enter,type:ada,wait,enter`.
pub fn parse_scripted_keys(raw: &str) -> Result<Vec<ScriptedKey>, String> {
    let mut keys = Vec::new();
    for token in raw.split(',') {
        if let Some(text) = token.trim_start().strip_prefix("type:") {
            keys.extend(
                text.chars()
                    .map(|c| ScriptedKey::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))),
            );
            continue;
        }
        let normalized = token.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            continue;
        }
        let key = match normalized.as_str() {
            "up" => KeyEvent::new(KeyCode::Up, KeyModifiers::NONE),
            "down" => KeyEvent::new(KeyCode::Down, KeyModifiers::NONE),
            "enter" => KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            "alt-enter" => KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT),
            "esc" => KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            "backspace" => KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
            "ctrl-c" => KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            "wait" => {
                keys.push(ScriptedKey::WaitForSearch);
                continue;
            }
            other => {
                return Err(format!(
                    "invalid {SCRIPT_KEYS_ENV} token `{other}`; valid tokens: up,down,enter,alt-enter,esc,backspace,ctrl-c,wait,type:<text>"
                ));
            }
        };
        keys.push(ScriptedKey::Key(key));
    }
    Ok(keys)
}

pub fn load_scripted_keys() -> Result<Option<Vec<ScriptedKey>>, String> {
    let Ok(raw) = std::env::var(SCRIPT_KEYS_ENV) else {
        return Ok(None);
    };
    parse_scripted_keys(&raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn keys_map_to_session_actions() {
        assert_eq!(
            session_action_from_key(press(KeyCode::Enter, KeyModifiers::NONE)),
            Some(SessionAction::Submit)
        );
        assert_eq!(
            session_action_from_key(press(KeyCode::Enter, KeyModifiers::ALT)),
            Some(SessionAction::Newline)
        );
        assert_eq!(
            session_action_from_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(SessionAction::Cancel)
        );
        assert_eq!(
            session_action_from_key(press(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(SessionAction::Input('c'))
        );
        assert_eq!(
            session_action_from_key(press(KeyCode::Esc, KeyModifiers::NONE)),
            Some(SessionAction::Back)
        );
        assert_eq!(session_action_from_key(press(KeyCode::Tab, KeyModifiers::NONE)), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut key = press(KeyCode::Enter, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(session_action_from_key(key), None);
    }

    #[test]
    fn scripted_keys_expand_typed_text_and_waits() {
        let keys = parse_scripted_keys("enter, type:a b ,wait,Esc").expect("parse");
        assert_eq!(
            keys,
            vec![
                ScriptedKey::Key(press(KeyCode::Enter, KeyModifiers::NONE)),
                ScriptedKey::Key(press(KeyCode::Char('a'), KeyModifiers::NONE)),
                ScriptedKey::Key(press(KeyCode::Char(' '), KeyModifiers::NONE)),
                ScriptedKey::Key(press(KeyCode::Char('b'), KeyModifiers::NONE)),
                ScriptedKey::Key(press(KeyCode::Char(' '), KeyModifiers::NONE)),
                ScriptedKey::WaitForSearch,
                ScriptedKey::Key(press(KeyCode::Esc, KeyModifiers::NONE)),
            ]
        );
    }

    #[test]
    fn scripted_keys_reject_unknown_tokens() {
        let err = parse_scripted_keys("enter,jump").expect_err("unknown token");
        assert!(err.contains("`jump`"));
        assert!(err.contains(SCRIPT_KEYS_ENV));
    }
}
