//! Keyboard input handling for the TUI.
//!
//! Plain characters go to the focused form field, so global commands use
//! Ctrl chords and function keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use educonnect_core::nav::View;
use educonnect_core::views::{ResourceKind, UploadField};

use crate::app::{
    can_add_description_char, can_add_field_char, can_add_password_char, can_add_path_char, App,
    AppState, LoginField, RegisterField,
};

/// Global command bound to a Ctrl chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Go(View),
    Logout,
}

fn command_for(key: &KeyEvent) -> Option<Command> {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char('d') => Some(Command::Go(View::Dashboard)),
        KeyCode::Char('b') => Some(Command::Go(View::Materials)),
        KeyCode::Char('u') => Some(Command::Go(View::Upload)),
        KeyCode::Char('l') => Some(Command::Go(View::Login)),
        KeyCode::Char('r') => Some(Command::Go(View::Register)),
        KeyCode::Char('o') => Some(Command::Logout),
        _ => None,
    }
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Global keys
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        _ => {}
    }

    if let Some(command) = command_for(&key) {
        match command {
            Command::Go(view) => app.navigate(view),
            Command::Logout => app.logout(),
        }
        return false;
    }

    match app.current_view() {
        View::Login => handle_login_input(app, key),
        View::Register => handle_register_input(app, key),
        View::Dashboard => {}
        View::Materials => handle_materials_input(app, key),
        View::Upload => handle_upload_input(app, key),
    }
    false
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Tab => app.login_focus = app.login_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.login_focus = app.login_focus.prev(),
        KeyCode::Enter => match app.login_focus {
            LoginField::Email => app.login_focus = LoginField::Password,
            LoginField::Password | LoginField::Submit => app.submit_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginField::Email => {
                app.login.email.pop();
            }
            LoginField::Password => {
                app.login.password.pop();
            }
            LoginField::Submit => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginField::Email => {
                if can_add_field_char(app.login.email.len(), c) {
                    app.login.email.push(c);
                }
            }
            LoginField::Password => {
                if can_add_password_char(app.login.password.len(), c) {
                    app.login.password.push(c);
                }
            }
            LoginField::Submit => {}
        },
        _ => {}
    }
}

fn handle_register_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Tab => app.register_focus = app.register_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.register_focus = app.register_focus.prev(),
        KeyCode::Enter => match app.register_focus {
            RegisterField::Submit => app.submit_register(),
            field => app.register_focus = field.next(),
        },
        KeyCode::Backspace => {
            if let Some(value) = register_field_mut(app) {
                value.pop();
            }
        }
        KeyCode::Char(c) => {
            let is_password = app.register_focus == RegisterField::Password;
            if let Some(value) = register_field_mut(app) {
                let accepted = if is_password {
                    can_add_password_char(value.len(), c)
                } else {
                    can_add_field_char(value.len(), c)
                };
                if accepted {
                    value.push(c);
                }
            }
        }
        _ => {}
    }
}

fn register_field_mut(app: &mut App) -> Option<&mut String> {
    match app.register_focus {
        RegisterField::Name => Some(&mut app.register.name),
        RegisterField::Email => Some(&mut app.register.email),
        RegisterField::Password => Some(&mut app.register.password),
        RegisterField::Submit => None,
    }
}

fn handle_materials_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.materials.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.materials.select_prev(),
        KeyCode::Home => app.materials.selection = 0,
        KeyCode::End => {
            app.materials.selection = app.materials.materials.len().saturating_sub(1);
        }
        KeyCode::Char('r') => {
            if !app.materials.is_loading() {
                app.reload_materials();
            }
        }
        _ => {}
    }
}

fn handle_upload_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.upload.focus = app.upload.focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.upload.focus = app.upload.focus.prev(),
        KeyCode::Left => match app.upload.focus {
            UploadField::Subject => app.upload.prev_subject(),
            UploadField::Kind => app.upload.kind = app.upload.kind.toggle(),
            _ => {}
        },
        KeyCode::Right => match app.upload.focus {
            UploadField::Subject => app.upload.next_subject(),
            UploadField::Kind => app.upload.kind = app.upload.kind.toggle(),
            _ => {}
        },
        KeyCode::Enter => match app.upload.focus {
            UploadField::Submit => app.submit_upload(),
            field => app.upload.focus = field.next(),
        },
        KeyCode::Backspace => {
            if let Some(value) = upload_field_mut(app) {
                value.pop();
            }
        }
        KeyCode::Char(c) => {
            let focus = app.upload.focus;
            let kind = app.upload.kind;
            if let Some(value) = upload_field_mut(app) {
                let accepted = match (focus, kind) {
                    (UploadField::Description, _) => can_add_description_char(value.len(), c),
                    (UploadField::Source, ResourceKind::File) => can_add_path_char(value.len(), c),
                    _ => can_add_field_char(value.len(), c),
                };
                if accepted {
                    value.push(c);
                }
            }
        }
        _ => {}
    }
}

fn upload_field_mut(app: &mut App) -> Option<&mut String> {
    let upload = &mut app.upload;
    match upload.focus {
        UploadField::Title => Some(&mut upload.title),
        UploadField::Description => Some(&mut upload.description),
        UploadField::Source => Some(upload.source_mut()),
        UploadField::Subject | UploadField::Kind | UploadField::Submit => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_ctrl_chords_map_to_commands() {
        assert_eq!(command_for(&ctrl('d')), Some(Command::Go(View::Dashboard)));
        assert_eq!(command_for(&ctrl('b')), Some(Command::Go(View::Materials)));
        assert_eq!(command_for(&ctrl('u')), Some(Command::Go(View::Upload)));
        assert_eq!(command_for(&ctrl('o')), Some(Command::Logout));
        assert_eq!(command_for(&ctrl('x')), None);
    }

    #[test]
    fn test_plain_characters_are_not_commands() {
        let key = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(command_for(&key), None);
    }
}
