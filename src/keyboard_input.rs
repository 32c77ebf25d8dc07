use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What a key press asks the scan screen to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCommand {
    Capture,
    Flip,
    RequestPermission,
    Acknowledge,
    Back,
    Quit,
}

impl ScanCommand {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Char(' ') | KeyCode::Enter => Some(ScanCommand::Capture),
            KeyCode::Char('f') => Some(ScanCommand::Flip),
            KeyCode::Char('r') => Some(ScanCommand::RequestPermission),
            KeyCode::Char('a') => Some(ScanCommand::Acknowledge),
            KeyCode::Char('b') | KeyCode::Backspace => Some(ScanCommand::Back),
            KeyCode::Char('q') | KeyCode::Esc => Some(ScanCommand::Quit),
            _ => None,
        }
    }

    fn from_event(key_event: &KeyEvent) -> Option<Self> {
        // Releases and repeats are ignored
        if key_event.kind != KeyEventKind::Press {
            return None;
        }
        Self::from_key(key_event.code)
    }
}

/// Terminal keyboard driver for the interactive scan screen
pub struct KeyboardInputHandler {
    cancellation_token: CancellationToken,
}

impl Default for KeyboardInputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardInputHandler {
    pub fn new() -> Self {
        Self {
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start reading keys in raw mode. Commands arrive on `commands` until
    /// quit is pressed, the handler is stopped, or the receiver is dropped.
    pub fn start(&self, commands: mpsc::Sender<ScanCommand>) -> JoinHandle<()> {
        info!("Keyboard controls: SPACE capture, f flip, r request permission, a acknowledge, b back, q quit");

        let cancellation_token = self.cancellation_token.clone();

        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }
            debug!("Raw mode enabled");

            while !cancellation_token.is_cancelled() {
                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };
                        let Some(command) = ScanCommand::from_event(&key_event) else {
                            debug!("Key pressed: {:?}", key_event.code);
                            continue;
                        };

                        if commands.blocking_send(command).is_err() {
                            debug!("Command receiver dropped");
                            break;
                        }
                        if command == ScanCommand::Quit {
                            info!("Quit key pressed");
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            } else {
                debug!("Raw mode disabled");
            }
        })
    }

    pub fn stop(&self) {
        debug!("Stopping keyboard input handler");
        self.cancellation_token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    #[test]
    fn test_key_mapping() {
        assert_eq!(ScanCommand::from_key(KeyCode::Char(' ')), Some(ScanCommand::Capture));
        assert_eq!(ScanCommand::from_key(KeyCode::Char('f')), Some(ScanCommand::Flip));
        assert_eq!(
            ScanCommand::from_key(KeyCode::Char('r')),
            Some(ScanCommand::RequestPermission)
        );
        assert_eq!(ScanCommand::from_key(KeyCode::Char('a')), Some(ScanCommand::Acknowledge));
        assert_eq!(ScanCommand::from_key(KeyCode::Char('b')), Some(ScanCommand::Back));
        assert_eq!(ScanCommand::from_key(KeyCode::Esc), Some(ScanCommand::Quit));
        assert_eq!(ScanCommand::from_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_key_release_ignored() {
        let press = KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            ..press
        };

        assert_eq!(ScanCommand::from_event(&press), Some(ScanCommand::Capture));
        assert_eq!(ScanCommand::from_event(&release), None);
    }

    #[test]
    fn test_keyboard_handler_stop() {
        let handler = KeyboardInputHandler::new();
        assert!(!handler.is_stopped());

        handler.stop();
        assert!(handler.is_stopped());
    }
}
