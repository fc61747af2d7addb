//! Playback control of the embedded content, bridged over webview events.
//!
//! The shell never injects script: it emits `shell-media-command` to the `main` webview and the
//! content host answers through the `report_media_state` command.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};

use crate::stealth::{MediaControl, MediaError};
use crate::windows::MAIN_WINDOW_LABEL;

pub const EVT_MEDIA_COMMAND: &str = "shell-media-command";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaCommand {
    Pause,
    Resume,
    RequestFullscreen,
}

const STATE_UNKNOWN: u8 = 0;
const STATE_NO_PLAYER: u8 = 1;
const STATE_PAUSED: u8 = 2;
const STATE_PLAYING: u8 = 3;

/// Last playback state reported by the content host. Shared between the command handler and
/// the driver task.
#[derive(Debug, Clone, Default)]
pub struct MediaStateCache {
    state: Arc<AtomicU8>,
}

impl MediaStateCache {
    /// `None` means the loaded content has no player.
    pub fn report(&self, playing: Option<bool>) {
        let state = match playing {
            None => STATE_NO_PLAYER,
            Some(false) => STATE_PAUSED,
            Some(true) => STATE_PLAYING,
        };
        self.state.store(state, Ordering::SeqCst);
    }

    pub fn playing(&self) -> Result<bool, MediaError> {
        match self.state.load(Ordering::SeqCst) {
            STATE_PLAYING => Ok(true),
            STATE_PAUSED => Ok(false),
            STATE_NO_PLAYER => Err(MediaError::module_not_found(
                "content has no media player",
            )),
            _ => Err(MediaError::unavailable(
                "content host has not reported playback state",
            )),
        }
    }
}

pub struct WebviewMedia {
    app: AppHandle,
    state: MediaStateCache,
}

impl WebviewMedia {
    pub fn new(app: AppHandle, state: MediaStateCache) -> Self {
        Self { app, state }
    }

    fn send(&self, command: MediaCommand) -> Result<(), MediaError> {
        let window = self
            .app
            .get_webview_window(MAIN_WINDOW_LABEL)
            .ok_or_else(|| MediaError::unavailable("content window is gone"))?;
        window
            .emit(EVT_MEDIA_COMMAND, command)
            .map_err(|e| MediaError::script_failed(e.to_string()))
    }
}

impl MediaControl for WebviewMedia {
    fn is_playing(&self) -> Result<bool, MediaError> {
        self.state.playing()
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.send(MediaCommand::Pause)?;
        self.state.report(Some(false));
        Ok(())
    }

    fn resume(&mut self) -> Result<(), MediaError> {
        self.send(MediaCommand::Resume)?;
        self.state.report(Some(true));
        Ok(())
    }

    fn request_fullscreen(&mut self) -> Result<(), MediaError> {
        self.send(MediaCommand::RequestFullscreen)
    }
}
