//! Windows pointer injection via the SendInput API.
//!
//! Positions are absolute pixels on the virtual desktop, normalized to the
//! [0, 65535] range that `MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK`
//! expects. A click is a left-button down followed by an up, sent as one
//! batch so nothing can interleave between them.

#![cfg(target_os = "windows")]

use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_VIRTUALDESK, MOUSE_EVENT_FLAGS, MOUSEINPUT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN,
};

use crate::application::replay_clicks::{InjectionError, PointerInjector};

/// Windows implementation of [`PointerInjector`] using SendInput.
pub struct WindowsPointerInjector;

impl WindowsPointerInjector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsPointerInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerInjector for WindowsPointerInjector {
    fn move_to(&self, x: i32, y: i32) -> Result<(), InjectionError> {
        // SAFETY: GetSystemMetrics is always safe to call
        let (left, top, width, height) = unsafe {
            (
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        };
        let dx = normalize(x, left, width);
        let dy = normalize(y, top, height);
        send(&[mouse_input(
            dx,
            dy,
            MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK,
        )])
    }

    fn click(&self) -> Result<(), InjectionError> {
        send(&[
            mouse_input(0, 0, MOUSEEVENTF_LEFTDOWN),
            mouse_input(0, 0, MOUSEEVENTF_LEFTUP),
        ])
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Maps a pixel coordinate on an axis starting at `origin` and `extent`
/// pixels long to the [0, 65535] absolute range.
fn normalize(pos: i32, origin: i32, extent: i32) -> i32 {
    if extent <= 1 {
        return 0;
    }
    let offset = i64::from(pos) - i64::from(origin);
    let scaled = offset * 65535 / i64::from(extent - 1);
    scaled.clamp(0, 65535) as i32
}

fn mouse_input(dx: i32, dy: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn send(inputs: &[INPUT]) -> Result<(), InjectionError> {
    // SAFETY: inputs is a slice of valid INPUT structures
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize == inputs.len() {
        Ok(())
    } else {
        Err(InjectionError::Platform(format!(
            "SendInput injected {sent} of {} events: {}",
            inputs.len(),
            std::io::Error::last_os_error()
        )))
    }
}
