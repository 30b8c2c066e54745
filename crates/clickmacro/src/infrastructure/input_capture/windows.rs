//! Windows low-level keyboard and mouse hook implementation.
//!
//! This module installs WH_KEYBOARD_LL and WH_MOUSE_LL hooks using the
//! Windows API. Both hooks share a dedicated Win32 message-loop thread.
//! Only button and key transitions are forwarded; pointer motion and wheel
//! messages pass straight to the next hook.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, error, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, MSG, MSLLHOOKSTRUCT,
    WH_KEYBOARD_LL, WH_MOUSE_LL, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP,
    WM_MBUTTONDOWN, WM_MBUTTONUP, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SYSKEYDOWN,
    WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
};

use super::{CaptureError, InputSource, Key, MouseButton, RawInputEvent};

/// Sender used by hook callbacks to deliver events to the pump thread.
///
/// Filled by [`WindowsInputCaptureService::start`] and emptied when the hook
/// thread exits, which disconnects the receiver handed out by `start`.
static EVENT_SENDER: EventSlot = EventSlot::new();

/// Holds the one live event sender of the process, if any.
struct EventSlot {
    sender: Mutex<Option<Sender<RawInputEvent>>>,
}

impl EventSlot {
    const fn new() -> Self {
        Self {
            sender: parking_lot::const_mutex(None),
        }
    }

    /// Stores `sender`, failing if a hook pair is already running.
    fn install(&self, sender: Sender<RawInputEvent>) -> Result<(), CaptureError> {
        let mut slot = self.sender.lock();
        if slot.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        *slot = Some(sender);
        Ok(())
    }

    /// Drops the sender so the receiving side sees a disconnect.
    fn release(&self) {
        self.sender.lock().take();
    }

    fn forward(&self, event: RawInputEvent) {
        if let Some(sender) = self.sender.lock().as_ref() {
            // Ignore send errors (receiver dropped during shutdown).
            let _ = sender.send(event);
        }
    }
}

/// `GetMessageW` returns 0 for `WM_QUIT` and -1 on failure; only a positive
/// result means a message was retrieved.
fn message_retrieved(result: i32) -> bool {
    result > 0
}

/// High word of `MSLLHOOKSTRUCT::mouseData` for the first X button.
const XBUTTON1_ID: u32 = 0x0001;

/// Windows low-level input capture service.
///
/// Installs `WH_KEYBOARD_LL` and `WH_MOUSE_LL` hooks and runs a dedicated
/// Win32 message loop thread.
pub struct WindowsInputCaptureService {
    /// Thread id of the hook loop, or 0 when not running.
    hook_thread_id: AtomicU32,
}

impl WindowsInputCaptureService {
    /// Creates a new (unstarted) service instance.
    pub fn new() -> Self {
        Self {
            hook_thread_id: AtomicU32::new(0),
        }
    }
}

impl Default for WindowsInputCaptureService {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for WindowsInputCaptureService {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel::<RawInputEvent>();

        // Only one hook pair may exist per process.
        EVENT_SENDER.install(tx)?;

        // The hook thread reports installation success (with its thread id)
        // or failure before entering the message loop.
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<u32, CaptureError>>(1);
        let spawned = thread::Builder::new()
            .name("clickmacro-hook-loop".to_string())
            .spawn(move || {
                run_hook_message_loop(ready_tx);
                EVENT_SENDER.release();
            });
        if let Err(e) = spawned {
            EVENT_SENDER.release();
            return Err(CaptureError::MouseHookInstallFailed(e.to_string()));
        }

        let thread_id = ready_rx.recv().map_err(|_| {
            CaptureError::MouseHookInstallFailed("hook thread exited during startup".to_string())
        })??;
        self.hook_thread_id.store(thread_id, Ordering::SeqCst);
        debug!("low-level hooks installed on thread {thread_id}");

        Ok(rx)
    }

    fn stop(&self) {
        let thread_id = self.hook_thread_id.swap(0, Ordering::SeqCst);
        if thread_id == 0 {
            return;
        }
        // SAFETY: posting WM_QUIT to a thread id we obtained from that thread.
        if let Err(e) = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
            warn!("failed to stop hook thread: {e}");
        }
    }
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(ready: mpsc::SyncSender<Result<u32, CaptureError>>) {
    // SAFETY: SetWindowsHookExW requires the calling thread to have a message loop.
    // We install both hooks before entering the loop.
    let kbd_hook: HHOOK = match unsafe {
        SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0)
    } {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(CaptureError::KeyboardHookInstallFailed(e.to_string())));
            return;
        }
    };
    let mouse_hook: HHOOK = match unsafe {
        SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0)
    } {
        Ok(hook) => hook,
        Err(e) => {
            // SAFETY: kbd_hook was returned by a successful SetWindowsHookExW.
            unsafe {
                UnhookWindowsHookEx(kbd_hook).ok();
            }
            let _ = ready.send(Err(CaptureError::MouseHookInstallFailed(e.to_string())));
            return;
        }
    };

    // SAFETY: GetCurrentThreadId has no preconditions.
    let _ = ready.send(Ok(unsafe { GetCurrentThreadId() }));

    // Win32 message loop – blocks until WM_QUIT is posted
    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    unsafe {
        loop {
            let result = GetMessageW(&mut msg, None, 0, 0).0;
            if !message_retrieved(result) {
                if result < 0 {
                    error!(
                        "hook message loop failed: {}",
                        std::io::Error::last_os_error()
                    );
                }
                break;
            }
            DispatchMessageW(&msg);
        }
        UnhookWindowsHookEx(kbd_hook).ok();
        UnhookWindowsHookEx(mouse_hook).ok();
    }
}

/// Maps a Windows Virtual Key code to a [`Key`].
fn key_from_vk(vk: u32) -> Key {
    match vk {
        0x70 => Key::F1,
        0x71 => Key::F2,
        0x72 => Key::F3,
        0x73 => Key::F4,
        0x74 => Key::F5,
        0x75 => Key::F6,
        0x76 => Key::F7,
        0x77 => Key::F8,
        0x78 => Key::F9,
        0x79 => Key::F10,
        0x7A => Key::F11,
        0x7B => Key::F12,
        0x1B => Key::Escape,
        0x13 => Key::Pause,
        0x91 => Key::ScrollLock,
        0x2D => Key::Insert,
        0x2E => Key::Delete,
        0x24 => Key::Home,
        0x23 => Key::End,
        0x21 => Key::PageUp,
        0x22 => Key::PageDown,
        other => Key::Other(other),
    }
}

fn forward(event: RawInputEvent) {
    EVENT_SENDER.forward(event);
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// This function is called by Windows from the hook message loop thread.
/// It must return quickly (< ~300ms) to avoid hook removal by the OS.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        let key = key_from_vk(kbs.vkCode);

        match w_param.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => forward(RawInputEvent::KeyDown { key }),
            WM_KEYUP | WM_SYSKEYUP => forward(RawInputEvent::KeyUp { key }),
            _ => {}
        }
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread; must return quickly.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
        let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
        let (x, y) = (mhs.pt.x, mhs.pt.y);
        let xbutton = || {
            if (mhs.mouseData >> 16) & 0xFFFF == XBUTTON1_ID {
                MouseButton::X1
            } else {
                MouseButton::X2
            }
        };

        let event = match w_param.0 as u32 {
            WM_LBUTTONDOWN => Some(RawInputEvent::MouseButtonDown { button: MouseButton::Left, x, y }),
            WM_LBUTTONUP => Some(RawInputEvent::MouseButtonUp { button: MouseButton::Left, x, y }),
            WM_RBUTTONDOWN => Some(RawInputEvent::MouseButtonDown { button: MouseButton::Right, x, y }),
            WM_RBUTTONUP => Some(RawInputEvent::MouseButtonUp { button: MouseButton::Right, x, y }),
            WM_MBUTTONDOWN => Some(RawInputEvent::MouseButtonDown { button: MouseButton::Middle, x, y }),
            WM_MBUTTONUP => Some(RawInputEvent::MouseButtonUp { button: MouseButton::Middle, x, y }),
            WM_XBUTTONDOWN => Some(RawInputEvent::MouseButtonDown { button: xbutton(), x, y }),
            WM_XBUTTONUP => Some(RawInputEvent::MouseButtonUp { button: xbutton(), x, y }),
            _ => None,
        };
        if let Some(event) = event {
            forward(event);
        }
    }

    // SAFETY: Forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_vk_maps_default_hotkeys() {
        assert_eq!(key_from_vk(0x70), Key::F1);
        assert_eq!(key_from_vk(0x73), Key::F4);
        assert_eq!(key_from_vk(0x1B), Key::Escape);
    }

    #[test]
    fn test_key_from_vk_keeps_unmapped_code() {
        assert_eq!(key_from_vk(0x41), Key::Other(0x41));
    }

    #[test]
    fn test_releasing_event_slot_disconnects_receiver() {
        // Arrange
        let slot = EventSlot::new();
        let (tx, rx) = mpsc::channel();
        slot.install(tx).unwrap();
        slot.forward(RawInputEvent::KeyDown { key: Key::F1 });

        // Act – the hook thread exits
        slot.release();

        // Assert – queued events drain, then the pump sees a disconnect
        assert_eq!(rx.recv(), Ok(RawInputEvent::KeyDown { key: Key::F1 }));
        assert_eq!(
            rx.recv_timeout(std::time::Duration::from_millis(10)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn test_event_slot_rejects_second_install_until_released() {
        let slot = EventSlot::new();
        let (first, _rx1) = mpsc::channel();
        let (second, _rx2) = mpsc::channel();
        let (third, _rx3) = mpsc::channel();

        slot.install(first).unwrap();
        assert!(matches!(slot.install(second), Err(CaptureError::AlreadyStarted)));
        slot.release();
        assert!(slot.install(third).is_ok());
    }

    #[test]
    fn test_message_loop_stops_on_quit_and_on_error() {
        assert!(message_retrieved(1));
        assert!(!message_retrieved(0));
        assert!(!message_retrieved(-1));
    }
}
