//! Platform-specific pointer injection.
//!
//! The correct implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`; [`platform_injector`] hands back the one for the
//! current OS.

use std::sync::Arc;

use crate::application::replay_clicks::{InjectionError, PointerInjector};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Returns the pointer injector for the running OS.
///
/// # Errors
///
/// [`InjectionError::UnsupportedPlatform`] where no native injector exists.
/// Use `--dry-run` there to exercise replay with the recording injector.
pub fn platform_injector() -> Result<Arc<dyn PointerInjector>, InjectionError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsPointerInjector::new()))
    }
    #[cfg(not(target_os = "windows"))]
    {
        Err(InjectionError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_platform_injector_reports_unsupported_os() {
        let result = platform_injector();
        assert!(matches!(
            result,
            Err(InjectionError::UnsupportedPlatform(ref os)) if os == std::env::consts::OS
        ));
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn test_platform_injector_is_available_on_windows() {
        assert!(platform_injector().is_ok());
    }
}
