//! Domain entities for ClickMacro.
//!
//! Pure business rules: no OS calls, no threads, no I/O. Outer layers (the
//! playback controller, the platform adapters) depend on these types, never
//! the other way around.

pub mod click;
pub mod clock;
pub mod session;
pub mod store;
