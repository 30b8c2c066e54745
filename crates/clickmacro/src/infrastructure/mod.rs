//! Infrastructure layer for clickmacro.
//!
//! Contains OS-facing adapters: global input hooks, pointer injection and
//! file-system configuration.
//!
//! # Sub-modules
//!
//! - **`input_capture`** – the `InputSource` trait, its Windows hook
//!   implementation, and a mock for tests.
//! - **`pointer_injection`** – implementations of `PointerInjector`: Windows
//!   `SendInput`, and a recording injector used by tests and `--dry-run`.
//! - **`storage`** – the TOML configuration file.

pub mod input_capture;
pub mod pointer_injection;
pub mod storage;
