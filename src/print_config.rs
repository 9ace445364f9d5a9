//! Process-wide pretty-printing toggles. These affect how a parsed [`Value`]
//! is rendered for humans only — parse/build behavior never reads them —
//! but the names/defaults live in core so a separate pretty-printer crate
//! and this one agree on them.

use std::sync::OnceLock;

/// Tuning knobs for human-facing rendering of a parsed [`crate::value::Value`].
#[derive(Debug, Clone, Copy)]
pub struct PrintConfig {
    /// Show boolean fields that are `false` (otherwise only `true` flags
    /// are rendered, to keep large bitfield dumps readable).
    pub print_false_flags: bool,
    /// Render the full contents of `Str`/`Bytes` values instead of eliding
    /// long ones with `...`.
    pub print_full_strings: bool,
    /// Include fields whose name starts with `_` (otherwise treated as
    /// engine-private and hidden).
    pub print_private_entries: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        PrintConfig {
            print_false_flags: false,
            print_full_strings: false,
            print_private_entries: false,
        }
    }
}

static GLOBAL: OnceLock<std::sync::RwLock<PrintConfig>> = OnceLock::new();

fn cell() -> &'static std::sync::RwLock<PrintConfig> {
    GLOBAL.get_or_init(|| std::sync::RwLock::new(PrintConfig::default()))
}

/// The current process-wide print configuration.
pub fn print_config() -> PrintConfig {
    *cell().read().expect("print config lock poisoned")
}

/// Replace the process-wide print configuration. Intended to be called once
/// at startup; never from inside `parse_in`/`build_in`.
pub fn set_print_config(config: PrintConfig) {
    *cell().write().expect("print config lock poisoned") = config;
}
