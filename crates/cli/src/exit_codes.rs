//! CLI Exit Code Registry
//!
//! Single source of truth for `dexsync` exit codes. Scripts and CI jobs
//! rely on these values.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad args, missing input file)       |
//! | 3    | `--check`: species files would change            |
//! | 52   | Sheet download rejected (4xx)                    |
//! | 54   | Sheet download failed after retries (5xx, network) |
//! | 60   | Invalid config                                   |
//! | 61   | Runtime error (sheet, species file, output)      |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Sync (3, 60-61)
// =============================================================================

/// `run --check` found files that a real run would rewrite.
pub const EXIT_CHECK_CHANGES: u8 = 3;

/// Config file could not be parsed or failed validation.
pub const EXIT_SYNC_INVALID_CONFIG: u8 = 60;

/// Sheet, species file or output failure during a run.
pub const EXIT_SYNC_RUNTIME: u8 = 61;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Request rejected by upstream (4xx other than 429).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Upstream error (429, 5xx) or network failure after retries.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;

use dexsync_recon::ReconError;

/// Map a library error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_SYNC_INVALID_CONFIG,
        _ => EXIT_SYNC_RUNTIME,
    }
}
