//! CLI Exit Code Registry
//!
//! Every exit code the binary can return is defined here. Wrapper scripts
//! and CI jobs branch on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                  |
//! |---------|-----------|----------------------------------------------|
//! | 0       | Universal | Success                                      |
//! | 1       | Universal | General error (unspecified)                  |
//! | 2       | Universal | CLI usage error (bad args)                   |
//! | 60-69   | migrate   | Config, input, fetch and results failures    |
//!
//! A run that skipped records still exits 0; skips are reported in the
//! results file, not through the exit code.
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map the failing error to it in `CliError`

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - the run completed. Individual records may still have been
/// skipped.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown subcommand.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Migrate (60-69)
// =============================================================================

/// `amplify_outputs.json` or `rostersync.toml` missing, unreadable, or
/// lacking a section the command needs.
pub const EXIT_CONFIG: u8 = 60;

/// Roster or intake file missing or not a JSON array of objects.
pub const EXIT_INPUT: u8 = 61;

/// A remote collection could not be fetched in full. Nothing was written.
pub const EXIT_FETCH: u8 = 62;

/// The results file could not be written. Remote writes already happened.
pub const EXIT_RESULTS_WRITE: u8 = 63;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_CONFIG,
            EXIT_INPUT,
            EXIT_FETCH,
            EXIT_RESULTS_WRITE,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
