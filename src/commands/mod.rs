pub mod init;
pub mod scan;

use crate::output::Tally;

/// Exit bit set when any file was added
pub const EXIT_NEW: i32 = 1;
/// Exit bit set when any file was modified
pub const EXIT_MODIFIED: i32 = 2;
/// Exit bit set when any file was deleted
pub const EXIT_DELETED: i32 = 4;
/// Exit status for any error; overrides the change bits
pub const EXIT_ERROR: i32 = 125;

/// Combine change counts and the error flag into a process exit status.
#[must_use]
pub const fn exit_code(tally: &Tally, failed: bool) -> i32 {
    if failed {
        return EXIT_ERROR;
    }
    let mut code = 0;
    if tally.new > 0 {
        code |= EXIT_NEW;
    }
    if tally.modified > 0 {
        code |= EXIT_MODIFIED;
    }
    if tally.deleted > 0 {
        code |= EXIT_DELETED;
    }
    code
}
