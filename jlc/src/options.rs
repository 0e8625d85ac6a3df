//! Options for controlling analysis behavior.

use crate::errors::Severity;

/// What a pass does when it detects a user error.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorPolicy {
    /// Record the error and keep analyzing, so that independent errors are all reported.
    Collect,

    /// Abort the pass at the first error.
    FailFast,
}

#[derive(Clone, Copy, Debug)]
pub struct CompilerOptions {
    pub error_policy: ErrorPolicy,

    /// Upper bound on disambiguation rounds spent waiting for pending lookups.
    pub max_disambiguation_rounds: usize,

    /// How unreachable statements are reported.
    pub unreachable_code: Severity,

    pub check_exceptions: bool,
    pub build_cfg: bool,
}

impl Default for CompilerOptions {
    fn default() -> CompilerOptions {
        CompilerOptions {
            error_policy: ErrorPolicy::Collect,
            max_disambiguation_rounds: 8,
            unreachable_code: Severity::Warning,
            check_exceptions: true,
            build_cfg: true,
        }
    }
}

impl CompilerOptions {
    pub fn fail_fast() -> CompilerOptions {
        CompilerOptions {
            error_policy: ErrorPolicy::FailFast,
            ..CompilerOptions::default()
        }
    }
}
