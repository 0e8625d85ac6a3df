use crate::errors::{Abort, CompilationError, Severity};
use crate::options::ErrorPolicy;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Sink for the user errors detected while analyzing one compilation unit.
///
/// Clones share the same underlying list, so a visitor can be copied freely while descending
/// into the tree.
#[derive(Clone)]
pub struct Diagnostics {
    errors: Rc<RefCell<Vec<CompilationError>>>,
    policy: ErrorPolicy,
}

impl Diagnostics {
    pub fn new(policy: ErrorPolicy) -> Diagnostics {
        Diagnostics {
            errors: Rc::new(RefCell::new(Vec::new())),
            policy,
        }
    }

    /// Records a problem. Under `ErrorPolicy::FailFast` errors (but not warnings) abort the
    /// current pass instead.
    pub fn report(&self, error: CompilationError) -> Result<(), Abort> {
        debug!("{}", error);
        if error.severity == Severity::Error && self.policy == ErrorPolicy::FailFast {
            return Err(Abort::Semantic(error));
        }
        self.errors.borrow_mut().push(error);
        Ok(())
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
            .borrow()
            .iter()
            .filter(|error| error.is_error())
            .count()
    }

    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of everything reported so far, in reporting order.
    pub fn snapshot(&self) -> Vec<CompilationError> {
        self.errors.borrow().clone()
    }

    pub fn into_vec(self) -> Vec<CompilationError> {
        match Rc::try_unwrap(self.errors) {
            Ok(errors) => errors.into_inner(),
            Err(shared) => shared.borrow().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{unreachable_code, unresolved_name};
    use crate::source::Position;

    #[test]
    fn collect_policy_keeps_going() {
        let diagnostics = Diagnostics::new(ErrorPolicy::Collect);
        let shared = diagnostics.clone();
        assert!(diagnostics.report(unresolved_name("a", Position::at(1, 1))).is_ok());
        assert!(shared.report(unresolved_name("b", Position::at(2, 1))).is_ok());
        assert_eq!(diagnostics.error_count(), 2);
    }

    #[test]
    fn fail_fast_policy_aborts_on_errors_only() {
        let diagnostics = Diagnostics::new(ErrorPolicy::FailFast);
        assert!(diagnostics.report(unreachable_code(Position::at(1, 1))).is_ok());
        assert!(!diagnostics.has_errors());
        match diagnostics.report(unresolved_name("a", Position::at(1, 1))) {
            Err(Abort::Semantic(error)) => assert_eq!(error.code(), "E0001"),
            _ => panic!("expected a semantic abort"),
        }
    }
}
