mod e0001_unresolved_name;
mod e0002_type_mismatch;
mod e0003_duplicate_catch;
mod e0004_catch_not_thrown;
mod e0005_duplicate_declaration;
mod e0006_uncaught_exception;
mod e0007_unreachable_code;
mod e0008_invalid_branch_target;
mod e0009_invalid_construct;
mod e0010_unassigned_variable;

pub mod constructors {
    pub use super::e0001_unresolved_name::*;
    pub use super::e0002_type_mismatch::*;
    pub use super::e0003_duplicate_catch::*;
    pub use super::e0004_catch_not_thrown::*;
    pub use super::e0005_duplicate_declaration::*;
    pub use super::e0006_uncaught_exception::*;
    pub use super::e0007_unreachable_code::*;
    pub use super::e0008_invalid_branch_target::*;
    pub use super::e0009_invalid_construct::*;
    pub use super::e0010_unassigned_variable::*;
}
