mod employee_dialog;
mod input;
mod key_result;

pub use employee_dialog::{DialogEvent, EmployeeDialog};
pub use key_result::KeyResult;
