mod employee_list;

pub use employee_list::{EmployeeListView, ListEvent};
