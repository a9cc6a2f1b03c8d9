pub mod compliance;
pub mod leave_request;
