//! Leave compliance rules. Pure code: no database, clock or request context.

pub mod balance;
pub mod error;
pub mod flow;
pub mod policy;
pub mod report;
pub mod validator;
