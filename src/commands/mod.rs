pub mod attachments;
pub mod get;
pub mod label;
pub mod list;
pub mod send;
