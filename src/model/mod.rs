pub mod account;
pub mod attendee;
pub mod role;
pub mod slot;
pub mod volunteer;
