pub mod invite;
pub mod keys;
