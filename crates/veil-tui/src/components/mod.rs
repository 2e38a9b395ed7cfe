pub mod header;
pub mod home;
pub mod search;
pub mod settings;
