pub mod availability;
pub mod events;
pub mod projects;
pub mod users;
