pub mod locations;
pub mod users;
pub mod visits;
