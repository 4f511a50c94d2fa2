pub mod applications;
pub mod companies;
pub mod connections;
pub mod health;
pub mod jobs;
pub mod users;
