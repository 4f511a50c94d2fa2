//! SeaORM entities for the DevCollab platform.
//!
//! Developer accounts live in `users`, company accounts in `companies`. The
//! embedded sub-lists of a developer profile are JSON columns, while the
//! relationship lists (connections, connection requests) get their own tables
//! so they can be queried and updated transactionally.

pub mod application;
pub mod company;
pub mod connection_request;
pub mod job;
pub mod user;
pub mod user_connection;

pub mod prelude {
    pub use super::application::Entity as Application;
    pub use super::company::Entity as Company;
    pub use super::connection_request::Entity as ConnectionRequest;
    pub use super::job::Entity as Job;
    pub use super::user::Entity as User;
    pub use super::user_connection::Entity as UserConnection;
}
