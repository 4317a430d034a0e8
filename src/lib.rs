mod database {
    pub mod actions;
    pub mod error;
    pub mod filters;
    pub mod form;
    pub mod memory;
    pub mod pagination;
    pub mod postgres;
    pub mod schema;
    pub mod store;
}
mod authentication {
    pub mod cryptography;
    pub mod middleware;
    pub mod permissions;
    pub mod session;
}
mod services {
    pub mod composition;
    pub mod presentation;
    pub mod relations;
    pub mod shopping;
    pub mod users;
}
mod constants;
mod settings;

pub use authentication::*;
pub use constants::*;
pub use database::*;
pub use services::*;
pub use settings::*;
