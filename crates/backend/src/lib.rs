pub mod handlers;
pub mod routes;
pub mod shared;
pub mod state;
pub mod system;
