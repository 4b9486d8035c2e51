pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod stats;
pub mod tickets;

pub use routes::create_router;
