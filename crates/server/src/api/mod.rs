pub mod assets;
pub mod handlers;
pub mod middleware;
pub mod parse;
pub mod routes;

pub use routes::create_router;
