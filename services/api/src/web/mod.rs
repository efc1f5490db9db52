pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;

pub use middleware::identify_user;
pub use router::build_router;
