pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_directors_router, directors_collection};
