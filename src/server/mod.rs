pub mod address;
mod browse;
mod files;
pub mod html;
mod pages;
pub mod response;
mod router;
mod sites;
pub mod validation;

pub use router::{AppState, create_router};
