mod catalog;
mod helpers;
mod routes;
pub mod utils;
