pub mod migrations;
pub mod schema;

pub use migrations::{apply_migrations, initialize_schema, seed_default_admin};
