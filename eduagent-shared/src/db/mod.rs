/// Database layer
///
/// - `pool`: PostgreSQL connection pool with an eager health check and a lazy
///   variant for starting without a reachable database
/// - `migrations`: embedded schema migrations
///
/// Row models live in the crate-level `models` module.

pub mod migrations;
pub mod pool;
