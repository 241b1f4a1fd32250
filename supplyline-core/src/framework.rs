use sqlx::PgPool;

/// Executes database command objects against the connection pool.
///
/// Each query in `entities` is a small command struct with a
/// `kanau::processor::Processor` implementation on this type.
#[derive(Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
