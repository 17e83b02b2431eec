//! Store metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record how long one store operation took.
pub fn record_query_duration(backend: &'static str, query_name: &str, duration_secs: f64) {
    histogram!(
        "store_query_duration_seconds",
        "backend" => backend,
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record connection pool gauges. Called on every readiness ping.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a store operation; call `record` once it completes.
///
/// ```ignore
/// let timer = QueryTimer::new("find_event_by_code");
/// let result = sqlx::query_as::<_, EventEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    backend: &'static str,
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    /// Timer for a Postgres query.
    pub fn new(query_name: impl Into<String>) -> Self {
        Self::for_backend("postgres", query_name)
    }

    pub fn for_backend(backend: &'static str, query_name: impl Into<String>) -> Self {
        Self {
            backend,
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(self.backend, &self.query_name, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_defaults_to_postgres() {
        let timer = QueryTimer::new("find_event_by_code");
        assert_eq!(timer.backend, "postgres");
        assert_eq!(timer.query_name, "find_event_by_code");
    }

    #[test]
    fn test_query_timer_for_memory_backend() {
        let timer = QueryTimer::for_backend("memory", String::from("list_slots"));
        assert_eq!(timer.backend, "memory");
        timer.record();
    }
}
