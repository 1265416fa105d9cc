//! Instrumentos no meter global. Sem provider instalado viram no-op.
use once_cell::sync::OnceCell;
use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::{global, KeyValue};
use std::time::Instant;

static HIST: OnceCell<Histogram<f64>> = OnceCell::new();
static DUST: OnceCell<Counter<u64>> = OnceCell::new();
static ORACLE_FAIL: OnceCell<Counter<u64>> = OnceCell::new();

fn histogram() -> Histogram<f64> {
    HIST.get_or_init(|| {
        global::meter("squid_census")
            .f64_histogram("census_op_duration_seconds")
            .with_unit("s")
            .with_description("census operation duration")
            .build()
    })
    .clone()
}

fn dust_counter() -> Counter<u64> {
    DUST.get_or_init(|| {
        global::meter("squid_census")
            .u64_counter("census_dust_rejections")
            .with_description("LP quantities zeroed by the dust floor")
            .build()
    })
    .clone()
}

fn oracle_failure_counter() -> Counter<u64> {
    ORACLE_FAIL
        .get_or_init(|| {
            global::meter("squid_census")
                .u64_counter("census_oracle_failures")
                .with_description("pool quotes or price reads rejected upstream")
                .build()
        })
        .clone()
}

pub fn time<F, T>(op: &'static str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let out = f();
    let sec = start.elapsed().as_secs_f64();
    histogram().record(sec, &[KeyValue::new("op", op)]);
    out
}

pub fn count_dust(pool: &'static str) {
    dust_counter().add(1, &[KeyValue::new("pool", pool)]);
}

pub fn count_oracle_failure(source: &'static str) {
    oracle_failure_counter().add(1, &[KeyValue::new("source", source)]);
}
