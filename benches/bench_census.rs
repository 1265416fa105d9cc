use std::time::Duration;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use squid_census::census::memory::{FixedPriceFeed, InMemoryToken, StaticPool};
use squid_census::{Address, Census, CensusConfig, Wad, WAD};


#[inline] fn w(n: u128) -> Wad { n * WAD }


fn bench_voting_balance(c: &mut Criterion) {
let mut g = c.benchmark_group("voting_balance");
g.warm_up_time(Duration::from_secs(2));
g.measurement_time(Duration::from_secs(5));
g.sample_size(300);
g.throughput(Throughput::Elements(1));


// (rótulo, bruto, lp SQUID/ETH, lp SQUID/SQUILL)
let cases: [(&str, Wad, Wad, Wad); 5] = [
("raw_only", w(1_000), 0, 0),
("both_lp", w(1_000), w(12), w(40)),
("dust_lp", w(1_000), 5_000_000, 1),
("large", w(5_000_000_000), w(1_000_000), w(1_000_000)),
("lp_only", 0, w(3), w(7)),
];


for (label, raw, lp_a, lp_b) in cases {
let voter = Address::from_low_u64_be(1);
let census = Census::new(
InMemoryToken::new().with_balance(voter, raw),
StaticPool::new(w(1_513)).with_lp_balance(voter, lp_a),
StaticPool::new(12_600_000_000_000_000_000).with_lp_balance(voter, lp_b),
FixedPriceFeed::new(),
CensusConfig::default(),
)
.unwrap();
g.bench_function(label, |b| {
b.iter(|| {
let v = census.voting_balance(black_box(&voter)).unwrap();
black_box(v);
});
});
}
g.finish();
}


fn bench_snapshot(c: &mut Criterion) {
let mut g = c.benchmark_group("snapshot");
g.warm_up_time(Duration::from_secs(2));
g.measurement_time(Duration::from_secs(5));


for n in [10u64, 100, 1_000] {
let voters: Vec<Address> = (1..=n).map(Address::from_low_u64_be).collect();
let token = voters.iter().fold(InMemoryToken::new(), |t, v| t.with_balance(*v, w(v.to_low_u64_be() as u128)));
let pool = voters.iter().fold(StaticPool::new(w(2)), |p, v| p.with_lp_balance(*v, w(1)));
let census = Census::new(token, pool, StaticPool::new(WAD), FixedPriceFeed::new(), CensusConfig::default()).unwrap();
g.throughput(Throughput::Elements(n));
g.bench_function(format!("voters_{n}"), |b| {
b.iter(|| black_box(census.snapshot(black_box(&voters)).unwrap()));
});
}
g.finish();
}


criterion_group!(benches, bench_voting_balance, bench_snapshot);
criterion_main!(benches);
