//! Performance benchmarks for the monthly ranking aggregation
//!
//! Run with: cargo bench

use cdn_usage_charts::models::{MonthlyTotal, UsageRecord};
use cdn_usage_charts::ranking::RankingAggregator;
use cdn_usage_charts::totals::TotalsFormatter;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Generate `resources` usage rows for each of `months` months
fn generate_records(resources: usize, months: u32) -> Vec<UsageRecord> {
    let mut records = Vec::with_capacity(resources * months as usize);
    for month in 0..months {
        for i in 0..resources {
            records.push(UsageRecord {
                library: format!("lib{}", i % 500),
                version: format!("{}.{}.0", i % 7, i % 3),
                file: format!("file{}.min.js", i),
                year: 2018 + (month / 12) as i32,
                month: month % 12 + 1,
                requests: ((i as u64 * 7919 + month as u64 * 104_729) % 1_000_000) * 1000,
                bandwidth: (i as u64 * 31) % 100_000,
            });
        }
    }
    records
}

fn benchmark_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");

    for resources in [100, 1_000, 10_000].iter() {
        let records = generate_records(*resources, 36);

        group.bench_with_input(
            BenchmarkId::from_parameter(resources),
            resources,
            |b, _| {
                let aggregator = RankingAggregator::new(5);
                b.iter(|| aggregator.aggregate(black_box(&records)));
            },
        );
    }

    group.finish();
}

fn benchmark_totals(c: &mut Criterion) {
    let totals: Vec<MonthlyTotal> = (0..240u32)
        .rev()
        .map(|m| MonthlyTotal {
            date: format!("{:04}-{:02}", 2000 + m / 12, m % 12 + 1),
            total_requests: m as u64 * 1_000_000_000,
            total_bandwidth: m as u64 * 1_000,
        })
        .collect();

    c.bench_function("totals_format_240_months", |b| {
        b.iter(|| TotalsFormatter::format(black_box(&totals)))
    });
}

criterion_group!(benches, benchmark_ranking, benchmark_totals);
criterion_main!(benches);
