mod common;

use cdn_usage_charts::models::MonthKey;
use cdn_usage_charts::ranking::RankingAggregator;
use common::usage;

fn sample_records() -> Vec<cdn_usage_charts::models::UsageRecord> {
    let libraries = ["jquery", "react", "vue", "lodash", "moment", "d3", "axios"];
    let mut records = Vec::new();
    for month in 1..=6u32 {
        for (i, library) in libraries.iter().enumerate() {
            // Rotate request counts so the ranking changes month to month
            let requests = ((i as u64 + month as u64 * 3) % 7) * 1000 + i as u64;
            records.push(usage(library, 2021, month, requests));
        }
    }
    records
}

#[test]
fn test_top_two_of_three() {
    let records = vec![
        usage("a", 2021, 1, 100),
        usage("b", 2021, 1, 50),
        usage("c", 2021, 1, 200),
    ];
    let report = RankingAggregator::new(2).aggregate(&records);

    let top = &report.monthly_top[&MonthKey::new(2021, 1)];
    let ranked: Vec<(&str, usize)> = top.iter().map(|e| (e.library.as_str(), e.position)).collect();
    assert_eq!(ranked, vec![("c", 1), ("a", 2)]);
    assert!(report.series.iter().all(|s| s.resource.library != "b"));
}

#[test]
fn test_monthly_top_is_bounded_and_sorted() {
    let records = sample_records();
    for limit in 1..=8 {
        let report = RankingAggregator::new(limit).aggregate(&records);
        for entries in report.monthly_top.values() {
            assert!(entries.len() <= limit);
            assert!(entries.windows(2).all(|w| w[0].requests >= w[1].requests));
            let positions: Vec<usize> = entries.iter().map(|e| e.position).collect();
            assert_eq!(positions, (1..=entries.len()).collect::<Vec<_>>());
        }
    }
}

#[test]
fn test_every_series_spans_every_month() {
    let records = sample_records();
    let report = RankingAggregator::new(3).aggregate(&records);

    assert_eq!(report.months.len(), 6);
    for series in &report.series {
        let months: Vec<&MonthKey> = series.points.iter().map(|p| &p.month).collect();
        let expected: Vec<&MonthKey> = report.months.iter().collect();
        assert_eq!(months, expected);
        assert!(series.best_position().is_some());
    }
}

#[test]
fn test_tracked_set_is_union_of_monthly_tops() {
    let records = sample_records();
    let report = RankingAggregator::new(2).aggregate(&records);

    for series in &report.series {
        let ranked_somewhere = report
            .monthly_top
            .values()
            .any(|entries| entries.iter().any(|e| e.resource() == series.resource));
        assert!(ranked_somewhere);
    }

    let mut in_tops: Vec<_> = report
        .monthly_top
        .values()
        .flat_map(|entries| entries.iter().map(|e| e.resource()))
        .collect();
    in_tops.sort();
    in_tops.dedup();
    assert_eq!(in_tops.len(), report.tracked_count());
}

#[test]
fn test_present_points_match_monthly_top() {
    let records = sample_records();
    let report = RankingAggregator::new(3).aggregate(&records);

    for series in &report.series {
        for point in &series.points {
            let top = &report.monthly_top[&point.month];
            let expected = top.iter().find(|e| e.resource() == series.resource);
            assert_eq!(point.entry.as_ref(), expected);
        }
    }
}

#[test]
fn test_idempotent() {
    let records = sample_records();
    let aggregator = RankingAggregator::new(5);
    assert_eq!(aggregator.aggregate(&records), aggregator.aggregate(&records));
}

#[test]
fn test_independent_of_input_order() {
    let records = vec![
        usage("b", 2021, 1, 10),
        usage("a", 2021, 1, 10),
        usage("c", 2021, 2, 7),
        usage("a", 2021, 2, 7),
    ];
    let mut reversed = records.clone();
    reversed.reverse();

    let aggregator = RankingAggregator::new(1);
    assert_eq!(aggregator.aggregate(&records), aggregator.aggregate(&reversed));
}

#[test]
fn test_months_across_years_are_chronological() {
    let records = vec![
        usage("a", 2021, 1, 1),
        usage("a", 2020, 12, 1),
        usage("a", 2020, 2, 1),
    ];
    let report = RankingAggregator::new(5).aggregate(&records);
    let months: Vec<&str> = report.months.iter().map(MonthKey::as_str).collect();
    assert_eq!(months, vec!["2020-02", "2020-12", "2021-01"]);
}

#[test]
fn test_empty_input_has_no_series() {
    let report = RankingAggregator::new(5).aggregate(&[]);
    assert!(report.series.is_empty());
    assert!(report.monthly_top.is_empty());
}
