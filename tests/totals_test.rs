mod common;

use cdn_usage_charts::totals::{TotalsFormatter, BANDWIDTH_LABEL, REQUESTS_LABEL};
use chrono::NaiveDate;
use common::total;

fn ymd(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

#[test]
fn test_totals_sorted_chronologically() {
    let series = TotalsFormatter::format(&[total("2021-01", 1000, 500), total("2020-12", 900, 400)]).unwrap();

    assert_eq!(series.dates(), vec![ymd(2020, 12), ymd(2021, 1)]);
    assert_eq!(series.requests.values(), vec![900, 1000]);
    assert_eq!(series.bandwidth.values(), vec![400, 500]);
    assert_eq!(series.requests.label, REQUESTS_LABEL);
    assert_eq!(series.bandwidth.label, BANDWIDTH_LABEL);
}

#[test]
fn test_sequences_share_ascending_dates() {
    let rows = vec![
        total("2019-07", 7, 70),
        total("2021-03", 3, 30),
        total("2020-01", 1, 10),
        total("2019-12", 12, 120),
        total("2020-11", 11, 110),
    ];
    let series = TotalsFormatter::format(&rows).unwrap();

    assert_eq!(series.requests.len(), rows.len());
    assert_eq!(series.requests.len(), series.bandwidth.len());
    assert_eq!(series.requests.dates(), series.bandwidth.dates());
    assert!(series.dates().windows(2).all(|w| w[0] <= w[1]));

    // values stay paired with their own month
    for (r, b) in series.requests.points.iter().zip(&series.bandwidth.points) {
        assert_eq!(r.value * 10, b.value);
    }
}

#[test]
fn test_duplicate_dates_kept_in_input_order() {
    let series = TotalsFormatter::format(&[
        total("2021-02", 5, 5),
        total("2021-01", 1, 1),
        total("2021-01", 2, 2),
    ])
    .unwrap();

    assert_eq!(series.requests.values(), vec![1, 2, 5]);
    assert_eq!(series.dates(), vec![ymd(2021, 1), ymd(2021, 1), ymd(2021, 2)]);
}

#[test]
fn test_empty_totals_are_not_an_error() {
    let series = TotalsFormatter::format(&[]).unwrap();
    assert!(series.requests.is_empty());
    assert!(series.bandwidth.is_empty());
}

#[test]
fn test_unparseable_date_fails() {
    let err = TotalsFormatter::format(&[total("2021-01", 1, 1), total("21/02", 1, 1)]).unwrap_err();
    assert!(format!("{:#}", err).contains("21/02"));
}
