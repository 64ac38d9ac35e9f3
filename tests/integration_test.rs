use std::path::PathBuf;

use assert_approx_eq::assert_approx_eq;
use chrono::NaiveDate;
use proptest::prelude::*;

use sales_analyzer::{
    analysis::{
        daily_buckets, describe, group_by, growth_rate, moving_average_forecast, sales_summary,
        DailyBucket, GroupKey,
    },
    error::SalesError,
    export::{export_excel, EXCEL_REPORT},
    io,
    models::{Column, SalesRecord, SalesTable},
    Analyzer,
};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_sales.csv")
}

fn load_sample() -> SalesTable {
    io::read_table(sample_path()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// --- Sample data ---

#[test]
fn test_sample_loads_cleanly() {
    let table = load_sample();
    assert_eq!(table.len(), 25);
    assert_eq!(table.columns(), &Column::ALL[..]);
    assert!(table.load_report().is_clean());
}

#[test]
fn test_sample_summary_total_is_exact_sum() {
    let table = load_sample();
    let summary = sales_summary(&table).unwrap().unwrap();
    let expected: f64 = table.records().iter().filter_map(|r| r.amount).sum();
    assert_approx_eq!(summary.total, expected);
    assert_approx_eq!(summary.total, 11052.0);
    assert_eq!(summary.count, 25);
    assert_eq!(summary.max, 1300.0);
    assert_eq!(summary.min, 22.75);
}

#[test]
fn test_sample_group_by_product() {
    let table = load_sample();
    let by_product = group_by(&table, GroupKey::Product).unwrap();
    assert_eq!(by_product.groups.len(), 4);
    assert_approx_eq!(by_product.total(), 11052.0);

    let keys: Vec<&str> = by_product.groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["Laptop", "Monitor", "Keyboard", "Mouse"]);
    assert_approx_eq!(by_product.get("Laptop").unwrap().total, 8580.0);
}

#[test]
fn test_sample_group_by_region() {
    let table = load_sample();
    let by_region = group_by(&table, GroupKey::Region).unwrap();
    assert_eq!(by_region.groups.len(), 4);
    assert_eq!(by_region.groups[0].key, "East");
    assert_approx_eq!(by_region.get("West").unwrap().total, 2049.75);
}

#[test]
fn test_sample_describe() {
    let stats = describe(&load_sample());
    let columns: Vec<Column> = stats.iter().map(|s| s.column).collect();
    assert_eq!(columns, vec![Column::Amount, Column::Quantity]);
    assert_eq!(stats[0].count, 25);
    assert_approx_eq!(stats[0].mean, 442.08);
    assert!(stats[0].std_dev.unwrap() > 0.0);
}

#[test]
fn test_sample_trend_and_forecast() {
    let table = load_sample();
    let buckets = daily_buckets(&table).unwrap();
    assert_eq!(buckets.len(), 13);
    assert_eq!(buckets[0].date, date(2024, 1, 1));
    assert_approx_eq!(buckets[0].amount, 1225.5);

    let growth = growth_rate(&buckets).unwrap();
    assert_approx_eq!(growth, (1275.0 - 1225.5) / 1225.5 * 100.0);

    let forecast = Analyzer::new(&table).forecast(7).unwrap();
    assert_eq!(forecast.window, 7);
    assert_eq!(forecast.points.len(), 7);
    assert_eq!(forecast.points[0].date, date(2024, 1, 14));
    assert!(forecast.points.iter().all(|p| (p.amount - 881.25).abs() < 1e-9));
}

// --- Hand-made tables ---

#[test]
fn test_describe_omits_empty_columns() {
    let table = SalesTable::new(
        "no quantities",
        vec![Column::Amount, Column::Quantity],
        vec![SalesRecord {
            amount: Some(10.0),
            ..Default::default()
        }],
    );
    let stats = describe(&table);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].column, Column::Amount);
}

#[test]
fn test_single_bucket_forecast_repeats() {
    let bucket = DailyBucket {
        date: date(2024, 6, 30),
        amount: 42.0,
        quantity: 1,
        records: 1,
        amount_records: 1,
    };
    let forecast = moving_average_forecast(&[bucket], 7, 7).unwrap();
    let amounts: Vec<f64> = forecast.points.iter().map(|p| p.amount).collect();
    assert_eq!(amounts, vec![42.0; 7]);
    assert_eq!(forecast.points[6].date, date(2024, 7, 7));
}

#[test]
fn test_two_day_growth_is_one_hundred_percent() {
    let rec = |d, amount| SalesRecord {
        date: Some(date(2024, 1, d)),
        amount: Some(amount),
        ..Default::default()
    };
    let table = SalesTable::new(
        "growth",
        vec![Column::Date, Column::Amount],
        vec![rec(1, 100.0), rec(2, 200.0)],
    );
    let rate = Analyzer::new(&table).growth_rate().unwrap();
    assert_approx_eq!(rate, 100.0);
}

#[test]
fn test_missing_amount_column_is_not_a_load_error() {
    let err = sales_summary(&SalesTable::new("t", vec![Column::Product], vec![])).unwrap_err();
    assert!(matches!(err, SalesError::MissingColumn(Column::Amount)));
    assert!(!err.is_load_error());
}

// --- Loading edge cases ---

#[test]
fn test_malformed_cells_become_missing() {
    let csv = "Date,Product,Amount,Quantity\n\
               2024-01-01,Laptop,\"$1,200.50\",1\n\
               not-a-date,Mouse,25,2\n\
               2024-01-03,Cable,abc,x\n\
               ,,,\n\
               garbage,Pen,oops,1\n";
    let table = io::read_csv_from_bytes(csv.as_bytes(), "messy").unwrap();
    // row 5 has neither a date nor an amount
    assert_eq!(table.len(), 3);
    assert_eq!(table.load_report().skipped_rows, 1);
    assert_eq!(table.load_report().invalid_cells, 5);
    assert_eq!(table.records()[0].amount, Some(1200.5));
    assert_eq!(table.records()[1].date, None);
    assert_eq!(table.records()[2].amount, None);
}

#[test]
fn test_missing_file_is_load_error() {
    let err = io::read_table("does/not/exist.csv").unwrap_err();
    assert!(matches!(err, SalesError::FileNotFound(_)));
    assert!(err.is_load_error());
}

#[test]
fn test_unsupported_extension() {
    assert!(matches!(
        io::read_table("sales.parquet"),
        Err(SalesError::UnsupportedFormat(_))
    ));
}

// --- Format round trips ---

#[test]
fn test_csv_to_json_to_excel_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let original = load_sample();

    let json_path = dir.path().join("sales.json");
    io::write_json(&original, &json_path, true).unwrap();
    let from_json = io::read_table(&json_path).unwrap();

    let xlsx_path = dir.path().join("sales.xlsx");
    io::write_excel(&from_json, &xlsx_path).unwrap();
    let from_excel = io::read_table(&xlsx_path).unwrap();

    assert_eq!(from_excel.len(), original.len());
    assert_approx_eq!(
        sales_summary(&from_excel).unwrap().unwrap().total,
        sales_summary(&original).unwrap().unwrap().total
    );
}

#[test]
fn test_excel_report_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(EXCEL_REPORT);
    let table = load_sample();
    export_excel(&Analyzer::new(&table), &path).unwrap();

    let back = io::read_excel(&path).unwrap();
    assert_eq!(back.len(), table.len());
    assert_eq!(back.columns(), table.columns());
}

// --- Invariants ---

fn arb_record() -> impl Strategy<Value = SalesRecord> {
    (
        proptest::option::of(0u32..60),
        proptest::option::of(prop::sample::select(vec!["A", "B", "C", "D"])),
        proptest::option::of(-1_000.0f64..10_000.0),
        proptest::option::of(0u32..50),
    )
        .prop_map(|(day, product, amount, quantity)| SalesRecord {
            date: day.and_then(|d| date(2024, 1, 1).checked_add_days(chrono::Days::new(d.into()))),
            product: product.map(str::to_string),
            amount,
            quantity,
            ..Default::default()
        })
}

fn arb_table() -> impl Strategy<Value = SalesTable> {
    prop::collection::vec(arb_record(), 0..80).prop_map(|records| {
        SalesTable::new(
            "prop",
            vec![Column::Date, Column::Product, Column::Amount, Column::Quantity],
            records,
        )
    })
}

proptest! {
    #[test]
    fn prop_group_totals_sum_to_summary(table in arb_table()) {
        let grouped = group_by(&table, GroupKey::Product).unwrap();
        match sales_summary(&table).unwrap() {
            Some(summary) => prop_assert!((grouped.total() - summary.total).abs() < 1e-6),
            None => prop_assert_eq!(grouped.total(), 0.0),
        }
        let counted: usize = grouped.groups.iter().map(|g| g.count).sum();
        prop_assert_eq!(counted, table.numeric_values(Column::Amount).len());
    }

    #[test]
    fn prop_group_order_is_descending(table in arb_table()) {
        let grouped = group_by(&table, GroupKey::Product).unwrap();
        for pair in grouped.groups.windows(2) {
            prop_assert!(pair[0].total >= pair[1].total);
        }
    }

    #[test]
    fn prop_buckets_strictly_ascending(table in arb_table()) {
        let buckets = daily_buckets(&table).unwrap();
        for pair in buckets.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        let dated = table.records().iter().filter(|r| r.date.is_some()).count();
        prop_assert_eq!(buckets.iter().map(|b| b.records).sum::<usize>(), dated);
    }

    #[test]
    fn prop_forecast_is_flat(table in arb_table(), horizon in 0u32..30) {
        match Analyzer::new(&table).forecast(horizon) {
            Ok(forecast) => {
                prop_assert_eq!(forecast.points.len(), horizon as usize);
                if let Some(first) = forecast.points.first() {
                    prop_assert!(forecast.points.iter().all(|p| p.amount == first.amount));
                }
            }
            Err(e) => prop_assert!(matches!(e, SalesError::InsufficientData(_))),
        }
    }
}
