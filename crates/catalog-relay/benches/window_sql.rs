use catalog_relay::catalog::{ITEM_PERFORMERS, ITEM_TAGS};
use catalog_relay::source::postgres::{count_sql, window_sql};
use catalog_relay::{Filter, Fragment, Item, Membership, Seek, SortOrder, Sorting, Value, Window};
use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Base filter with `n` performers and `n` tags to match.
fn build_filter(n: i64) -> Filter {
    Filter::new()
        .with(Membership::new(ITEM_PERFORMERS, 0..n))
        .with(Membership::new(ITEM_TAGS, 0..n))
        .with(Fragment::eq("publisher_id", 7_i64))
}

fn release_date_desc() -> Sorting {
    Sorting::resolve::<Item>(Some("releaseDate"), Some(SortOrder::Desc))
}

fn build_window(n: i64) -> Window {
    let sorting = release_date_desc();
    let anchor = [Value::from(NaiveDate::from_ymd_opt(2020, 1, 1)), Value::Int(42)];
    Window {
        filter: build_filter(n).with(Seek::after(&sorting, &anchor)),
        sorting,
        limit: 21,
    }
}

fn bench_window_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_sql/render");

    for n in [1, 5, 20, 100] {
        let window = build_window(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &window, |b, window| {
            b.iter(|| black_box(window_sql::<Item>(window).to_sql()));
        });
    }

    group.finish();
}

fn bench_count_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_sql/count");

    for n in [1, 5, 20, 100] {
        let filter = build_filter(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &filter, |b, filter| {
            b.iter(|| black_box(count_sql::<Item>(filter).to_sql()));
        });
    }

    group.finish();
}

fn bench_seek_expansion(c: &mut Criterion) {
    let sorting = release_date_desc();
    let anchor = [Value::Null, Value::Int(42)];

    c.bench_function("window_sql/seek_null_anchor", |b| {
        b.iter(|| {
            let filter = Filter::new()
                .with(Seek::after(&sorting, &anchor))
                .with(Seek::before(&sorting, &anchor));
            black_box(window_sql::<Item>(&Window {
                filter,
                sorting: sorting.clone(),
                limit: 21,
            })
            .to_sql())
        });
    });
}

criterion_group!(benches, bench_window_sql, bench_count_sql, bench_seek_expansion);
criterion_main!(benches);
