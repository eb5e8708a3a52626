use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgrecord::{Chain, NamedSql, Operation, QueryBuilder};

/// SELECT col0,col1,... FROM t WHERE col0=:col0 AND col1=:col1 ...
fn build_select(qb: &mut QueryBuilder, n: usize) {
    qb.set_operation(Operation::Select)
        .set_table("t")
        .set_columns((0..n).map(|i| format!("col{i}")));
    for i in 0..n {
        if i > 0 {
            qb.set_chain(Chain::And);
        }
        qb.add_condition(format!("col{i}"), format!(":col{i}"));
    }
}

fn bench_render_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("qb/render_select");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut qb = QueryBuilder::new();
            b.iter(|| {
                build_select(&mut qb, n);
                black_box(qb.render().ok());
            });
        });
    }

    group.finish();
}

fn bench_render_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("qb/render_update");

    for n in [1, 5, 20, 100] {
        let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
        let values: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut qb = QueryBuilder::new();
            b.iter(|| {
                qb.set_operation(Operation::Update)
                    .set_table("t")
                    .set_columns(columns.iter().cloned())
                    .set_values(values.iter().cloned())
                    .add_condition("id", ":id");
                black_box(qb.render().ok());
            });
        });
    }

    group.finish();
}

fn bench_named_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("named/parse");

    for n in [1, 10, 100] {
        let mut qb = QueryBuilder::new();
        build_select(&mut qb, n);
        let sql = qb.render().unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &sql, |b, sql| {
            b.iter(|| black_box(NamedSql::parse(sql)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render_select,
    bench_render_update,
    bench_named_parse
);
criterion_main!(benches);
