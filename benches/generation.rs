use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use olap_sample_data::analysis::{LazyBackend, Query, QueryBackend};
use olap_sample_data::config::GeneratorConfig;
use olap_sample_data::generate::{StarSchemaGenerator, generate_sales_fact, table_rng};
use olap_sample_data::types::StarTable;

fn config(records: usize) -> GeneratorConfig {
    GeneratorConfig {
        sales_records: records,
        ..Default::default()
    }
}

fn bench_fact_generation(c: &mut Criterion) {
    let schema = StarSchemaGenerator::new(config(0)).generate().unwrap();
    let mut group = c.benchmark_group("fact_generation");
    for records in [10_000usize, 100_000] {
        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, &n| {
            b.iter(|| {
                let mut rng = table_rng(42, StarTable::Sales);
                black_box(generate_sales_fact(&mut rng, schema.dimensions(), n).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_yearly_query(c: &mut Criterion) {
    let frames = StarSchemaGenerator::new(config(100_000))
        .generate()
        .unwrap()
        .to_frames()
        .unwrap();

    let mut group = c.benchmark_group("sales_by_year");
    group.bench_function("lazy", |b| {
        let backend = LazyBackend::new(&frames);
        b.iter(|| black_box(backend.run(&Query::SalesByYear).unwrap()))
    });
    #[cfg(feature = "sql")]
    group.bench_function("sql", |b| {
        let backend = olap_sample_data::analysis::SqlBackend::new(&frames);
        b.iter(|| black_box(backend.run(&Query::SalesByYear).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_fact_generation, bench_yearly_query);
criterion_main!(benches);
