// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use blockmerge_bench::step_signal;
use blockmerge_core::{CanonicalHash, ReproMode, TimeSeriesView};
use blockmerge_costs::BlockL2Cost;
use blockmerge_table::{CostTableBuilder, CostTableConfig};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const N: usize = 100_000;

fn benchmark_table_build(c: &mut Criterion) {
    let values = step_signal(N);
    let view = TimeSeriesView::univariate(&values).expect("benchmark view should be valid");

    let mut group = c.benchmark_group("table_build");

    for n_blocks in [64usize, 512] {
        let cost = BlockL2Cost::new(&view, n_blocks).expect("cost should precompute");

        for (label, repro_mode) in [("strict", ReproMode::Strict), ("fast", ReproMode::Fast)] {
            let builder = CostTableBuilder::new(CostTableConfig {
                repro_mode,
                ..CostTableConfig::default()
            })
            .expect("config should validate");

            group.bench_function(format!("l2_{label}_blocks{n_blocks}"), |b| {
                b.iter(|| {
                    builder
                        .build(
                            black_box(&view),
                            black_box(n_blocks),
                            black_box(&cost),
                            &CanonicalHash,
                        )
                        .expect("build should succeed")
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_table_build);
criterion_main!(benches);
