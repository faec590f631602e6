#![allow(missing_docs)]

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use taskboard_core::task::{Status, Task, TaskDraft};
use taskboard_core::{DropEvent, Filters, apply_filters, group_by_status, resolve_drop};
use time::OffsetDateTime;

fn build_board(per_column: usize) -> Vec<Task> {
    let now = OffsetDateTime::now_utc();
    let mut tasks = Vec::with_capacity(per_column * Status::ALL.len());
    for status in Status::ALL {
        for idx in 0..per_column {
            let mut task = Task::from_draft(
                TaskDraft::new(format!("{status}-{idx}")).with_status(status),
                now,
            );
            #[allow(clippy::cast_precision_loss)]
            {
                task.order = (idx + 1) as f64 * 1000.0;
            }
            tasks.push(task);
        }
    }
    tasks
}

fn cross_column_drop_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_drop_cross_column");
    for &per_column in &[8usize, 64, 512] {
        group.bench_with_input(
            BenchmarkId::from_parameter(per_column),
            &per_column,
            |b, &size| {
                b.iter_batched(
                    || build_board(size),
                    |tasks| {
                        let grouped = group_by_status(apply_filters(&tasks, &Filters::default()));
                        let active = tasks[0].id;
                        let target = tasks[size * 3 + size / 2].id;
                        black_box(resolve_drop(&tasks, &grouped, &DropEvent::onto_task(active, target)));
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

fn same_column_reorder_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_drop_reorder");
    for &per_column in &[8usize, 64, 512] {
        group.bench_with_input(
            BenchmarkId::from_parameter(per_column),
            &per_column,
            |b, &size| {
                b.iter_batched(
                    || build_board(size),
                    |tasks| {
                        let grouped = group_by_status(&tasks);
                        let active = tasks[size - 1].id;
                        let target = tasks[0].id;
                        black_box(resolve_drop(&tasks, &grouped, &DropEvent::onto_task(active, target)));
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, cross_column_drop_benchmark, same_column_reorder_benchmark);
criterion_main!(benches);
