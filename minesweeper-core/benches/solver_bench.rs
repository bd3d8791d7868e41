use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minesweeper_core::{play_seeded, BatchConfig, Board, PolicyKind};

fn classic() -> BatchConfig {
  BatchConfig {
    policy: PolicyKind::Estimator,
    ..BatchConfig::default()
  }
}

fn expert() -> BatchConfig {
  BatchConfig {
    rows: 16,
    cols: 30,
    mines: 99,
    ..classic()
  }
}

fn bench_flood_fill_empty_board() {
  let mut board = Board::new(100, 100, 0).unwrap();
  board.reveal(50, 50);
  black_box(board.revealed_count());
}

fn bench_solve_classic(seed: u64) {
  let (summary, _) = play_seeded(&classic(), seed).unwrap();
  black_box(summary);
}

fn bench_solve_expert(seed: u64) {
  let (summary, _) = play_seeded(&expert(), seed).unwrap();
  black_box(summary);
}

fn criterion_benchmark(c: &mut Criterion) {
  c.bench_function("flood_fill_100x100", |b| b.iter(bench_flood_fill_empty_board));

  let mut seed = 0u64;
  c.bench_function("solve_classic_10x10", |b| {
    b.iter(|| {
      seed += 1;
      bench_solve_classic(seed)
    })
  });

  let mut group = c.benchmark_group("expert");
  group.sample_size(20);
  let mut seed = 0u64;
  group.bench_function("solve_expert_16x30", |b| {
    b.iter(|| {
      seed += 1;
      bench_solve_expert(seed)
    })
  });
  group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
