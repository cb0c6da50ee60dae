//! Benchmarks for the CFR solver and the hand evaluator.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use holdem_cfr::cfr::{CFRConfig, CFRSolver};
use holdem_cfr::games::holdem::{parse_cards, HandEvaluator, HeadsUpHoldem, HoldemConfig};
use holdem_cfr::games::kuhn::KuhnPoker;

fn kuhn_iteration_benchmark(c: &mut Criterion) {
    let game = KuhnPoker::new();
    let config = CFRConfig::default().with_seed(42);
    let mut solver = CFRSolver::new(game, config);

    c.bench_function("kuhn_single_iteration", |b| {
        b.iter(|| {
            solver.run_iteration();
            black_box(solver.iteration())
        })
    });
}

fn kuhn_1000_iterations_benchmark(c: &mut Criterion) {
    c.bench_function("kuhn_1000_iterations", |b| {
        b.iter(|| {
            let game = KuhnPoker::new();
            let config = CFRConfig::default().with_seed(42).with_threads(1);
            let mut solver = CFRSolver::new(game, config);
            solver.train(black_box(1000)).info_sets
        })
    });
}

fn holdem_iteration_benchmark(c: &mut Criterion) {
    let game = HeadsUpHoldem::new(HoldemConfig::small());
    let config = CFRConfig::default().with_seed(42);
    let mut solver = CFRSolver::new(game, config);

    c.bench_function("holdem_small_single_iteration", |b| {
        b.iter(|| black_box(solver.run_iteration()))
    });
}

fn evaluate_seven_cards_benchmark(c: &mut Criterion) {
    let evaluator = HandEvaluator::new();
    let hands: Vec<_> = [
        "A♠ K♠ Q♠ J♠ 10♠ 2♦ 3♣",
        "7♥ 7♦ 7♣ K♠ K♦ 2♣ 9♥",
        "2♣ 4♦ 6♥ 8♠ 10♣ Q♦ A♥",
        "A♥ 2♥ 3♦ 4♣ 5♠ 9♦ J♣",
    ]
    .iter()
    .map(|s| parse_cards(s).expect("valid benchmark hand"))
    .collect();

    c.bench_function("evaluate_7_cards", |b| {
        b.iter(|| {
            for hand in &hands {
                black_box(evaluator.evaluate(black_box(hand)));
            }
        })
    });
}

criterion_group!(
    benches,
    kuhn_iteration_benchmark,
    kuhn_1000_iterations_benchmark,
    holdem_iteration_benchmark,
    evaluate_seven_cards_benchmark
);
criterion_main!(benches);
