// Ledger operation benchmarks.
//
// Covers the hot write paths (mint, transfer, invest, consumption report)
// and the boundary dispatch overhead of a JSON call.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use gridledger_contracts::Ledger;
use gridledger_protocol::config::DEFAULT_OPERATOR;
use gridledger_protocol::{Call, Principal};

fn wallet(i: usize) -> Principal {
    Principal::new(format!("ST{:03}WALLET", i))
}

/// A ledger with `n` funded wallets.
fn setup_ledger(n: usize) -> (Ledger, Vec<Principal>) {
    let ledger = Ledger::default();
    let operator = Principal::from(DEFAULT_OPERATOR);
    let wallets: Vec<_> = (0..n).map(wallet).collect();
    for w in &wallets {
        ledger.mint(&operator, w, u64::MAX / (2 * n as u64)).unwrap();
    }
    (ledger, wallets)
}

fn bench_mint(c: &mut Criterion) {
    let (ledger, wallets) = setup_ledger(1);
    let operator = Principal::from(DEFAULT_OPERATOR);

    c.bench_function("ledger/mint", |b| {
        b.iter(|| ledger.mint(&operator, &wallets[0], 1).unwrap());
    });
}

fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/transfer");

    for &n in &[2usize, 100, 10_000] {
        let (ledger, wallets) = setup_ledger(n);
        let mut i = 0usize;
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let from = &wallets[i % n];
                let to = &wallets[(i + 1) % n];
                i = i.wrapping_add(1);
                ledger.transfer(from, to, 1).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_invest(c: &mut Criterion) {
    let (ledger, wallets) = setup_ledger(2);
    let id = ledger
        .create_project(&wallets[0], "Benchmark Solar", u64::MAX)
        .unwrap();

    c.bench_function("ledger/invest", |b| {
        b.iter(|| ledger.invest(&wallets[1], id, 1).unwrap());
    });
}

fn bench_report_consumption(c: &mut Criterion) {
    let ledger = Ledger::default();
    let operator = Principal::from(DEFAULT_OPERATOR);
    ledger.update_grid_status(&operator, 1, 1_000_000, 0).unwrap();
    let users: Vec<_> = (0..1_000).map(wallet).collect();
    let mut i = 0usize;

    c.bench_function("ledger/report_consumption", |b| {
        b.iter(|| {
            let user = &users[i % users.len()];
            ledger
                .report_consumption(user, 1, (i % 97) as u64)
                .unwrap();
            i = i.wrapping_add(1);
        });
    });
}

fn bench_execute(c: &mut Criterion) {
    let (ledger, wallets) = setup_ledger(2);
    let raw = format!(
        r#"{{"method":"transfer","params":{{"sender":"{}","recipient":"{}","amount":1}}}}"#,
        wallets[0], wallets[1]
    );

    c.bench_function("ledger/execute_json_transfer", |b| {
        b.iter(|| {
            let call = Call::from_json(&raw).unwrap();
            ledger.execute(call)
        });
    });
}

criterion_group!(
    benches,
    bench_mint,
    bench_transfer,
    bench_invest,
    bench_report_consumption,
    bench_execute,
);
criterion_main!(benches);
