//! Damage ledger benchmarks: recording and assist computation on long
//! histories.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use hazard_royale::config::CombatConfig;
use hazard_royale::game::damage::{DamageCause, DamageSource, DamageTick};
use hazard_royale::game::ledger::DamageLedger;
use hazard_royale::game::roster::ActorId;
use hazard_royale::GameInstant;

const VICTIM: ActorId = ActorId::new([0xEE; 16]);

fn filled_ledger(ticks: u64, attackers: u8) -> DamageLedger {
    let mut ledger = DamageLedger::new(CombatConfig::default()).expect("default config is valid");
    for i in 0..ticks {
        let attacker = ActorId::new([(i % u64::from(attackers)) as u8; 16]);
        let tick = DamageTick::new(
            1.0 + (i % 7) as f64,
            DamageCause::Melee,
            DamageSource::Player(attacker),
            "sword",
            GameInstant::from_millis(i * 5),
        )
        .expect("positive damage");
        ledger.record(VICTIM, tick);
    }
    ledger
}

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger");

    for &ticks in &[100u64, 1_000] {
        let ledger = filled_ledger(ticks, 8);
        let now = GameInstant::from_millis(ticks * 5);
        group.throughput(Throughput::Elements(ticks));
        group.bench_function(format!("compute_assists_{ticks}"), |b| {
            b.iter(|| black_box(ledger.compute_assists(black_box(&VICTIM), now)))
        });
    }

    group.bench_function("record_1000", |b| {
        b.iter_batched(
            || (),
            |_| black_box(filled_ledger(1_000, 8)),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_ledger);
criterion_main!(benches);
