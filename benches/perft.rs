use criterion::{criterion_group, criterion_main, Criterion};

use pincer::game::board::Position;
use pincer::search::perft::perft;

fn perft_startpos(c: &mut Criterion) {
    // warm the magic tables outside the measurement loop
    let mut pos = Position::default();
    perft(&mut pos, 1);

    c.bench_function("perft_4_startpos", |b| {
        b.iter(|| {
            let mut pos = Position::default();
            perft(&mut pos, 4)
        })
    });
}

fn perft_kiwipete(c: &mut Criterion) {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    c.bench_function("perft_3_kiwipete", |b| {
        b.iter(|| {
            let mut pos = Position::from_fen(fen).unwrap();
            perft(&mut pos, 3)
        })
    });
}

criterion_group!(benches, perft_startpos, perft_kiwipete);
criterion_main!(benches);
