//! Benchmark for deck list parsing and scoring

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mtga_weights::loader::{DeckLoader, WeightRecord, WeightTable};
use mtga_weights::scoring::score_deck;
use mtga_weights::{FormatVariant, WeightKey};

const BASICS: [&str; 5] = ["Plains", "Island", "Swamp", "Mountain", "Forest"];

/// A 100-card Arena export with set annotations
fn arena_export(cards: usize) -> String {
    let mut deck = String::from("Commander\n1 Niv-Mizzet, Parun (GRN) 192\n\nDeck\n");
    for i in 0..cards {
        deck.push_str(&format!("1 Synthetic Card {i} (SET) {}\n", i + 1));
    }
    for basic in BASICS {
        deck.push_str(&format!("4 {basic} (ANA) 1\n"));
    }
    deck
}

/// The same deck squeezed onto one line
fn dense_export(cards: usize) -> String {
    let mut deck = String::new();
    for i in 0..cards {
        deck.push_str(&format!("1 Synthetic Card {} ", char::from(b'A' + (i % 26) as u8)));
    }
    deck
}

fn main_table(cards: usize) -> WeightTable {
    let key = WeightKey::main_deck(FormatVariant::Historic);
    let records = (0..cards)
        .map(|i| WeightRecord::new(format!("Synthetic Card {i}")).with_weight(key, (i % 7) as i64))
        .chain(BASICS.iter().map(|b| WeightRecord::new(*b).with_weight(key, 0)));
    WeightTable::from_records("main", records)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_deck");
    for cards in [60, 99, 250] {
        let line_deck = arena_export(cards);
        group.throughput(Throughput::Bytes(line_deck.len() as u64));
        group.bench_with_input(BenchmarkId::new("line", cards), &line_deck, |b, deck| {
            b.iter(|| DeckLoader::parse(black_box(deck)))
        });

        let dense_deck = dense_export(cards);
        group.bench_with_input(BenchmarkId::new("dense", cards), &dense_deck, |b, deck| {
            b.iter(|| DeckLoader::parse(black_box(deck)))
        });
    }
    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let table = main_table(20_000);
    let deck = DeckLoader::parse(&arena_export(99));

    c.bench_function("score_deck_99", |b| {
        b.iter(|| {
            score_deck(
                black_box(&deck.entries),
                &table,
                None,
                FormatVariant::Historic,
            )
        })
    });
}

criterion_group!(benches, bench_parse, bench_score);
criterion_main!(benches);
