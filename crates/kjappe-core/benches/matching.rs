use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kjappe_core::evaluator::{levenshtein, Evaluator};
use kjappe_core::model::Question;

fn bench_levenshtein(c: &mut Criterion) {
    let mut group = c.benchmark_group("levenshtein");

    group.bench_function("short", |b| {
        b.iter(|| levenshtein(black_box("mozart"), black_box("motzart")))
    });

    group.bench_function("unicode", |b| {
        b.iter(|| levenshtein(black_box("bjørnstjerne bjørnson"), black_box("bjornstjerne bjornson")))
    });

    group.bench_function("long_mismatch", |b| {
        b.iter(|| {
            levenshtein(
                black_box("the quick brown fox jumps over the lazy dog"),
                black_box("pack my box with five dozen liquor jugs"),
            )
        })
    });

    group.finish();
}

fn bench_verdict(c: &mut Criterion) {
    let mut group = c.benchmark_group("verdict");
    let evaluator = Evaluator::default();
    let aliases = ["Christiania", "Kristiania", "Oslo by", "Tigerstaden"];

    group.bench_function("exact", |b| {
        b.iter(|| evaluator.verdict(black_box(" OSLO "), black_box("Oslo"), black_box(&aliases)))
    });

    group.bench_function("alias_fuzzy", |b| {
        b.iter(|| evaluator.verdict(black_box("tigerstadn"), black_box("Oslo"), black_box(&aliases)))
    });

    group.bench_function("incorrect", |b| {
        b.iter(|| evaluator.verdict(black_box("Bergen"), black_box("Oslo"), black_box(&aliases)))
    });

    group.finish();
}

fn bench_grade(c: &mut Criterion) {
    let evaluator = Evaluator::default();
    let questions = vec![
        Question::new("Magic Flute?", "Mozart"),
        Question::new("Capital of Norway?", "Oslo").with_aliases(["Christiania", "Kristiania"]),
        Question::new("Fifth symphony?", "Beethoven"),
        Question::new("Four Seasons?", "Vivaldi"),
        Question::new("Peer Gynt?", "Grieg").with_aliases(["Edvard Grieg"]),
    ];
    let answers = ["mozzart", "kristiania", "bach", "vivaldi", "edvard grig"];

    c.bench_function("grade_five", |b| {
        b.iter(|| evaluator.grade(black_box(&questions), black_box(&answers)))
    });
}

criterion_group!(benches, bench_levenshtein, bench_verdict, bench_grade);
criterion_main!(benches);
