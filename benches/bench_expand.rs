#![allow(
    clippy::unwrap_used,
    clippy::tests_outside_test_module,
    reason = "benchmark"
)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use zencode::{expand, Mode, Options};

const HTML_CORPUS: &[&str] = &[
    "ul#name>li.item*2",
    "div>(header>h1{Hi})+footer{©}",
    "table+",
    "!",
    "form>label[for=q]+input#q+btn:s{Go}",
    "ul>li.row$[data-n=$$]*10>a[href=#]{link $}",
    "div.wrap>p*4>{lorem line $}",
];

const CSS_CORPUS: &[&str] = &[
    "m10-20",
    "-bdrs5",
    "c#f.5",
    "w100p+h50p+fl:l",
    "bd1-#2s+bgc#f5+op0.8",
    "pos:a+t0+l0+z100",
];

fn expansion_benchmark(c: &mut Criterion) {
    let options = Options::default();

    let mut group = c.benchmark_group("Abbreviation Expansion");
    group.sample_size(50);

    group.bench_function("expand_html", |b| {
        b.iter(|| {
            for abbreviation in HTML_CORPUS {
                black_box(expand(abbreviation, Mode::Html, &options).unwrap());
            }
        });
    });

    group.bench_function("expand_css", |b| {
        b.iter(|| {
            for abbreviation in CSS_CORPUS {
                black_box(expand(abbreviation, Mode::Css, &options).unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, expansion_benchmark);
criterion_main!(benches);
