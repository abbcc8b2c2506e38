use aml_core::generator::HtmlGenerator;
use aml_core::lexer::Lexer;
use aml_core::parser::Parser;
use aml_core::process;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// Test Data
// ============================================================================

const TINY_AML: &str = "<red>Short and certain.\n";

const SMALL_AML: &str = r#"<gray>Last spring I started learning 中文.

It went better than expected, see [[Spaced repetition]] and *this* note:
(<green>flashcards are scheduled by recall difficulty) which helped.

* 学习 every morning
* review at night
"#;

const MEDIUM_AML: &str = r#"<red>This post is opinionated.

A first paragraph with https://example.com/a-link, a title [#Overview#] and
a template {{isbn|978-0-13-468599-1}} that nobody will click.

<<<
Quoted paragraph one.
(<blue>a voice from beyond) interjects.

Quoted paragraph two, <<with a literal <b>tag</b>>> inside.
>>>

# first step
# second step
# third step

--MORE--

<teal> <<<
Generated text that goes on for a while, mentioning 中文 and 汉字.
>>>

----

> and then
> and then again
"#;

const LARGE_AML: &str = r#"<violet>Serious matters first.

<<<
<<<
Nested quotes are unusual but legal.
>>>
And the outer one continues with (<mogue>a small action) and (<hazel>a story).
>>>

Watch https://www.youtube.com/watch?v=dQw4w9WgXcQ before reading on.

(<red>never closed, so this stays text
[[dangling link
<<raw and <<nested>> without end
<purple>not a color

* one
* two
* three

<xantham>Obviously this is the best design ever written.
<orange>Except that it might not be.

{{cite|{{nested|deep}} outer}} and 你好世界 with [#A Title#].
"#;

// Generate a long post for stress testing
fn generate_post(paragraphs: usize) -> String {
    let mut aml = String::new();
    for i in 0..paragraphs {
        aml.push_str(&format!(
            "<gray>Paragraph {i} mentions 学习 and [[Topic {i}]] with *emphasis* (<green>detail {i}).\n\n"
        ));
        if i % 10 == 0 {
            aml.push_str("* item\n* item\n\n");
        }
    }
    aml
}

const SIZES: [(&str, &str); 4] = [
    ("tiny", TINY_AML),
    ("small", SMALL_AML),
    ("medium", MEDIUM_AML),
    ("large", LARGE_AML),
];

// ============================================================================
// Lexer Benchmarks
// ============================================================================

fn bench_lexer_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_by_size");

    for (name, source) in SIZES {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| Lexer::new(black_box(src)).lex())
        });
    }

    group.finish();
}

fn bench_lexer_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_paragraph_scaling");

    for size in [10, 100, 1000] {
        let source = generate_post(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| Lexer::new(black_box(src)).lex())
        });
    }

    group.finish();
}

// ============================================================================
// Parser Benchmarks
// ============================================================================

fn bench_parser_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_by_size");

    for (name, source) in SIZES {
        let tokens = Lexer::new(source).lex().unwrap();
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &tokens, |b, tokens| {
            b.iter(|| Parser::new(black_box(tokens.clone())).parse_document())
        });
    }

    group.finish();
}

// ============================================================================
// Generator Benchmarks
// ============================================================================

fn bench_render_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_by_size");

    for (name, source) in SIZES {
        let document = Parser::from_source(source).unwrap().parse_document();
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &document, |b, doc| {
            b.iter(|| HtmlGenerator::new().render(black_box(doc)))
        });
    }

    group.finish();
}

// ============================================================================
// End-to-End Benchmarks
// ============================================================================

fn bench_e2e(c: &mut Criterion) {
    let mut group = c.benchmark_group("e2e_to_html");

    for (name, source) in SIZES {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| process(black_box(src), "benchmark.aml").map(|p| p.to_html()))
        });
    }

    group.finish();
}

fn bench_e2e_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("e2e_paragraph_scaling");

    for size in [10, 100, 1000] {
        let source = generate_post(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| process(black_box(src), "benchmark.aml").map(|p| p.to_html()))
        });
    }

    group.finish();
}

criterion_group!(lexer_benches, bench_lexer_sizes, bench_lexer_scaling);

criterion_group!(parser_benches, bench_parser_sizes);

criterion_group!(render_benches, bench_render_sizes);

criterion_group!(e2e_benches, bench_e2e, bench_e2e_scaling);

criterion_main!(lexer_benches, parser_benches, render_benches, e2e_benches);
