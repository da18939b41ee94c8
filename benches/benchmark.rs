//! Performance benchmarks for rs-scrapy.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Crawly queries over a small synthetic catalog page
//! - A full scrape pipeline over the same page
//! - Synthetic listings of growing size for `map` throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rs_scrapy::{Crawly, ScrapyBuilder};
use serde_json::json;

const SAMPLE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sample Catalog</title>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/about">About</a>
    </nav>
    <main>
        <h1 class="title">  Spring   sale  </h1>
        <ul id="products">
            <li class="product" data-sku="A-1"><a href="/a">Lamp</a><span class="price">15.25</span></li>
            <li class="product" data-sku="B-2"><a href="/b">Desk</a><span class="price">120</span></li>
            <li class="product" data-sku="C-3"><a href="/c">Chair</a><span class="price">49.90</span></li>
        </ul>
    </main>
    <footer>
        <p>Copyright 2024</p>
    </footer>
</body>
</html>
"#;

fn listing(items: usize) -> String {
    let rows: String = (0..items)
        .map(|i| format!(r#"<li class="product"><a href="/p/{i}">Item {i}</a><span class="price">{i}.99</span></li>"#))
        .collect();
    format!("<html><body><ul>{rows}</ul></body></html>")
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("crawly_parse", |b| {
        b.iter(|| Crawly::new(black_box(SAMPLE_HTML)));
    });
}

fn bench_queries(c: &mut Criterion) {
    let mut crawly = Crawly::new(SAMPLE_HTML);

    c.bench_function("crawly_queries", |b| {
        b.iter(|| {
            let title = crawly.filter(black_box("h1.title")).trim().string();
            let price = crawly.filter(black_box(".price")).nth(1).float();
            let sku = crawly.filter(black_box(".product")).pluck("data-sku");
            crawly.reset();
            (title, price, sku)
        });
    });
}

fn bench_scrape(c: &mut Criterion) {
    c.bench_function("scrape_pipeline", |b| {
        b.iter(|| {
            let mut scrapy = ScrapyBuilder::make()
                .html(black_box(SAMPLE_HTML))
                .function(|crawly, mut output, _| {
                    output.insert("title".into(), crawly.filter("h1").trim().string().into());
                    Ok(output)
                })
                .function(|crawly, mut output, _| {
                    let prices: Vec<f64> = crawly.filter(".price").map(|sub, _| Some(sub.float()));
                    output.insert("prices".into(), json!(prices));
                    Ok(output)
                })
                .build();
            scrapy.scrape()
        });
    });
}

/// Benchmark `map` over listings of growing size
fn bench_map_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_listing");

    for items in [10, 100, 1000] {
        let html = listing(items);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("map", items), &html, |b, html| {
            b.iter(|| {
                let mut crawly = Crawly::new(black_box(html));
                crawly
                    .filter(".product")
                    .map(|sub, _| sub.filter("a").pluck("href"))
                    .len()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_queries,
    bench_scrape,
    bench_map_listing
);
criterion_main!(benches);
