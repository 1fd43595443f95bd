// benches/benchmarks.rs — Performance benchmarks (criterion)
//
// The local work around one gateway call:
//   1. Encoding — MIME sniffing + base64 of typical photo sizes
//   2. Rendering — markdown analysis text to terminal text
//   3. Instruction — template render at startup

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pixelscribe::cli::render::markdown_to_terminal;
use pixelscribe::core::instruction::InstructionTemplate;
use pixelscribe::image::mime::detect_mime;
use pixelscribe::image::EncodedImage;

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Fake JPEG of `len` bytes: real signature, filler body.
fn fake_jpeg(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend((0..len.saturating_sub(4)).map(|i| (i % 251) as u8));
    bytes
}

fn sample_analysis() -> String {
    let mut md = String::from("# Overview\n\nA kitchen table seen from above.\n\n");
    for section in ["Objects", "Colors", "Layout", "Details"] {
        md.push_str(&format!("## {section}\n\n"));
        for i in 0..8 {
            md.push_str(&format!("- item {i} with *emphasis* and `code`\n"));
        }
        md.push('\n');
    }
    md
}

// ─── Benchmarks ─────────────────────────────────────────────────────────────

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");

    for size in [64 * 1024, 1024 * 1024, 4 * 1024 * 1024] {
        let bytes = fake_jpeg(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("from_bytes", size), &bytes, |b, bytes| {
            b.iter(|| EncodedImage::from_bytes(black_box(bytes)).expect("encode"))
        });
    }

    let bytes = fake_jpeg(64);
    group.bench_function("detect_mime", |b| b.iter(|| detect_mime(black_box(&bytes))));

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let md = sample_analysis();
    c.bench_function("markdown_to_terminal", |b| {
        b.iter(|| markdown_to_terminal(black_box(&md)))
    });
}

fn bench_instruction(c: &mut Criterion) {
    let template = InstructionTemplate::default();
    c.bench_function("instruction_render", |b| {
        b.iter(|| {
            template
                .render(black_box("Vietnamese"), black_box("respectful and precise"))
                .expect("render")
        })
    });
}

// ─── Main ───────────────────────────────────────────────────────────────────

criterion_group!(benches, bench_encoding, bench_render, bench_instruction);
criterion_main!(benches);
