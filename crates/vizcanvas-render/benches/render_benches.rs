use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::hint::black_box;
use vizcanvas_core::{Duration, VizConfig};
use vizcanvas_ir::{extract_from_str, normalize, sample_scene, Scene};
use vizcanvas_render::{Painter, RecordingSurface, RenderPipeline};

fn many_layers(count: usize) -> Scene {
    let layers: Vec<_> = (0..count)
        .map(|i| {
            let x = (i * 37 % 600) as f64;
            let y = (i * 53 % 400) as f64;
            match i % 4 {
                0 => json!({"type": "rect", "x": x, "y": y, "width": 40, "height": 20, "fill": "#3b82f6"}),
                1 => json!({"type": "circle", "x": x, "y": y, "r": 12, "fill": "#ef4444"}),
                2 => json!({"type": "line", "x1": 0, "y1": 0, "x2": x, "y2": y}),
                _ => json!({
                    "type": "rect", "x": x, "y": y, "width": 10, "height": 10,
                    "animations": [{"property": "x", "from": x, "to": x + 100.0, "end": 2000}]
                }),
            }
        })
        .collect();
    normalize(&json!({"duration": 4000, "layers": layers}))
        .scene
        .unwrap_or_else(sample_scene)
}

fn bench_extract(c: &mut Criterion) {
    let text = format!(
        "Here is the chart you asked for:\n```json\n{}\n```\nLet me know if you need changes.",
        json!({"layers": [{"type": "rect", "x": 10}, {"type": "circle", "r": 4}]})
    );
    c.bench_function("extract_fenced_json", |b| {
        b.iter(|| extract_from_str(black_box(&text)))
    });
}

fn bench_normalize(c: &mut Criterion) {
    let payload = json!({"answer": {"visualization": {"duration": 4000, "layers": [
        {"type": "rect", "props": {"x": 100, "y": 100, "width": 100, "height": 50}},
        {"type": "text", "content": "hello", "x": 20, "y": 20}
    ]}}});
    c.bench_function("normalize_nested_answer", |b| {
        b.iter(|| normalize(black_box(&payload)))
    });
}

fn bench_paint_recording(c: &mut Criterion) {
    let painter = Painter::new(&VizConfig::default());
    let scene = many_layers(200);
    c.bench_function("paint_200_layers_recording", |b| {
        b.iter(|| {
            let mut surface = RecordingSurface::new(800.0, 600.0);
            painter.paint(&mut surface, Some(&scene), Duration::from_millis(1000.0), None);
            black_box(surface.into_ops())
        })
    });
}

fn bench_render_raster(c: &mut Criterion) {
    let pipeline = RenderPipeline::new(&VizConfig::default(), 400.0, 300.0, 1.0);
    let scene = sample_scene();
    let mut group = c.benchmark_group("raster");
    group.sample_size(20);
    group.bench_function("sample_scene_frame", |b| {
        b.iter(|| pipeline.render_frame(Some(&scene), black_box(Duration::from_millis(1000.0)), None))
    });
    group.bench_function("demo_frame", |b| {
        b.iter(|| pipeline.render_frame(None, black_box(Duration::from_millis(1000.0)), None))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_extract,
    bench_normalize,
    bench_paint_recording,
    bench_render_raster
);
criterion_main!(benches);
