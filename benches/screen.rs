//! Screen benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use term3270::core::Screen;
use term3270::protocol::{Change, Color, Indication, RowChanges, ScreenUpdate};
use term3270::render::NullSink;
use term3270::session::Session;

/// A full-screen repaint: every row rewritten with text plus an attribute span
fn full_repaint(rows: u16, cols: u16) -> ScreenUpdate {
    let text: String = "HELLO WORLD ".chars().cycle().take(cols as usize).collect();
    ScreenUpdate {
        cursor: None,
        rows: (1..=rows)
            .map(|row| RowChanges {
                row,
                changes: vec![
                    Change::text(1, text.clone()).with_fg(Color::Green),
                    Change::count(1, 10).with_gr("highlight,selectable"),
                ],
            })
            .collect(),
    }
}

fn bench_screen_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let update = full_repaint(24, 80);
    group.throughput(Throughput::Elements(24 * 80));
    group.bench_function("full_repaint", |b| {
        let mut screen = Screen::new(24, 80, Color::NeutralWhite, Color::NeutralBlack);
        b.iter(|| {
            screen.apply_update(black_box(&update), &mut NullSink).ok();
        })
    });

    group.bench_function("resize", |b| {
        let mut screen = Screen::new(24, 80, Color::NeutralWhite, Color::NeutralBlack);
        b.iter(|| {
            screen.resize(black_box(43), black_box(80), &mut NullSink);
        })
    });

    group.finish();
}

fn bench_decode_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    let message = serde_json::to_string(&Indication::Screen(full_repaint(24, 80))).unwrap_or_default();
    group.throughput(Throughput::Bytes(message.len() as u64));
    group.bench_function("decode_dispatch", |b| {
        let mut session = Session::default();
        b.iter(|| {
            session.process(black_box(&message), &mut NullSink).ok();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_screen_update, bench_decode_dispatch);
criterion_main!(benches);
