// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanwerk-document crate: each degradation
// effect and the PDF renderer on a small synthetic page.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;

use scanwerk_core::{EffectKind, Intensity};
use scanwerk_document::{PdfRenderer, apply_effect};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 320x240 page: white background with dark "text" bars every 12 rows.
fn synthetic_page() -> RgbImage {
    RgbImage::from_fn(320, 240, |x, y| {
        if y % 12 < 4 && (20..300).contains(&x) {
            Rgb([40, 40, 40])
        } else {
            Rgb([250, 250, 250])
        }
    })
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_effects(c: &mut Criterion) {
    let page = synthetic_page();
    let intensity = Intensity::new(1.0).expect("valid intensity");

    for kind in EffectKind::ALL {
        c.bench_function(&format!("{kind} effect (320x240)"), |b| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                let out = apply_effect(kind, black_box(&page), intensity, &mut rng);
                black_box(out.ok());
            });
        });
    }
}

fn bench_render(c: &mut Criterion) {
    let page = synthetic_page();
    let renderer = PdfRenderer::a4();

    c.bench_function("render A4 artifact (320x240)", |b| {
        b.iter(|| black_box(renderer.render(black_box(&page)).ok()));
    });
}

criterion_group!(benches, bench_effects, bench_render);
criterion_main!(benches);
