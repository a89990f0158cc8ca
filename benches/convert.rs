use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::Rng;
use luma_bench::{
    PixelBuffer,
    kernel::{Kernel, LoopKernel, VectorKernel, smart_kernel},
};

const SIZES: [(usize, usize); 3] = [(100, 100), (480, 640), (1080, 1920)];

fn random_rgb8(height: usize, width: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..height * width * 3)
        .map(|_| rng.random_range(0..=255u8))
        .collect()
}

fn bench_rgb8_to_luma8(c: &mut Criterion) {
    let mut group = c.benchmark_group("rgb8_to_luma8");

    for (height, width) in SIZES {
        let samples = random_rgb8(height, width);
        let input = PixelBuffer::rgb8(&samples, height, width);
        let label = format!("{width}x{height}");

        group.throughput(Throughput::Elements((height * width) as u64));

        group.bench_with_input(BenchmarkId::new("loop", &label), &input, |b, input| {
            let mut kernel = LoopKernel;
            b.iter(|| kernel.convert(black_box(input)));
        });

        group.bench_with_input(BenchmarkId::new("portable", &label), &input, |b, input| {
            let mut kernel = VectorKernel;
            b.iter(|| kernel.convert(black_box(input)));
        });

        #[cfg(target_arch = "x86_64")]
        if luma_bench::kernel::x86::Avx2Kernel::required_hardware_features_met() {
            group.bench_with_input(BenchmarkId::new("avx2", &label), &input, |b, input| {
                let mut kernel = luma_bench::kernel::x86::Avx2Kernel;
                b.iter(|| kernel.convert(black_box(input)));
            });
        }

        group.bench_with_input(BenchmarkId::new("smart", &label), &input, |b, input| {
            let mut kernel = smart_kernel();
            b.iter(|| kernel.convert(black_box(input)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rgb8_to_luma8);
criterion_main!(benches);
