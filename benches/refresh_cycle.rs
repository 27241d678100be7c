// Run with:  cargo bench --bench refresh_cycle

use core::convert::Infallible;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use embedded_hal::delay::DelayNs;
use pxmatrix::{BitPlaneBuffer, Builder, COLOR_DEPTH, Color, Geometry, PanelInterface, RowPattern, ScanDriver};
use std::hint::black_box;

/// Interface that only counts bytes, so the bench measures the driver
#[derive(Default)]
struct CountingInterface {
    bytes: usize,
}

impl PanelInterface for CountingInterface {
    type Error = Infallible;

    fn set_address(&mut self, address: u8) -> Result<(), Self::Error> {
        black_box(address);
        Ok(())
    }

    fn send_row(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.bytes += black_box(data).len();
        Ok(())
    }

    fn latch(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn show<D: DelayNs>(&mut self, on_time_us: u32, delay: &mut D) -> Result<(), Self::Error> {
        delay.delay_us(on_time_us);
        Ok(())
    }

    fn blank(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn refresh_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh_cycle");

    for (name, rows) in [("rows8", RowPattern::Rows8), ("rows16", RowPattern::Rows16)] {
        let config = Builder::new()
            .geometry(Geometry::new(64, 32).unwrap())
            .row_pattern(rows)
            .build()
            .unwrap();
        let mut frame = BitPlaneBuffer::new(&config);
        frame.fill(Color::new(90, 180, 255));
        group.throughput(Throughput::Bytes(frame.as_bytes().len() as u64));

        group.bench_function(name, |b| {
            let mut driver = ScanDriver::new(CountingInterface::default());
            b.iter(|| driver.refresh_cycle(black_box(&frame), 0, &mut NoDelay));
        });

        group.bench_function(format!("{name}_single_plane"), |b| {
            let mut driver = ScanDriver::new(CountingInterface::default());
            let mut plane = 0;
            b.iter(|| {
                let result = driver.scan_plane(black_box(&frame), plane, 0, &mut NoDelay);
                plane = (plane + 1) % COLOR_DEPTH;
                result
            });
        });
    }

    group.finish();
}

criterion_group!(benches, refresh_cycle);
criterion_main!(benches);
