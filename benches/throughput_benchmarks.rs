use criterion::{Criterion, black_box, criterion_group, criterion_main};
use netspeed_watcher::collectors::adapters::{AdapterDescriptor, AdapterId, ByteCounters, LinkType};
use netspeed_watcher::collectors::throughput::{
    AdapterSelector, CounterReading, RateSampler, SampleState, SpeedUnit, UnitMode, format_speed,
    tooltip_text,
};
use std::time::Duration;
use tokio::time::Instant;

/// A busy workstation: virtual switches and tunnels ahead of the real uplink
fn crowded_adapter_list() -> Vec<AdapterDescriptor> {
    let mut adapters = vec![AdapterDescriptor::new("lo", LinkType::Loopback)];
    for i in 0..12 {
        adapters.push(
            AdapterDescriptor::new(format!("veth{:04x}", i), LinkType::Wired).with_gateway(i % 3 == 0),
        );
    }
    adapters.push(
        AdapterDescriptor::new("vEthernet (Default Switch)", LinkType::Wired)
            .with_description("Hyper-V Virtual Ethernet Adapter")
            .with_gateway(true),
    );
    adapters.push(AdapterDescriptor::new("utun3", LinkType::Other).with_gateway(true));
    adapters.push(AdapterDescriptor::new("en0", LinkType::Wireless).with_gateway(true));
    adapters
}

/// Benchmark primary adapter selection
fn benchmark_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapter_selection");
    let selector = AdapterSelector::default();
    let adapters = crowded_adapter_list();

    group.bench_function("crowded_list", |b| {
        b.iter(|| black_box(selector.select(black_box(&adapters))));
    });

    let extended = AdapterSelector::with_extra_denylist(["tailscale", "zerotier", "wireguard"]);
    group.bench_function("crowded_list_extended_denylist", |b| {
        b.iter(|| black_box(extended.select(black_box(&adapters))));
    });

    group.finish();
}

/// Benchmark one sampling step on an established baseline
fn benchmark_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rate_sampling");
    let sampler = RateSampler::default();
    let adapter = AdapterId::new("en0");

    group.bench_function("steady_tick", |b| {
        let mut state = SampleState::new();
        let mut now = Instant::from_std(std::time::Instant::now());
        let mut received = 0u64;
        sampler.sample(
            Some(&CounterReading::new(adapter.clone(), ByteCounters::new(0, 0))),
            now,
            &mut state,
        );

        b.iter(|| {
            now += Duration::from_secs(1);
            received += 1_250_000;
            let reading = CounterReading::new(adapter.clone(), ByteCounters::new(received, received / 10));
            black_box(sampler.sample(Some(&reading), now, &mut state));
        });
    });

    group.bench_function("debounced_tick", |b| {
        let mut state = SampleState::new();
        let now = Instant::from_std(std::time::Instant::now());
        let reading = CounterReading::new(adapter.clone(), ByteCounters::new(1_000, 1_000));
        sampler.sample(Some(&reading), now, &mut state);

        b.iter(|| black_box(sampler.sample(Some(&reading), now, &mut state)));
    });

    group.finish();
}

/// Benchmark display formatting
fn benchmark_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");

    group.bench_function("auto_units", |b| {
        b.iter(|| {
            for value in [512u64, 48_000, 3_400_000] {
                black_box(format_speed(black_box(value), UnitMode::Auto));
            }
        });
    });

    group.bench_function("megabits", |b| {
        b.iter(|| black_box(format_speed(black_box(93_750_000), UnitMode::Fixed(SpeedUnit::MegabitsPerSec))));
    });

    group.bench_function("tooltip", |b| {
        let rate = (1_480_000u64, 36_500u64);
        b.iter(|| {
            black_box(tooltip_text(
                netspeed_watcher::collectors::throughput::ThroughputRate::new(rate.0, rate.1),
                UnitMode::Auto,
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_selection, benchmark_sampling, benchmark_formatting);
criterion_main!(benches);
