//! End-to-end acceptance: raw device bytes through unwrap, noise
//! filtering, windowing and re-encoding — the full path a camera grabber
//! and a downstream algorithm exercise, without any transport attached.

use std::sync::Arc;

use aeris_core::{
    Collector, EventBatch, FilterConfig, NoiseFilter, RawStreamDecoder, SkinHalf,
    SkinSamplePairer, TimeWindow,
};
use aeris_core::{encode_into, read_batch};
use aeris_types::{AddressEvent, Event, Polarity, SensorGeometry, SkinEvent, Stamp, MAX_STAMP};

fn le_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn camera_to_window_pipeline() {
    // A tight burst around one pixel neighborhood plus one isolated
    // outlier, straddling a counter rollover.
    let stamps = [MAX_STAMP - 40, MAX_STAMP - 30, MAX_STAMP - 20, 10, 20];
    let pixels = [(60u16, 60u16), (61, 60), (60, 61), (61, 61), (100, 9)];
    let mut words = Vec::new();
    for (raw, (x, y)) in stamps.iter().zip(pixels) {
        encode_into(
            &Event::Address(AddressEvent::new(Stamp::new(*raw), x, y, Polarity::On)),
            &mut words,
        );
    }

    let mut decoder = RawStreamDecoder::new();
    let decoded = decoder.feed(&le_bytes(&words));
    assert_eq!(decoded.len(), 5);
    assert_eq!(decoder.dropped_bytes(), 0);
    // Unwrapped times are monotonic across the rollover
    assert!(decoded.windows(2).all(|pair| pair[0].time <= pair[1].time));

    let mut filter = NoiseFilter::new(SensorGeometry::dvs128(), FilterConfig::default()).unwrap();
    let mut window = TimeWindow::from_duration(100).unwrap();
    let mut kept = 0;
    for timed in &decoded {
        let Event::Address(ae) = timed.event else {
            panic!("camera stream is address events");
        };
        if filter.check_event(&ae) {
            window.add_event(Arc::new(timed.event));
            kept += 1;
        }
    }
    // The first burst event has no prior neighbor and the outlier is
    // isolated; the middle three pass.
    assert_eq!(kept, 3);
    assert_eq!(window.len(), 3);

    // Re-encode the windowed survivors for the outbound port.
    let mut outbound = EventBatch::new();
    for handle in window.events().iter() {
        outbound.push(handle);
    }
    let (round_tripped, stats) = read_batch(outbound.groups());
    assert_eq!(stats.decoded, 3);
    assert_eq!(round_tripped.len(), 3);
}

#[test]
fn producer_consumer_handoff_with_stop_flag() {
    let collector = Arc::new(Collector::new());
    let geometry = SensorGeometry::dvs128();

    let producer = {
        let collector = Arc::clone(&collector);
        std::thread::spawn(move || {
            for i in 0..500u32 {
                let stamp = Stamp::new((i * 50) % MAX_STAMP);
                let event = Event::Address(AddressEvent::new(
                    stamp,
                    (i % geometry.width) as u16,
                    (i / geometry.width) as u16,
                    Polarity::On,
                ));
                collector.push(Arc::new(event));
            }
            collector.request_stop();
        })
    };

    let mut total = 0;
    let mut cycles_skipped = 0;
    loop {
        let batch = collector.drain();
        if batch.is_empty() {
            if collector.stop_requested() {
                break;
            }
            cycles_skipped += 1; // nothing queued: skip this cycle
            std::thread::yield_now();
            continue;
        }
        total += batch.len();
    }
    total += collector.drain().len();
    producer.join().unwrap();

    assert_eq!(total, 500);
    // The consumer never blocked; it either got a batch or skipped.
    let _ = cycles_skipped;
}

#[test]
fn skin_stream_pairs_and_reports_mismatches() {
    let address = |taxel: u16| {
        SkinHalf::Address(SkinEvent {
            stamp: Stamp::new(taxel as u32 * 10),
            taxel,
            is_sample: true,
            ..Default::default()
        })
    };

    let mut pairer = SkinSamplePairer::new();
    let stream = [
        address(1),
        SkinHalf::Value(11),
        address(2),
        address(3),
        SkinHalf::Value(33),
    ];
    let samples: Vec<_> = stream.into_iter().filter_map(|h| pairer.feed(h)).collect();

    assert_eq!(samples.len(), 2);
    assert_eq!(pairer.mismatches(), 1);
    assert_eq!(samples[0].address.taxel, 1);
    assert_eq!(samples[0].value, 11);
    assert_eq!(samples[1].address.taxel, 3);
    assert_eq!(samples[1].value, 33);
}

#[test]
fn window_contents_stay_sorted_for_unordered_batch() {
    // A consumer receiving a multi-source batch sorts wrap-aware before
    // windowing; verify the combined behavior.
    let raws = [5u32, MAX_STAMP - 10, 15, MAX_STAMP - 2];
    let mut queue: aeris_core::EventQueue = raws
        .iter()
        .map(|&raw| {
            Arc::new(Event::Address(AddressEvent::new(
                Stamp::new(raw),
                0,
                0,
                Polarity::Off,
            )))
        })
        .collect();
    queue.sort(true);

    let sorted: Vec<u32> = queue.iter().map(|e| e.stamp().raw()).collect();
    assert_eq!(sorted, [MAX_STAMP - 10, MAX_STAMP - 2, 5, 15]);

    let mut window = TimeWindow::from_duration(20).unwrap();
    for handle in queue {
        window.add_event(handle);
    }
    let kept: Vec<u32> = window.events().iter().map(|e| e.stamp().raw()).collect();
    assert_eq!(kept, [MAX_STAMP - 2, 5, 15]);
}
