use vizij_motion_core::{
    config::SpaceConfig,
    data::{Channel, ChannelKind},
    parse_clip_json,
    space::{
        aggregate_motion, apply_space, apply_valley_delay, capped_normalize, detect_valleys,
        pad_valleys, ValleyInterval,
    },
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn is_monotonic(times: &[f32]) -> bool {
    times.windows(2).all(|w| w[0] <= w[1])
}

fn linear_channel(frames: usize) -> Channel {
    let times = (0..frames).map(|i| i as f32 * 0.1).collect();
    let values = (0..frames).flat_map(|_| [0.0, 0.0, 0.0, 1.0]).collect();
    Channel::new("Spine.quaternion", ChannelKind::Quaternion, times, values).unwrap()
}

/// it should leave every channel untouched when delay is zero
#[test]
fn zero_delay_is_noop() {
    let json = vizij_motion_fixtures::clips::json("pause").expect("load pause fixture");
    let clip = parse_clip_json(&json).expect("parse pause");
    let mut channels = clip.channels.clone();
    let intervals = apply_space(&mut channels, &SpaceConfig::default());
    assert!(intervals.is_empty());
    assert_eq!(channels, clip.channels);
}

/// it should find no valleys in a perfectly flat series
#[test]
fn flat_series_has_no_valleys() {
    assert!(detect_valleys(&[0.5; 20], 0.9, 5).is_empty());
    assert!(detect_valleys(&[], 0.9, 5).is_empty());
}

/// it should split around a single spike into two valleys
#[test]
fn spike_splits_two_valleys() {
    let mut series = vec![0.0; 10];
    series.push(1.0);
    series.extend(vec![0.0; 10]);
    assert_eq!(
        detect_valleys(&series, 0.9, 5),
        vec![ValleyInterval::new(0, 9), ValleyInterval::new(11, 20)]
    );
    // Runs must be strictly longer than the minimum window.
    assert!(detect_valleys(&series, 0.9, 10).is_empty());
}

/// it should space fillers by the decimal threshold without rounding short
#[test]
fn filler_stride_follows_decimal_threshold() {
    let starts = |threshold: f64| -> Vec<usize> {
        let mut channels = vec![linear_channel(200)];
        let cfg = SpaceConfig {
            delay: 0.1,
            threshold,
            ..SpaceConfig::default()
        };
        apply_space(&mut channels, &cfg)
            .iter()
            .map(|v| v.start)
            .collect()
    };
    let mut channels = vec![linear_channel(200)];
    let cfg = SpaceConfig {
        delay: 0.1,
        threshold: 0.1,
        ..SpaceConfig::default()
    };
    assert_eq!(
        apply_space(&mut channels, &cfg),
        vec![
            ValleyInterval::new(0, 3),
            ValleyInterval::new(90, 93),
            ValleyInterval::new(180, 183),
        ]
    );
    assert_eq!(starts(0.2), vec![0, 80, 160]);
    assert_eq!(starts(0.6), vec![0, 40, 80, 120, 160]);
    assert_eq!(starts(0.9).len(), 20);
}

/// it should cover uncovered frames with fixed-size fillers
#[test]
fn padding_fills_gaps() {
    // stride = floor(100 * (1 - 0.96)) = 4
    assert_eq!(
        pad_valleys(&[], 12, 0.96),
        vec![
            ValleyInterval::new(0, 3),
            ValleyInterval::new(4, 7),
            ValleyInterval::new(8, 11),
        ]
    );
    assert_eq!(
        pad_valleys(
            &[ValleyInterval::new(10, 12), ValleyInterval::new(0, 2)],
            13,
            0.96
        ),
        vec![
            ValleyInterval::new(0, 2),
            ValleyInterval::new(3, 6),
            ValleyInterval::new(10, 12),
        ]
    );
}

/// it should merge overlapping intervals instead of nesting them
#[test]
fn padding_merges_overlaps() {
    // threshold 1.0 gives a zero stride: no fillers, only sort + merge.
    assert_eq!(
        pad_valleys(
            &[ValleyInterval::new(5, 9), ValleyInterval::new(0, 6)],
            10,
            1.0
        ),
        vec![ValleyInterval::new(0, 9)]
    );
}

/// it should add exactly `delay` per completed interval, spread over its frames
#[test]
fn delay_spreads_inside_valley() {
    let mut channel = linear_channel(10);
    apply_valley_delay(&mut channel, &[ValleyInterval::new(2, 5)], 1.0);
    let shifts: Vec<f32> = channel
        .times
        .iter()
        .enumerate()
        .map(|(i, t)| t - i as f32 * 0.1)
        .collect();
    let expected = [0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0, 1.0, 1.0];
    for (s, e) in shifts.iter().zip(expected) {
        approx(*s, e, 1e-6);
    }
    assert!(is_monotonic(&channel.times));
}

#[test]
fn delay_accumulates_across_valleys() {
    let mut channel = linear_channel(12);
    let intervals = [ValleyInterval::new(0, 1), ValleyInterval::new(6, 10)];
    apply_valley_delay(&mut channel, &intervals, 0.5);
    approx(channel.times[5] - 0.5, 0.5, 1e-6);
    approx(channel.times[11] - 1.1, 1.0, 1e-6);
    assert!(is_monotonic(&channel.times));
}

/// it should average the mean absolute component over channels per frame
#[test]
fn aggregate_and_normalize() {
    let a = linear_channel(3);
    let mut b = linear_channel(3);
    b.values[4..8].copy_from_slice(&[0.5, 0.5, 0.5, 0.5]);
    let averages = aggregate_motion(&[&a, &b]);
    assert_eq!(averages, vec![0.25, 0.375, 0.25]);

    let normalized = capped_normalize(&[0.01, 0.03, 0.2], 0.05);
    assert_eq!(normalized, vec![0.0, 1.0, 1.0]);
}

/// it should retime rotation channels only and keep them monotonic
#[test]
fn pause_clip_retimes_rotations() {
    let json = vizij_motion_fixtures::clips::json("pause").expect("load pause fixture");
    let clip = parse_clip_json(&json).expect("parse pause");
    let mut channels = clip.channels.clone();
    let position = Channel::new(
        "Hips.position",
        ChannelKind::Vector,
        channels[0].times.clone(),
        vec![0.0; channels[0].times.len() * 3],
    )
    .unwrap();
    channels.push(position.clone());

    let cfg = SpaceConfig {
        delay: 0.2,
        ..SpaceConfig::default()
    };
    let intervals = apply_space(&mut channels, &cfg);
    assert!(!intervals.is_empty());
    assert!(intervals.windows(2).all(|w| w[0].end < w[1].start));

    for (channel, orig) in channels.iter().zip(&clip.channels) {
        assert!(is_monotonic(&channel.times), "{}", channel.name);
        let last = channel.times.len() - 1;
        approx(
            channel.times[last] - orig.times[last],
            0.2 * intervals.len() as f32,
            1e-4,
        );
    }
    assert_eq!(channels.last(), Some(&position));
}

/// it should smooth the motion signal first when a window is configured
#[test]
fn window_size_smooths_before_detection() {
    // Low-magnitude samples so the series stays under the motion cap.
    let frames = 40;
    let times: Vec<f32> = (0..frames).map(|i| i as f32 / 30.0).collect();
    let values: Vec<f32> = (0..frames)
        .flat_map(|i| [if i % 2 == 0 { 0.0 } else { 0.16 }, 0.0, 0.0, 0.0])
        .collect();
    let channel = Channel::new("Spine.quaternion", ChannelKind::Quaternion, times, values).unwrap();

    let raw_cfg = SpaceConfig {
        delay: 0.1,
        threshold: 1.0,
        ..SpaceConfig::default()
    };
    let smooth_cfg = SpaceConfig {
        window_size: 2,
        ..raw_cfg
    };
    // Alternating frames never settle without smoothing.
    assert!(apply_space(&mut [channel.clone()], &raw_cfg).is_empty());
    assert_eq!(
        apply_space(&mut [channel], &smooth_cfg),
        vec![ValleyInterval::new(1, 39)]
    );
}
