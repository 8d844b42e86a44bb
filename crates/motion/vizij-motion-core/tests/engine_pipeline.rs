use vizij_motion_core::{
    data::{AnimationClip, Channel, ChannelKind},
    freeze_channel, parse_clip_json, ClipId, EngineConfig, MotionEngine, TransformError,
    UpdateContext, UpdateFlags,
};

fn walk() -> AnimationClip {
    let json = vizij_motion_fixtures::clips::json("walk").expect("load walk fixture");
    parse_clip_json(&json).expect("parse walk")
}

fn energetic() -> EngineConfig {
    let json = vizij_motion_fixtures::configs::json("energetic").expect("energetic config");
    EngineConfig::from_json(&json).expect("parse energetic")
}

fn index_of(clip: &AnimationClip, name: &str) -> usize {
    clip.channels
        .iter()
        .position(|c| c.name == name)
        .unwrap_or_else(|| panic!("missing channel {name}"))
}

/// it should capture a snapshot on load and drop it on unload
#[test]
fn load_and_unload() {
    let mut engine = MotionEngine::default();
    let id = engine.load_clip(walk()).unwrap();
    assert_eq!(id, ClipId(0));
    assert!(engine.store().contains("Walk"));
    assert_eq!(engine.store().get("Walk").unwrap().channels.len(), 9);

    let clip = engine.unload_clip(id).expect("unload");
    assert_eq!(clip.name, "Walk");
    assert!(engine.store().is_empty());
    assert!(matches!(
        engine.update(id, UpdateFlags::all(), UpdateContext::default()),
        Err(TransformError::ClipNotFound { id: 0 })
    ));
    assert!(engine.unload_clip(id).is_none());
}

/// it should reject clips that break the shape invariants
#[test]
fn load_rejects_malformed_clip() {
    let mut clip = walk();
    clip.channels[1].values.pop();
    let mut engine = MotionEngine::default();
    assert!(matches!(
        engine.load_clip(clip),
        Err(TransformError::MalformedTrack { .. })
    ));
    assert!(engine.store().is_empty());
}

/// it should run energy, delay and space passes, then reset to the original
#[test]
fn update_then_reset_to_identity() {
    let original = walk();
    let mut engine = MotionEngine::new(energetic());
    let id = engine.load_clip(original.clone()).unwrap();

    let updated = engine
        .update(id, UpdateFlags::all(), UpdateContext::default())
        .unwrap()
        .clone();
    let report = engine.last_report().clone();
    assert!(!report.intervals.is_empty());
    assert_eq!(report.overrides.unclassified, 1);

    // Vector channels are never retimed by the space pass.
    let hips = &updated.channels[index_of(&updated, "mixamorigHips.position")];
    let hips_orig = &original.channels[index_of(&original, "mixamorigHips.position")];
    for (t, o) in hips.times.iter().zip(&hips_orig.times) {
        assert_eq!(*t, o / 0.5 / 1.5);
    }
    for channel in &updated.channels {
        assert!(
            channel.times.windows(2).all(|w| w[0] <= w[1]),
            "{} not monotonic",
            channel.name
        );
    }

    engine.set_config(EngineConfig::default());
    let reset = engine
        .update(id, UpdateFlags::all(), UpdateContext { current_time: 3.0 })
        .unwrap();
    assert_eq!(reset, &original);
    assert!(engine.last_report().intervals.is_empty());
}

/// it should skip the space pass when timing is not part of the update
#[test]
fn space_pass_needs_timing() {
    let mut cfg = EngineConfig::default();
    cfg.space.delay = 0.3;
    let mut engine = MotionEngine::new(cfg);
    let id = engine.load_clip(walk()).unwrap();

    let flags = UpdateFlags {
        rotation: true,
        ..UpdateFlags::default()
    };
    engine.update(id, flags, UpdateContext::default()).unwrap();
    assert!(engine.last_report().intervals.is_empty());

    engine
        .update(id, UpdateFlags::timing(), UpdateContext::default())
        .unwrap();
    assert!(!engine.last_report().intervals.is_empty());
}

/// it should keep the live clip when its snapshot has gone missing
#[test]
fn missing_snapshot_leaves_clip_untouched() {
    let mut engine = MotionEngine::new(energetic());
    let first = engine.load_clip(walk()).unwrap();
    let second = engine.load_clip(walk()).unwrap();
    // Both clips share the name, hence the snapshot.
    engine.unload_clip(first);

    let mut cfg = energetic();
    cfg.space.delay = 0.0;
    engine.set_config(cfg);
    let clip = engine
        .update(second, UpdateFlags::all(), UpdateContext::default())
        .unwrap();
    assert_eq!(clip, &walk());
    assert_eq!(engine.last_report().overrides.skipped_missing_snapshot, 9);
}

/// it should loop samples with a one-frame gap and re-snapshot the result
#[test]
fn lengthen_repeats_and_resnapshots() {
    let original = walk();
    let mut engine = MotionEngine::new(energetic());
    let id = engine.load_clip(original.clone()).unwrap();
    engine
        .update(id, UpdateFlags::all(), UpdateContext::default())
        .unwrap();

    let step = original.channels[0].times[1] - original.channels[0].times[0];
    let period = original.duration() + step;
    let clip = engine.lengthen(id, 1).unwrap().clone();
    for (channel, orig) in clip.channels.iter().zip(&original.channels) {
        let n = orig.len();
        assert_eq!(channel.len(), 2 * n);
        assert_eq!(channel.values.len(), 2 * orig.values.len());
        assert_eq!(&channel.times[..n], &orig.times[..]);
        assert_eq!(&channel.values[..orig.values.len()], &orig.values[..]);
        assert_eq!(&channel.values[orig.values.len()..], &orig.values[..]);
        assert!((channel.times[n] - (orig.times[0] + period)).abs() < 1e-6);
    }
    let snap = engine.store().get("Walk").unwrap();
    assert_eq!(snap.channels[0].times.len(), 62);

    // Later updates start from the lengthened originals.
    engine.set_config(EngineConfig::default());
    let reset = engine
        .update(id, UpdateFlags::all(), UpdateContext::default())
        .unwrap();
    assert_eq!(reset, &clip);

    let same = engine.lengthen(id, 0).unwrap();
    assert_eq!(same.channels[0].len(), 62);
}

/// it should hold one rotation across the channel
#[test]
fn freeze_holds_frame() {
    let mut engine = MotionEngine::default();
    let id = engine.load_clip(walk()).unwrap();
    let original = walk();
    let spine = index_of(&original, "mixamorigSpine.quaternion");
    let held = original.channels[spine].quat(5).unwrap();

    let clip = engine.freeze(id, spine, 5).unwrap();
    let channel = &clip.channels[spine];
    for i in 0..channel.len() {
        assert_eq!(channel.quat(i), Some(held));
    }
    assert_eq!(channel.times, original.channels[spine].times);
}

#[test]
fn freeze_rejects_bad_targets() {
    let mut engine = MotionEngine::default();
    let id = engine.load_clip(walk()).unwrap();

    let err = engine.freeze(id, 0, 0).unwrap_err();
    assert!(matches!(
        err,
        TransformError::KindMismatch {
            expected: ChannelKind::Quaternion,
            actual: ChannelKind::Vector,
            ..
        }
    ));
    assert!(matches!(
        engine.freeze(id, 1, 31),
        Err(TransformError::FrameOutOfRange { frame: 31, len: 31, .. })
    ));
    assert!(matches!(
        engine.freeze(id, 1, usize::MAX / 4),
        Err(TransformError::FrameOutOfRange { len: 31, .. })
    ));
    assert!(matches!(
        engine.freeze(id, 99, 0),
        Err(TransformError::ChannelOutOfRange { index: 99, len: 9 })
    ));
    assert!(matches!(
        engine.freeze(ClipId(42), 1, 0),
        Err(TransformError::ClipNotFound { id: 42 })
    ));

    // Built by hand to bypass the constructor's shape check.
    let mut broken = Channel {
        name: "Spine.quaternion".into(),
        kind: ChannelKind::Quaternion,
        times: vec![0.0, 0.1],
        values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    };
    assert!(matches!(
        freeze_channel(&mut broken, 0),
        Err(TransformError::MalformedTrack { stride: 4, .. })
    ));
}

/// it should index the current samples of a loaded clip
#[test]
fn analyze_loaded_clip() {
    let mut engine = MotionEngine::default();
    let id = engine.load_clip(walk()).unwrap();
    let analyzer = engine.analyze(id).unwrap();
    assert_eq!(analyzer.times().len(), 31);
    assert_eq!(analyzer.at_time(0.0, None).len(), 9);
    assert!(matches!(
        engine.analyze(ClipId(7)),
        Err(TransformError::ClipNotFound { id: 7 })
    ));
}
