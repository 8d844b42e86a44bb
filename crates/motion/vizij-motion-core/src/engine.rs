//! Engine: clip ownership and the public update API.
//!
//! Methods:
//! - new, load_clip, unload_clip, set_config, update (overrides → space),
//!   lengthen, freeze, analyze

use crate::analyzer::KeyframeAnalyzer;
use crate::config::EngineConfig;
use crate::curves::CurveRegistry;
use crate::data::{AnimationClip, ChannelKind};
use crate::error::TransformError;
use crate::ids::{ClipId, IdAllocator};
use crate::overrides::{apply_overrides, OverrideReport, UpdateContext, UpdateFlags};
use crate::samples;
use crate::snapshot::OriginalStore;
use crate::space::{self, ValleyInterval};

/// Minimal clip library storage.
#[derive(Default, Debug)]
struct ClipLib {
    items: Vec<(ClipId, AnimationClip)>,
}

impl ClipLib {
    fn insert(&mut self, id: ClipId, clip: AnimationClip) {
        self.items.push((id, clip));
    }
    fn get(&self, id: ClipId) -> Option<&AnimationClip> {
        self.items
            .iter()
            .find_map(|(c, clip)| if *c == id { Some(clip) } else { None })
    }
    fn get_mut(&mut self, id: ClipId) -> Option<&mut AnimationClip> {
        self.items
            .iter_mut()
            .find_map(|(c, clip)| if *c == id { Some(clip) } else { None })
    }
    fn remove(&mut self, id: ClipId) -> Option<AnimationClip> {
        let idx = self.items.iter().position(|(c, _)| *c == id)?;
        Some(self.items.remove(idx).1)
    }
}

/// Summary of one `update` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateReport {
    pub overrides: OverrideReport,
    /// Intervals used by the valley-delay pass (empty when it did not run).
    pub intervals: Vec<ValleyInterval>,
}

/// Clip loader and owner of the original snapshots.
#[derive(Debug)]
pub struct MotionEngine {
    cfg: EngineConfig,
    ids: IdAllocator,
    clips: ClipLib,
    store: OriginalStore,
    curves: CurveRegistry,
    last_report: UpdateReport,
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MotionEngine {
    /// Create a new engine with the given config.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            clips: ClipLib::default(),
            store: OriginalStore::new(),
            curves: CurveRegistry::new(),
            last_report: UpdateReport::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn set_config(&mut self, cfg: EngineConfig) {
        self.cfg = cfg;
    }

    pub fn curves_mut(&mut self) -> &mut CurveRegistry {
        &mut self.curves
    }

    pub fn store(&self) -> &OriginalStore {
        &self.store
    }

    /// Load a clip, capturing its original snapshot. Returns a ClipId.
    pub fn load_clip(&mut self, clip: AnimationClip) -> Result<ClipId, TransformError> {
        clip.validate_basic()?;
        let id = self.ids.alloc_clip();
        self.store.capture(&clip);
        log::debug!("engine: loaded '{}' as {:?}", clip.name, id);
        self.clips.insert(id, clip);
        Ok(id)
    }

    /// Drop a clip and its snapshot.
    pub fn unload_clip(&mut self, id: ClipId) -> Option<AnimationClip> {
        let clip = self.clips.remove(id)?;
        self.store.remove(&clip.name);
        Some(clip)
    }

    pub fn clip(&self, id: ClipId) -> Option<&AnimationClip> {
        self.clips.get(id)
    }

    pub fn last_report(&self) -> &UpdateReport {
        &self.last_report
    }

    /// Re-run the pipeline for one clip after a parameter change.
    ///
    /// The valley-delay pass only runs when `flags.timing` is set, because only
    /// then are the times freshly reset from the snapshot.
    pub fn update(
        &mut self,
        id: ClipId,
        flags: UpdateFlags,
        ctx: UpdateContext,
    ) -> Result<&AnimationClip, TransformError> {
        let clip = self
            .clips
            .get_mut(id)
            .ok_or(TransformError::ClipNotFound { id: id.0 })?;

        let mut report = UpdateReport::default();
        match self.store.get(&clip.name) {
            Some(snapshot) => {
                report.overrides =
                    apply_overrides(clip, snapshot, &self.cfg, flags, ctx, &self.curves);
            }
            None => {
                log::warn!("engine: no snapshot for '{}'; overrides skipped", clip.name);
                report.overrides.skipped_missing_snapshot = clip.channels.len();
            }
        }
        if flags.timing {
            report.intervals = space::apply_space(&mut clip.channels, &self.cfg.space);
        }
        self.last_report = report;
        Ok(clip)
    }

    /// Loop the clip `repeats` extra times and re-snapshot it.
    ///
    /// Each copy is offset by one period: the clip duration plus the first
    /// channel's leading frame step, so copies never share a time stamp.
    pub fn lengthen(
        &mut self,
        id: ClipId,
        repeats: usize,
    ) -> Result<&AnimationClip, TransformError> {
        let clip = self
            .clips
            .get_mut(id)
            .ok_or(TransformError::ClipNotFound { id: id.0 })?;
        if repeats == 0 {
            return Ok(clip);
        }
        // Rebuild from the originals so earlier overrides are not baked in.
        if let Some(snapshot) = self.store.get(&clip.name) {
            for (channel, snap) in clip.channels.iter_mut().zip(&snapshot.channels) {
                channel.times.clone_from(&snap.times);
                channel.values.clone_from(&snap.values);
            }
        }
        let step = clip
            .channels
            .first()
            .and_then(|c| match c.times.as_slice() {
                [a, b, ..] => Some(b - a),
                _ => None,
            })
            .unwrap_or(0.0);
        let period = clip.duration() + step;
        for channel in clip.channels.iter_mut() {
            channel.times = samples::repeat_times(&channel.times, repeats, period);
            channel.values = samples::repeat_frames(&channel.values, repeats);
        }
        self.store.capture(clip);
        log::debug!("engine: lengthened '{}' x{}", clip.name, repeats + 1);
        Ok(clip)
    }

    /// Hold the rotation at `frame` across the whole channel.
    pub fn freeze(
        &mut self,
        id: ClipId,
        channel_index: usize,
        frame: usize,
    ) -> Result<&AnimationClip, TransformError> {
        let clip = self
            .clips
            .get_mut(id)
            .ok_or(TransformError::ClipNotFound { id: id.0 })?;
        let len = clip.channels.len();
        let channel = clip
            .channels
            .get_mut(channel_index)
            .ok_or(TransformError::ChannelOutOfRange {
                index: channel_index,
                len,
            })?;
        freeze_channel(channel, frame)?;
        Ok(clip)
    }

    /// Build a keyframe index over the clip's current samples.
    pub fn analyze(&self, id: ClipId) -> Result<KeyframeAnalyzer, TransformError> {
        let clip = self
            .clips
            .get(id)
            .ok_or(TransformError::ClipNotFound { id: id.0 })?;
        Ok(KeyframeAnalyzer::from_clip(clip))
    }
}

/// Overwrite every sample of a quaternion channel with the one at `frame`.
///
/// Fails on non-rotation channels and on buffers that are not four components
/// per time; these are contract violations, not recoverable states.
pub fn freeze_channel(
    channel: &mut crate::data::Channel,
    frame: usize,
) -> Result<(), TransformError> {
    if channel.kind != ChannelKind::Quaternion {
        return Err(TransformError::KindMismatch {
            channel: channel.name.clone(),
            expected: ChannelKind::Quaternion,
            actual: channel.kind,
        });
    }
    channel.check_shape()?;
    let held = channel.quat(frame).ok_or(TransformError::FrameOutOfRange {
        channel: channel.name.clone(),
        frame,
        len: channel.len(),
    })?;
    for chunk in channel.values.chunks_exact_mut(4) {
        chunk.copy_from_slice(&held);
    }
    Ok(())
}
