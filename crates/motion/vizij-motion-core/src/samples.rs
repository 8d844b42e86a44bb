//! Fixed-precision sample buffer helpers shared by every transform.
//!
//! Buffers are flat and sample-major: frame `i` of a stride-`n` buffer lives at
//! `values[i * n..(i + 1) * n]`.

/// Concatenate two buffers into a fresh one.
pub fn append<T: Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// Borrow frame `index` of a stride-`stride` buffer.
#[inline]
pub fn frame<T: Copy>(values: &[T], index: usize, stride: usize) -> Option<&[T]> {
    if stride == 0 {
        return None;
    }
    let start = index.checked_mul(stride)?;
    let end = start.checked_add(stride)?;
    values.get(start..end)
}

/// Copy frames `start..end` (end exclusive, clamped to the buffer) into a new buffer.
pub fn slice_frames<T: Copy>(values: &[T], start: usize, end: usize, stride: usize) -> Vec<T> {
    if stride == 0 {
        return Vec::new();
    }
    let frames = values.len() / stride;
    let end = end.min(frames);
    if start >= end {
        return Vec::new();
    }
    values[start * stride..end * stride].to_vec()
}

/// Shift every time stamp by `delta`.
#[inline]
pub fn offset_times(times: &mut [f32], delta: f32) {
    for t in times.iter_mut() {
        *t += delta;
    }
}

/// Append `repeats` copies of a timeline, each shifted by a further `period`.
pub fn repeat_times(times: &[f32], repeats: usize, period: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(times.len() * (repeats + 1));
    out.extend_from_slice(times);
    for k in 1..=repeats {
        let shift = period * k as f32;
        out.extend(times.iter().map(|t| t + shift));
    }
    out
}

/// Append `repeats` copies of a value buffer.
pub fn repeat_frames<T: Copy>(values: &[T], repeats: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len() * (repeats + 1));
    for _ in 0..=repeats {
        out.extend_from_slice(values);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_and_slice() {
        let v = [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(frame(&v, 1, 3), Some(&[3.0, 4.0, 5.0][..]));
        assert_eq!(frame(&v, 2, 3), None);
        assert_eq!(slice_frames(&v, 1, 9, 2), vec![2.0, 3.0, 4.0, 5.0]);
        assert!(slice_frames(&v, 2, 1, 2).is_empty());
        // Index whose end offset overflows.
        assert_eq!(frame(&v, usize::MAX / 4, 4), None);
        assert_eq!(append(&[1u8], &[2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn repeat_offsets_each_copy() {
        let t = repeat_times(&[0.0, 0.5], 2, 1.0);
        assert_eq!(t, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
        assert_eq!(repeat_frames(&[1u8, 2], 1), vec![1, 2, 1, 2]);
        assert_eq!(repeat_frames(&[1u8, 2], 0), vec![1, 2]);
        assert_eq!(repeat_times(&[0.0, 0.5], 0, 1.0), vec![0.0, 0.5]);
    }
}
