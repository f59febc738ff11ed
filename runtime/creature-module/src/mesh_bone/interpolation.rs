//! Keyframe interpolation for sparse clip data

use super::types::Lerp;

/// Find the index of the keyframe at or before the given time
///
/// Returns None if there are no keyframes.
/// For interpolation, this returns the index of the earlier keyframe
/// in the bracketing pair (so we can interpolate between `[index]` and `[index+1]`).
/// Times before the first keyframe map to index 0.
pub fn find_timestamp_index(timestamps: &[i32], time: f32) -> Option<usize> {
    if timestamps.is_empty() {
        return None;
    }

    if timestamps.len() == 1 {
        return Some(0);
    }

    let last_index = timestamps.len() - 1;

    // If past or at the last timestamp, return last index
    if time >= timestamps[last_index] as f32 {
        return Some(last_index);
    }

    // Binary search for the largest index where timestamps[index] <= time
    let mut low = 0;
    let mut high = last_index;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if timestamps[mid] as f32 <= time {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Some(low)
}

/// Sample sparse keyframes at the given time
///
/// `timestamps` must be sorted ascending and have the same length as `values`.
/// Values are held before the first and after the last keyframe.
pub fn sample_keyframes<T: Lerp>(timestamps: &[i32], values: &[T], time: f32) -> Option<T> {
    let index = find_timestamp_index(timestamps, time)?;
    let value1 = values.get(index)?;

    if index + 1 >= timestamps.len() {
        return Some(value1.clone());
    }

    let time1 = timestamps[index] as f32;
    let time2 = timestamps[index + 1] as f32;
    let value2 = values.get(index + 1)?;

    let t = if time2 > time1 {
        (time - time1) / (time2 - time1)
    } else {
        0.0
    };

    Some(value1.lerp(value2, t.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_timestamp_index_empty() {
        let timestamps: Vec<i32> = vec![];
        assert_eq!(find_timestamp_index(&timestamps, 0.0), None);
    }

    #[test]
    fn test_find_timestamp_index_single() {
        let timestamps = vec![10];
        assert_eq!(find_timestamp_index(&timestamps, 0.0), Some(0));
        assert_eq!(find_timestamp_index(&timestamps, 10.0), Some(0));
        assert_eq!(find_timestamp_index(&timestamps, 20.0), Some(0));
    }

    #[test]
    fn test_find_timestamp_index_multiple() {
        let timestamps = vec![0, 10, 20, 30];

        // Before first
        assert_eq!(find_timestamp_index(&timestamps, -5.0), Some(0));

        // Between keyframes
        assert_eq!(find_timestamp_index(&timestamps, 5.0), Some(0));
        assert_eq!(find_timestamp_index(&timestamps, 15.0), Some(1));
        assert_eq!(find_timestamp_index(&timestamps, 25.0), Some(2));

        // At keyframes
        assert_eq!(find_timestamp_index(&timestamps, 10.0), Some(1));
        assert_eq!(find_timestamp_index(&timestamps, 20.0), Some(2));

        // After last
        assert_eq!(find_timestamp_index(&timestamps, 40.0), Some(3));
    }

    #[test]
    fn test_sample_linear() {
        let timestamps = vec![0, 10];
        let values = vec![0.0f32, 10.0];

        assert_eq!(sample_keyframes(&timestamps, &values, 0.0), Some(0.0));
        assert_eq!(sample_keyframes(&timestamps, &values, 5.0), Some(5.0));
        assert_eq!(sample_keyframes(&timestamps, &values, 10.0), Some(10.0));
    }

    #[test]
    fn test_sample_holds_outside_range() {
        let timestamps = vec![4, 8];
        let values = vec![1.0f32, 3.0];

        assert_eq!(sample_keyframes(&timestamps, &values, 0.0), Some(1.0));
        assert_eq!(sample_keyframes(&timestamps, &values, 12.0), Some(3.0));
    }

    #[test]
    fn test_sample_empty() {
        let values: Vec<f32> = vec![];
        assert_eq!(sample_keyframes(&[], &values, 1.0), None);
    }
}
