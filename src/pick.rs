//! Encoding of sample indices into the colors of the pick layer.

/// Largest sample index representable by the rgb channels.
pub const MAX_PICKABLE_SAMPLES: usize = 1 << 24;

/// Checks whether every sample gets a distinct pick color.
pub fn pickable(sample_count: usize) -> bool {
    if sample_count > MAX_PICKABLE_SAMPLES {
        log::warn!(
            "{sample_count} samples exceed the {MAX_PICKABLE_SAMPLES} distinguishable by hovering, \
             hovering is disabled"
        );
        return false;
    }
    true
}

/// Color of the line of a sample in the pick layer.
pub fn encode(sample: usize) -> [u8; 4] {
    [
        ((sample >> 16) & 255) as u8,
        ((sample >> 8) & 255) as u8,
        (sample & 255) as u8,
        1,
    ]
}

/// Sample index of a pixel read back from the pick layer.
///
/// Pixels without any line have a zero alpha and decode to `None`.
pub fn decode(rgba: [u8; 4]) -> Option<usize> {
    let [r, g, b, a] = rgba;
    if a == 0 {
        return None;
    }

    Some(((r as usize) << 16) | ((g as usize) << 8) | b as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_base_256() {
        assert_eq!(encode(0x01_02_03), [1, 2, 3, 1]);
        assert_eq!(decode([1, 2, 3, 1]), Some(0x01_02_03));
        assert_eq!(decode(encode(70_000)), Some(70_000));
    }

    #[test]
    fn hovering_is_limited_to_24_bit_indices() {
        assert!(pickable(0));
        assert!(pickable(MAX_PICKABLE_SAMPLES));
        assert!(!pickable(MAX_PICKABLE_SAMPLES + 1));
        assert_eq!(
            decode(encode(MAX_PICKABLE_SAMPLES - 1)),
            Some(MAX_PICKABLE_SAMPLES - 1)
        );
    }

    #[test]
    fn transparent_pixels_hit_nothing() {
        assert_eq!(decode([0, 0, 0, 0]), None);
        assert_eq!(decode([0, 0, 0, 1]), Some(0));
    }
}
