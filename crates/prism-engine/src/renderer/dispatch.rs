/// Pixels covered by one compute work group along each axis.
///
/// Must match the tile size of `raytracer.wgsl` (16x16 invocations, 2x2
/// pixels each).
pub const THREAD_GROUP_SIZE: u32 = 32;

/// Work groups needed to cover `extent` pixels.
#[inline]
pub const fn dispatch_group_count(extent: u32) -> u32 {
    extent.div_ceil(THREAD_GROUP_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_frame_needs_63_by_32_groups() {
        assert_eq!(dispatch_group_count(2000), 63);
        assert_eq!(dispatch_group_count(1000), 32);
    }

    #[test]
    fn partial_tiles_round_up() {
        assert_eq!(dispatch_group_count(0), 0);
        assert_eq!(dispatch_group_count(1), 1);
        assert_eq!(dispatch_group_count(32), 1);
        assert_eq!(dispatch_group_count(33), 2);
    }
}
