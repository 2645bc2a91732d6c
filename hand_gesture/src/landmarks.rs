//! Keypoint indices of the 21-point hand layout.

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP:   usize = 16;
pub const PINKY_TIP:  usize = 20;

/// Number of keypoints the detector reports for one hand.
pub const COUNT: usize = 21;

/// The five fingertips, thumb first.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
