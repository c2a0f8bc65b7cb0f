//! Wire layout of the record the companion writes into shared memory.
//!
//! Six little-endian f32 action units back to back, no header. Both sides
//! agree on the layout out of band, so the offsets below are the contract.

use crate::error::{KinectError, Result};

pub const BROW_RAISER_OFFSET: usize = 0;
pub const BROW_LOWER_OFFSET: usize = 4;
pub const JAW_LOWER_OFFSET: usize = 8;
pub const LIP_STRETCHER_OFFSET: usize = 12;
pub const LIP_CORNER_DEPRESSOR_OFFSET: usize = 16;
pub const LIP_RAISER_OFFSET: usize = 20;

pub const FACE_STATE_SIZE: usize = 24;

/// Raw action-unit intensities for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaceState {
    pub brow_raiser: f32,
    pub brow_lower: f32,
    pub jaw_lower: f32,
    pub lip_stretcher: f32,
    pub lip_corner_depressor: f32,
    pub lip_raiser: f32,
}

impl FaceState {
    pub fn to_bytes(&self) -> [u8; FACE_STATE_SIZE] {
        let mut buf = [0u8; FACE_STATE_SIZE];
        put_f32(&mut buf, BROW_RAISER_OFFSET, self.brow_raiser);
        put_f32(&mut buf, BROW_LOWER_OFFSET, self.brow_lower);
        put_f32(&mut buf, JAW_LOWER_OFFSET, self.jaw_lower);
        put_f32(&mut buf, LIP_STRETCHER_OFFSET, self.lip_stretcher);
        put_f32(&mut buf, LIP_CORNER_DEPRESSOR_OFFSET, self.lip_corner_depressor);
        put_f32(&mut buf, LIP_RAISER_OFFSET, self.lip_raiser);
        buf
    }

    /// Trailing bytes past the record are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FACE_STATE_SIZE {
            return Err(KinectError::ReadFailure(format!(
                "expected {} bytes, got {}",
                FACE_STATE_SIZE,
                bytes.len()
            )));
        }

        Ok(Self {
            brow_raiser: get_f32(bytes, BROW_RAISER_OFFSET),
            brow_lower: get_f32(bytes, BROW_LOWER_OFFSET),
            jaw_lower: get_f32(bytes, JAW_LOWER_OFFSET),
            lip_stretcher: get_f32(bytes, LIP_STRETCHER_OFFSET),
            lip_corner_depressor: get_f32(bytes, LIP_CORNER_DEPRESSOR_OFFSET),
            lip_raiser: get_f32(bytes, LIP_RAISER_OFFSET),
        })
    }
}

fn put_f32(buf: &mut [u8; FACE_STATE_SIZE], offset: usize, value: f32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

// Caller has checked the length.
fn get_f32(bytes: &[u8], offset: usize) -> f32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_land_at_declared_offsets() {
        let state = FaceState {
            brow_raiser: 1.0,
            brow_lower: 2.0,
            jaw_lower: 3.0,
            lip_stretcher: 4.0,
            lip_corner_depressor: 5.0,
            lip_raiser: -6.0,
        };
        let bytes = state.to_bytes();

        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &3.0f32.to_le_bytes());
        assert_eq!(&bytes[20..24], &(-6.0f32).to_le_bytes());
        assert_eq!(FaceState::from_bytes(&bytes).unwrap(), state);
    }

    #[test]
    fn test_short_buffer_is_read_failure() {
        let err = FaceState::from_bytes(&[0u8; FACE_STATE_SIZE - 1]).unwrap_err();
        assert!(matches!(err, KinectError::ReadFailure(_)));
    }

    #[test]
    fn test_zeroed_region_decodes_to_neutral_state() {
        let state = FaceState::from_bytes(&[0u8; FACE_STATE_SIZE + 8]).unwrap();
        assert_eq!(state, FaceState::default());
    }
}
