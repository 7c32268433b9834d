//! Per-state observation vectors.

use smallvec::SmallVec;
use std::ops::Deref;

/// A fixed-length observation attached to a state.
///
/// Uses `SmallVec<[f32; 4]>` so the common low-dimensional cases stay
/// inline. Scalars convert to single-element vectors and `()` converts
/// to the empty observation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observation(SmallVec<[f32; 4]>);

impl Observation {
    /// The empty (zero-dimensional) observation.
    pub fn empty() -> Self {
        Self(SmallVec::new())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the observation has no components.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Components as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Deref for Observation {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl From<()> for Observation {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

impl From<f32> for Observation {
    fn from(v: f32) -> Self {
        Self(smallvec::smallvec![v])
    }
}

impl From<i32> for Observation {
    fn from(v: i32) -> Self {
        Self::from(v as f32)
    }
}

impl From<i64> for Observation {
    fn from(v: i64) -> Self {
        Self::from(v as f32)
    }
}

impl From<u32> for Observation {
    fn from(v: u32) -> Self {
        Self::from(v as f32)
    }
}

impl From<usize> for Observation {
    fn from(v: usize) -> Self {
        Self::from(v as f32)
    }
}

impl From<bool> for Observation {
    fn from(v: bool) -> Self {
        Self::from(if v { 1.0 } else { 0.0 })
    }
}

impl From<Vec<f32>> for Observation {
    fn from(v: Vec<f32>) -> Self {
        Self(SmallVec::from_vec(v))
    }
}

impl From<&[f32]> for Observation {
    fn from(v: &[f32]) -> Self {
        Self(SmallVec::from_slice(v))
    }
}

impl<const N: usize> From<[f32; N]> for Observation {
    fn from(v: [f32; N]) -> Self {
        Self(v.into_iter().collect())
    }
}

impl FromIterator<f32> for Observation {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
