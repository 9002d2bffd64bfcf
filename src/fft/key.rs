//! Plan keys: canonical identity of a transform for cache lookup

use super::params::{AxisVec, FftLayout, FftPrecision, Rank, StrideGroup, TransformParams};
use std::fmt;

/// Structured cache key derived from [`TransformParams`]
///
/// Fields are held in canonical order: layout pair, rank, lengths, input
/// stride group, output stride group, precision, batch. Equality and hashing
/// are structural, so distinct parameter sets can never collide, and the
/// presence or absence of each optional stride group is part of the
/// identity.
///
/// `Display` renders the key as text for logs:
///
/// ```text
/// il:ol:rank:len0:..:[i<stride0,..;dist>:][o<stride0,..;dist>:]precision:batch
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlanKey {
    input_layout: FftLayout,
    output_layout: FftLayout,
    rank: Rank,
    lengths: AxisVec,
    input_strides: Option<StrideGroup>,
    output_strides: Option<StrideGroup>,
    precision: FftPrecision,
    batch: usize,
}

impl PlanKey {
    /// Derive the key for a parameter set
    ///
    /// Pure and deterministic; per-axis data stays inline, so no heap
    /// allocation happens for rank 1-3 transforms.
    pub fn encode(params: &TransformParams) -> Self {
        Self {
            input_layout: params.input_layout(),
            output_layout: params.output_layout(),
            rank: params.rank(),
            lengths: params.lengths().iter().copied().collect(),
            input_strides: params.input_strides().cloned(),
            output_strides: params.output_strides().cloned(),
            precision: params.precision(),
            batch: params.batch(),
        }
    }

    /// Rank the key was derived for
    #[inline]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Transform lengths the key was derived for
    #[inline]
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Batch count the key was derived for
    #[inline]
    pub fn batch(&self) -> usize {
        self.batch
    }
}

impl From<&TransformParams> for PlanKey {
    fn from(params: &TransformParams) -> Self {
        Self::encode(params)
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, tag: char, group: &StrideGroup) -> fmt::Result {
    write!(f, "{}<", tag)?;
    for (i, s) in group.strides().iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", s)?;
    }
    write!(f, ";{}>:", group.distance())
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:",
            self.input_layout as u8, self.output_layout as u8, self.rank
        )?;
        for len in &self.lengths {
            write!(f, "{}:", len)?;
        }
        if let Some(group) = &self.input_strides {
            write_group(f, 'i', group)?;
        }
        if let Some(group) = &self.output_strides {
            write_group(f, 'o', group)?;
        }
        write!(f, "{}:{}", self.precision as u8, self.batch)
    }
}
