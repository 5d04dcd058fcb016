use derive_more::Display;
use thiserror::Error;

/// Identifies one of the caller supplied buffers.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    #[display(fmt = "association")]
    Pairs,
    #[display(fmt = "fit score")]
    FitScores,
    #[display(fmt = "scratch")]
    Scratch,
}

/// Precondition failures detected before an association writes any output.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum AssociationError {
    #[error("{buffer} buffer holds {actual} entries but {required} are required")]
    BufferTooSmall {
        buffer: Buffer,
        required: usize,
        actual: usize,
    },
    #[error("parameter `{name}` has invalid value {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub(crate) fn check_capacity(
    buffer: Buffer,
    required: usize,
    actual: usize,
) -> Result<(), AssociationError> {
    if actual < required {
        Err(AssociationError::BufferTooSmall {
            buffer,
            required,
            actual,
        })
    } else {
        Ok(())
    }
}
