use crate::graph::{RenderGraphBufferId, RenderGraphImageId, RenderGraphPassId};

pub type RenderGraphResult<T> = Result<T, RenderGraphError>;

/// All the ways a render graph compile can fail. Compile errors are fatal:
/// no partial plan is produced and the graph must be rebuilt before the next
/// compile attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderGraphError {
    /// No image or buffer output was declared, so every pass would be culled
    NoOutputsDeclared,
    /// A pass read an image handle that was never created
    ImageReadOutOfRange(RenderGraphPassId, RenderGraphImageId),
    /// A pass read a buffer handle that was never created
    BufferReadOutOfRange(RenderGraphPassId, RenderGraphBufferId),
    /// A pass wrote an image handle that was never created
    ImageWriteOutOfRange(RenderGraphPassId, RenderGraphImageId),
    /// A pass wrote a buffer handle that was never created
    BufferWriteOutOfRange(RenderGraphPassId, RenderGraphBufferId),
    /// A non-imported image was read before any pass wrote it
    ImageReadBeforeWrite(RenderGraphPassId, RenderGraphImageId),
    /// A non-imported buffer was read before any pass wrote it
    BufferReadBeforeWrite(RenderGraphPassId, RenderGraphBufferId),
    /// An image read named a defined version whose producer was never
    /// recorded (see `UnresolvedProducerPolicy`)
    UnresolvedImageProducer(RenderGraphPassId, RenderGraphImageId),
    /// A buffer read named a defined version whose producer was never
    /// recorded (see `UnresolvedProducerPolicy`)
    UnresolvedBufferProducer(RenderGraphPassId, RenderGraphBufferId),
    /// The live passes form a cycle and cannot be scheduled
    CycleDetected,
}

impl std::error::Error for RenderGraphError {}

impl core::fmt::Display for RenderGraphError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            RenderGraphError::NoOutputsDeclared => {
                write!(fmt, "no image or buffer outputs declared")
            }
            RenderGraphError::ImageReadOutOfRange(pass, image) => {
                write!(fmt, "pass {:?} reads out-of-range image {:?}", pass, image)
            }
            RenderGraphError::BufferReadOutOfRange(pass, buffer) => {
                write!(fmt, "pass {:?} reads out-of-range buffer {:?}", pass, buffer)
            }
            RenderGraphError::ImageWriteOutOfRange(pass, image) => {
                write!(fmt, "pass {:?} writes out-of-range image {:?}", pass, image)
            }
            RenderGraphError::BufferWriteOutOfRange(pass, buffer) => {
                write!(
                    fmt,
                    "pass {:?} writes out-of-range buffer {:?}",
                    pass, buffer
                )
            }
            RenderGraphError::ImageReadBeforeWrite(pass, image) => {
                write!(
                    fmt,
                    "pass {:?} reads image {:?} before any pass wrote it",
                    pass, image
                )
            }
            RenderGraphError::BufferReadBeforeWrite(pass, buffer) => {
                write!(
                    fmt,
                    "pass {:?} reads buffer {:?} before any pass wrote it",
                    pass, buffer
                )
            }
            RenderGraphError::UnresolvedImageProducer(pass, image) => {
                write!(
                    fmt,
                    "pass {:?} reads image {:?} whose producing pass was never recorded",
                    pass, image
                )
            }
            RenderGraphError::UnresolvedBufferProducer(pass, buffer) => {
                write!(
                    fmt,
                    "pass {:?} reads buffer {:?} whose producing pass was never recorded",
                    pass, buffer
                )
            }
            RenderGraphError::CycleDetected => {
                write!(fmt, "render graph contains a cycle between live passes")
            }
        }
    }
}
