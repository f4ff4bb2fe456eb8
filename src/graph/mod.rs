mod graph_backend;
pub use graph_backend::RenderGraphBackend;
pub use graph_backend::RenderGraphNativeHandle;

mod graph_barrier;
pub use graph_barrier::RenderGraphAccessType;
pub use graph_barrier::RenderGraphBarrierOp;
pub use graph_barrier::RenderGraphBarrierPlan;
pub use graph_barrier::RenderGraphBarrierType;
pub use graph_barrier::RenderGraphPipelineDomain;
pub use graph_barrier::RenderGraphResourceKind;

mod graph_buffer;
pub use graph_buffer::BufferProducerTable;
pub use graph_buffer::PhysicalBufferId;
pub use graph_buffer::RenderGraphBufferDef;
pub use graph_buffer::RenderGraphBufferId;
pub use graph_buffer::RenderGraphBufferTable;
pub use graph_buffer::RenderGraphBufferUsageFlags;
pub use graph_buffer::RenderGraphBufferVersionId;

mod graph_builder;
pub use graph_builder::RenderGraph;
pub use graph_builder::RenderGraphConfig;
pub use graph_builder::RenderGraphPassExecuteContext;
pub use graph_builder::RenderGraphPassSetupContext;
pub use graph_builder::RenderGraphResourceRegistry;
pub use graph_builder::UnresolvedProducerPolicy;

mod graph_dependency;
use graph_dependency::*;

mod graph_image;
pub use graph_image::ImageProducerTable;
pub use graph_image::PhysicalImageId;
pub use graph_image::RenderGraphExtents3D;
pub use graph_image::RenderGraphFormat;
pub use graph_image::RenderGraphImageCreateFlags;
pub use graph_image::RenderGraphImageDef;
pub use graph_image::RenderGraphImageId;
pub use graph_image::RenderGraphImageTable;
pub use graph_image::RenderGraphImageType;
pub use graph_image::RenderGraphImageUsageFlags;
pub use graph_image::RenderGraphImageVersionId;

mod graph_pass;
pub use graph_pass::RenderGraphPassExecuteFn;
pub use graph_pass::RenderGraphPassId;
pub use graph_pass::RenderGraphPassSetupFn;
use graph_pass::*;

mod graph_plan;
pub use graph_plan::verify_acyclic;
pub use graph_plan::PhysicalResourceTables;
pub use graph_plan::ProducerTables;
pub use graph_plan::RenderGraphDag;
pub use graph_plan::RenderGraphPlan;
pub use graph_plan::ResourceLifetimes;
pub use graph_plan::VersionedDependencies;

pub(crate) use crate::error::RenderGraphError;
pub(crate) use crate::error::RenderGraphResult;
