use super::*;

/// Opaque native object identifier (a `VkImage`, `ID3D12Resource*`, ...)
/// stashed by backends for imported resources. The graph never interprets it.
pub type RenderGraphNativeHandle = usize;

/// The boundary between the graph compiler and a concrete GPU API. The graph
/// produces an abstract plan; the backend owns native resource creation and
/// lowers barrier ops to API-specific synchronization primitives.
pub trait RenderGraphBackend {
    /// Called once at the end of a successful compile with the resource
    /// registry and the aliasing results. Backends materialize native
    /// resources for non-imported physical slots and bind previously stashed
    /// imported handles for imported ones.
    fn on_compile_resource_allocation(
        &mut self,
        _registry: &RenderGraphResourceRegistry,
        _physical_resources: &PhysicalResourceTables,
    ) {
    }

    /// Associates a logical imported image with a native image (and
    /// optionally a native view). May be called any time before compile's
    /// allocation callback.
    fn bind_imported_image(
        &mut self,
        _logical: RenderGraphImageId,
        _native_image: RenderGraphNativeHandle,
        _native_view: Option<RenderGraphNativeHandle>,
    ) {
    }

    /// Associates a logical imported buffer with a native buffer
    fn bind_imported_buffer(
        &mut self,
        _logical: RenderGraphBufferId,
        _native_buffer: RenderGraphNativeHandle,
    ) {
    }

    /// Applies all barriers that must happen before executing this pass.
    /// Invoked once per scheduled pass, in schedule order, before the pass's
    /// execute callable runs.
    fn apply_barriers(
        &mut self,
        pass: RenderGraphPassId,
        plan: &RenderGraphBarrierPlan,
    );
}
