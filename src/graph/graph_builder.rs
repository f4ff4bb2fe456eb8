use super::*;

/// Column-oriented storage for every resource declared in the graph. Handed
/// to the backend at allocation time together with the aliasing results.
#[derive(Default, Debug)]
pub struct RenderGraphResourceRegistry {
    pub images: RenderGraphImageTable,
    pub buffers: RenderGraphBufferTable,
}

impl RenderGraphResourceRegistry {
    pub fn clear(&mut self) {
        self.images.clear();
        self.buffers.clear();
    }
}

/// Policy for a read that names a defined version whose producing pass was
/// never recorded in the producer map. This state is normally unreachable for
/// in-range handles, so the strict default treats it as a malformed graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnresolvedProducerPolicy {
    /// Fatal unless the resource is imported
    Strict,
    /// Legal, like a read of an imported resource; no edge is created
    TreatAsImported,
}

impl Default for UnresolvedProducerPolicy {
    fn default() -> Self {
        UnresolvedProducerPolicy::Strict
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderGraphConfig {
    pub unresolved_producer_policy: UnresolvedProducerPolicy,
}

/// Passed to pass setup callables during compile. Declares resources and the
/// pass's accesses to them. Setup only records intent - ordering, validation
/// and allocation are all derived later in the compile.
pub struct RenderGraphPassSetupContext<'a> {
    pub(super) registry: &'a mut RenderGraphResourceRegistry,
    pub(super) image_read_deps: &'a mut ImageDependencyList,
    pub(super) image_write_deps: &'a mut ImageDependencyList,
    pub(super) buffer_read_deps: &'a mut BufferDependencyList,
    pub(super) buffer_write_deps: &'a mut BufferDependencyList,
    pub(super) outputs: &'a mut OutputTable,
    pub(super) current_pass: RenderGraphPassId,
}

impl<'a> RenderGraphPassSetupContext<'a> {
    pub fn current_pass(&self) -> RenderGraphPassId {
        self.current_pass
    }

    pub fn create_image(
        &mut self,
        def: RenderGraphImageDef,
    ) -> RenderGraphImageId {
        let image = self.registry.images.add(def);
        log::trace!(
            "    Create image {:?} {:?}",
            image,
            self.registry.images.name(image)
        );
        image
    }

    pub fn create_buffer(
        &mut self,
        def: RenderGraphBufferDef,
    ) -> RenderGraphBufferId {
        let buffer = self.registry.buffers.add(def);
        log::trace!(
            "    Create buffer {:?} {:?}",
            buffer,
            self.registry.buffers.name(buffer)
        );
        buffer
    }

    pub fn read_image(
        &mut self,
        image: RenderGraphImageId,
        usage: RenderGraphImageUsageFlags,
    ) {
        self.image_read_deps.push(self.current_pass, image, usage);
    }

    pub fn write_image(
        &mut self,
        image: RenderGraphImageId,
        usage: RenderGraphImageUsageFlags,
    ) {
        self.image_write_deps.push(self.current_pass, image, usage);
    }

    pub fn read_buffer(
        &mut self,
        buffer: RenderGraphBufferId,
        usage: RenderGraphBufferUsageFlags,
    ) {
        self.buffer_read_deps.push(self.current_pass, buffer, usage);
    }

    pub fn write_buffer(
        &mut self,
        buffer: RenderGraphBufferId,
        usage: RenderGraphBufferUsageFlags,
    ) {
        self.buffer_write_deps.push(self.current_pass, buffer, usage);
    }

    /// Marks an image as a required product of the frame. Culling keeps only
    /// passes that reach a declared output through read-chains.
    pub fn declare_image_output(
        &mut self,
        image: RenderGraphImageId,
    ) {
        debug_assert!(self.registry.images.contains(image));
        self.outputs.image_outputs.push(image);
    }

    pub fn declare_buffer_output(
        &mut self,
        buffer: RenderGraphBufferId,
    ) {
        debug_assert!(self.registry.buffers.contains(buffer));
        self.outputs.buffer_outputs.push(buffer);
    }
}

/// Passed to pass execute callables
pub struct RenderGraphPassExecuteContext<'a> {
    pub backend: &'a mut dyn RenderGraphBackend,
}

/// The render graph system. Passes are registered up front; `compile()` runs
/// their setup callables to collect dependencies and derives the full
/// execution plan; `execute()` walks the scheduled passes, applying barriers
/// through the backend before each pass's execute callable.
#[derive(Default)]
pub struct RenderGraph {
    pub config: RenderGraphConfig,

    pub registry: RenderGraphResourceRegistry,
    pub(super) passes: RenderGraphPassTopology,

    pub(super) image_read_deps: ImageDependencyList,
    pub(super) image_write_deps: ImageDependencyList,
    pub(super) buffer_read_deps: BufferDependencyList,
    pub(super) buffer_write_deps: BufferDependencyList,
    pub(super) outputs: OutputTable,

    pub(super) backend: Option<Box<dyn RenderGraphBackend>>,

    pub(super) plan: Option<RenderGraphPlan>,
}

impl RenderGraph {
    pub fn add_pass<SetupFn, ExecuteFn>(
        &mut self,
        setup_fn: SetupFn,
        execute_fn: ExecuteFn,
    ) -> RenderGraphPassId
    where
        SetupFn: FnMut(&mut RenderGraphPassSetupContext) + 'static,
        ExecuteFn: FnMut(&mut RenderGraphPassExecuteContext) + 'static,
    {
        self.passes
            .add_pass(Box::new(setup_fn), Box::new(execute_fn))
    }

    pub fn pass_count(&self) -> usize {
        self.passes.pass_count()
    }

    pub fn set_backend(
        &mut self,
        backend: Box<dyn RenderGraphBackend>,
    ) {
        self.backend = Some(backend);
    }

    pub fn backend_mut(&mut self) -> Option<&mut (dyn RenderGraphBackend + 'static)> {
        self.backend.as_deref_mut()
    }

    /// The plan produced by the last successful `compile()`
    pub fn plan(&self) -> Option<&RenderGraphPlan> {
        self.plan.as_ref()
    }

    /// Runs every pass's setup callable to collect resource accesses, then
    /// derives the execution plan: versioned dependencies, producer lookup,
    /// culling, validation, DAG + topological schedule, resource lifetimes,
    /// physical aliasing and the per-pass barrier plan. On failure no plan is
    /// retained.
    #[profiling::function]
    pub fn compile(&mut self) -> RenderGraphResult<()> {
        self.plan = None;

        let pass_count = self.passes.pass_count();

        // Dependencies and outputs are re-recorded from scratch each compile
        self.image_read_deps.reset(pass_count);
        self.image_write_deps.reset(pass_count);
        self.buffer_read_deps.reset(pass_count);
        self.buffer_write_deps.reset(pass_count);
        self.outputs.reset();

        log::trace!("-- Run pass setup callables --");
        {
            let RenderGraph {
                registry,
                passes,
                image_read_deps,
                image_write_deps,
                buffer_read_deps,
                buffer_write_deps,
                outputs,
                ..
            } = self;

            for pass_index in 0..pass_count {
                let current_pass = passes.passes[pass_index];

                image_read_deps.begin_pass(current_pass);
                image_write_deps.begin_pass(current_pass);
                buffer_read_deps.begin_pass(current_pass);
                buffer_write_deps.begin_pass(current_pass);

                log::trace!("  Set up pass {:?}", current_pass);
                let mut setup_context = RenderGraphPassSetupContext {
                    registry: &mut *registry,
                    image_read_deps: &mut *image_read_deps,
                    image_write_deps: &mut *image_write_deps,
                    buffer_read_deps: &mut *buffer_read_deps,
                    buffer_write_deps: &mut *buffer_write_deps,
                    outputs: &mut *outputs,
                    current_pass,
                };

                (passes.setup_fns[pass_index])(&mut setup_context);
            }
        }

        let plan = RenderGraphPlan::new(
            &self.registry,
            &self.passes,
            &self.image_read_deps,
            &self.image_write_deps,
            &self.buffer_read_deps,
            &self.buffer_write_deps,
            &self.outputs,
            &self.config,
        )?;

        if let Some(backend) = &mut self.backend {
            backend.on_compile_resource_allocation(&self.registry, &plan.physical_resources);
        }

        self.plan = Some(plan);
        Ok(())
    }

    /// Walks the scheduled passes in order. For each pass the backend first
    /// sees the pass's barrier range, then the pass's execute callable runs.
    /// Does nothing if no backend is set or the graph has not been compiled.
    pub fn execute(&mut self) {
        let RenderGraph {
            passes,
            backend,
            plan,
            ..
        } = self;

        let backend: &mut dyn RenderGraphBackend = match backend {
            Some(backend) => &mut **backend,
            None => return,
        };

        let plan = match plan {
            Some(plan) => plan,
            None => return,
        };

        for &pass in &plan.sorted_passes {
            backend.apply_barriers(pass, &plan.barrier_plan);

            let mut execute_context = RenderGraphPassExecuteContext {
                backend: &mut *backend,
            };
            (passes.execute_fns[pass.index()])(&mut execute_context);
        }
    }

    /// Empties the resource registry and drops any compiled plan. Pass
    /// registrations are kept; the next compile re-runs their setup callables
    /// against the empty registry.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.plan = None;
    }
}
