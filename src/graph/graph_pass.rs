use super::*;

/// An ID for a registered pass. Dense; assigned in registration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderGraphPassId(pub(super) u32);

impl RenderGraphPassId {
    /// Sentinel meaning "no pass" (no producer recorded, resource unused)
    pub(super) const INVALID: RenderGraphPassId = RenderGraphPassId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self != RenderGraphPassId::INVALID
    }
}

/// Invoked during compile to declare the pass's resource accesses. May be
/// invoked again on every compile; it must re-declare from scratch each time.
pub type RenderGraphPassSetupFn = Box<dyn FnMut(&mut RenderGraphPassSetupContext)>;

/// Invoked during execute, after the pass's barriers have been applied
pub type RenderGraphPassExecuteFn = Box<dyn FnMut(&mut RenderGraphPassExecuteContext)>;

/// All registered passes and their callables, indexed by `RenderGraphPassId`
#[derive(Default)]
pub struct RenderGraphPassTopology {
    pub(super) passes: Vec<RenderGraphPassId>,
    pub(super) setup_fns: Vec<RenderGraphPassSetupFn>,
    pub(super) execute_fns: Vec<RenderGraphPassExecuteFn>,
}

impl RenderGraphPassTopology {
    pub(super) fn add_pass(
        &mut self,
        setup_fn: RenderGraphPassSetupFn,
        execute_fn: RenderGraphPassExecuteFn,
    ) -> RenderGraphPassId {
        let id = RenderGraphPassId(self.passes.len() as u32);
        self.passes.push(id);
        self.setup_fns.push(setup_fn);
        self.execute_fns.push(execute_fn);
        id
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }
}

impl std::fmt::Debug for RenderGraphPassTopology {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("RenderGraphPassTopology")
            .field("passes", &self.passes)
            .finish()
    }
}
