use super::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderGraphResourceKind {
    Image,
    Buffer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderGraphAccessType {
    Read,
    Write,
    ReadWrite,
}

/// Coarse pipeline domain. The planner always emits `Any`; backends refine or
/// ignore it when lowering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderGraphPipelineDomain {
    Any,
    Graphics,
    Compute,
    Copy,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderGraphBarrierType {
    /// Resource state/usage changed between consecutive uses of a physical
    /// slot (Vk layout transition + barrier, D3D12 state transition, ...)
    Transition,
    /// Write -> read/write hazard on a storage resource
    Uav,
    /// A physical slot changed logical occupants; the new occupant's first
    /// use must wait for the previous one's last
    Aliasing,
}

/// One API-agnostic synchronization directive, bound to the consumer pass.
///
/// `logical` and `prev_logical` are raw handle indices; interpret them as
/// `RenderGraphImageId` or `RenderGraphBufferId` according to `kind`.
/// `physical` is likewise a `PhysicalImageId`/`PhysicalBufferId` index into
/// the allocation tables handed to the backend - not an API object handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderGraphBarrierOp {
    pub barrier_type: RenderGraphBarrierType,
    pub kind: RenderGraphResourceKind,
    pub logical: u32,
    pub physical: u32,
    pub src_domain: RenderGraphPipelineDomain,
    pub dst_domain: RenderGraphPipelineDomain,
    pub src_access: RenderGraphAccessType,
    pub dst_access: RenderGraphAccessType,
    /// Image or buffer usage bits, per `kind`
    pub src_usage_bits: u32,
    pub dst_usage_bits: u32,
    /// For aliasing ops: the logical resource that previously occupied
    /// `physical`
    pub prev_logical: u32,
}

impl Default for RenderGraphBarrierOp {
    fn default() -> Self {
        RenderGraphBarrierOp {
            barrier_type: RenderGraphBarrierType::Transition,
            kind: RenderGraphResourceKind::Image,
            logical: 0,
            physical: 0,
            src_domain: RenderGraphPipelineDomain::Any,
            dst_domain: RenderGraphPipelineDomain::Any,
            src_access: RenderGraphAccessType::Read,
            dst_access: RenderGraphAccessType::Read,
            src_usage_bits: 0,
            dst_usage_bits: 0,
            prev_logical: 0,
        }
    }
}

/// The compiled barrier plan: per-pass op ranges in CSR form over parallel
/// per-field columns. For pass `p`, ops occupy
/// `[pass_begins[p], pass_begins[p] + pass_lengths[p])`. Culled passes have
/// empty ranges. This layout is the data contract consumed by backends.
#[derive(Default, Debug)]
pub struct RenderGraphBarrierPlan {
    /// len = pass_count + 1
    pub pass_begins: Vec<u32>,
    /// len = pass_count
    pub pass_lengths: Vec<u32>,

    pub barrier_types: Vec<RenderGraphBarrierType>,
    pub kinds: Vec<RenderGraphResourceKind>,
    pub logicals: Vec<u32>,
    pub physicals: Vec<u32>,
    pub src_domains: Vec<RenderGraphPipelineDomain>,
    pub dst_domains: Vec<RenderGraphPipelineDomain>,
    pub src_accesses: Vec<RenderGraphAccessType>,
    pub dst_accesses: Vec<RenderGraphAccessType>,
    pub src_usage_bits: Vec<u32>,
    pub dst_usage_bits: Vec<u32>,
    pub prev_logicals: Vec<u32>,
}

impl RenderGraphBarrierPlan {
    pub(super) fn push_op(
        &mut self,
        op: &RenderGraphBarrierOp,
    ) {
        self.barrier_types.push(op.barrier_type);
        self.kinds.push(op.kind);
        self.logicals.push(op.logical);
        self.physicals.push(op.physical);
        self.src_domains.push(op.src_domain);
        self.dst_domains.push(op.dst_domain);
        self.src_accesses.push(op.src_access);
        self.dst_accesses.push(op.dst_access);
        self.src_usage_bits.push(op.src_usage_bits);
        self.dst_usage_bits.push(op.dst_usage_bits);
        self.prev_logicals.push(op.prev_logical);
    }

    pub fn op_count(&self) -> usize {
        self.barrier_types.len()
    }

    /// Column index range holding this pass's ops
    pub fn pass_range(
        &self,
        pass: RenderGraphPassId,
    ) -> std::ops::Range<usize> {
        let begin = self.pass_begins[pass.index()] as usize;
        let length = self.pass_lengths[pass.index()] as usize;
        begin..begin + length
    }

    /// Reassembles one op from the columns
    pub fn op(
        &self,
        index: usize,
    ) -> RenderGraphBarrierOp {
        RenderGraphBarrierOp {
            barrier_type: self.barrier_types[index],
            kind: self.kinds[index],
            logical: self.logicals[index],
            physical: self.physicals[index],
            src_domain: self.src_domains[index],
            dst_domain: self.dst_domains[index],
            src_access: self.src_accesses[index],
            dst_access: self.dst_accesses[index],
            src_usage_bits: self.src_usage_bits[index],
            dst_usage_bits: self.dst_usage_bits[index],
            prev_logical: self.prev_logicals[index],
        }
    }

    pub fn pass_ops(
        &self,
        pass: RenderGraphPassId,
    ) -> impl Iterator<Item = RenderGraphBarrierOp> + '_ {
        self.pass_range(pass).map(move |i| self.op(i))
    }
}
