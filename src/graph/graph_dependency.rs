use super::*;

/// Append-only per-pass access lists stored as one flat arena with per-pass
/// `[begin, begin+length)` ranges. One instance exists per (kind, access)
/// combination: image reads, image writes, buffer reads, buffer writes.
#[derive(Debug)]
pub struct DependencyList<Id, Usage> {
    /// Logical handles in record order
    pub(super) resources: Vec<Id>,
    /// Usage bits declared at each access site, parallel to `resources`
    pub(super) usage_bits: Vec<Usage>,
    /// Arena offset where each pass's entries start; len = pass_count
    pub(super) begins: Vec<u32>,
    /// Number of entries recorded by each pass; len = pass_count
    pub(super) lengths: Vec<u32>,
}

impl<Id, Usage> Default for DependencyList<Id, Usage> {
    fn default() -> Self {
        DependencyList {
            resources: Default::default(),
            usage_bits: Default::default(),
            begins: Default::default(),
            lengths: Default::default(),
        }
    }
}

impl<Id: Copy, Usage: Copy> DependencyList<Id, Usage> {
    /// Dependencies are re-recorded on every compile
    pub(super) fn reset(
        &mut self,
        pass_count: usize,
    ) {
        self.resources.clear();
        self.usage_bits.clear();
        self.begins.clear();
        self.begins.resize(pass_count, 0);
        self.lengths.clear();
        self.lengths.resize(pass_count, 0);
    }

    /// Captures the pass's range start. Called once, before the pass's setup
    /// callable runs.
    pub(super) fn begin_pass(
        &mut self,
        pass: RenderGraphPassId,
    ) {
        self.begins[pass.index()] = self.resources.len() as u32;
    }

    pub(super) fn push(
        &mut self,
        pass: RenderGraphPassId,
        resource: Id,
        usage: Usage,
    ) {
        self.resources.push(resource);
        self.usage_bits.push(usage);
        self.lengths[pass.index()] += 1;
    }

    /// Arena index range holding this pass's entries
    pub(super) fn range(
        &self,
        pass: RenderGraphPassId,
    ) -> std::ops::Range<usize> {
        let begin = self.begins[pass.index()] as usize;
        let length = self.lengths[pass.index()] as usize;
        begin..begin + length
    }

    pub(super) fn len(&self) -> usize {
        self.resources.len()
    }
}

pub(super) type ImageDependencyList = DependencyList<RenderGraphImageId, RenderGraphImageUsageFlags>;
pub(super) type BufferDependencyList =
    DependencyList<RenderGraphBufferId, RenderGraphBufferUsageFlags>;

/// Resources the frame must produce. This is the sole seeding information for
/// culling: passes that cannot reach one of these through read-chains are
/// dropped from the schedule.
#[derive(Default, Debug)]
pub struct OutputTable {
    pub(super) image_outputs: Vec<RenderGraphImageId>,
    pub(super) buffer_outputs: Vec<RenderGraphBufferId>,
}

impl OutputTable {
    pub(super) fn reset(&mut self) {
        self.image_outputs.clear();
        self.buffer_outputs.clear();
    }

    pub(super) fn is_empty(&self) -> bool {
        self.image_outputs.is_empty() && self.buffer_outputs.is_empty()
    }
}
