use super::RenderGraphPassId;

/// An ID for a buffer declared within the graph. Dense; assigned in creation
/// order, independent of the image handle space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderGraphBufferId(pub(super) u32);

impl RenderGraphBufferId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An ID for a buffer allocation slot (possibly shared by multiple logical
/// buffers whose lifetimes don't overlap)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhysicalBufferId(pub(super) u32);

impl PhysicalBufferId {
    pub(super) const INVALID: PhysicalBufferId = PhysicalBufferId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self != PhysicalBufferId::INVALID
    }
}

/// Unique ID for a particular version of a buffer, packed as
/// `(version << 32) | buffer`. Semantic identifier only - unpack before
/// indexing any table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderGraphBufferVersionId(pub(super) u64);

impl RenderGraphBufferVersionId {
    pub(super) const INVALID: RenderGraphBufferVersionId = RenderGraphBufferVersionId(u64::MAX);

    pub(super) fn new(
        buffer: RenderGraphBufferId,
        version: u32,
    ) -> Self {
        RenderGraphBufferVersionId(((version as u64) << 32) | buffer.0 as u64)
    }

    pub fn buffer(self) -> RenderGraphBufferId {
        RenderGraphBufferId(self.0 as u32)
    }

    pub fn version(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn is_invalid(self) -> bool {
        self == RenderGraphBufferVersionId::INVALID
    }
}

bitflags::bitflags! {
    #[derive(Default)]
    pub struct RenderGraphBufferUsageFlags: u32 {
        const TRANSFER_SRC = 1<<0;
        const TRANSFER_DST = 1<<1;
        const UNIFORM_BUFFER = 1<<2;
        const STORAGE_BUFFER = 1<<3;
        const INDEX_BUFFER = 1<<4;
        const VERTEX_BUFFER = 1<<5;
        const INDIRECT_BUFFER = 1<<6;
    }
}

/// Everything needed to declare a buffer in the graph
#[derive(Clone, Debug, Default)]
pub struct RenderGraphBufferDef {
    pub name: String,
    pub size: u64,
    pub usage_flags: RenderGraphBufferUsageFlags,
    pub imported: bool,
}

/// Column-oriented storage for all buffer declarations, indexed by
/// `RenderGraphBufferId`
#[derive(Default, Debug)]
pub struct RenderGraphBufferTable {
    pub(super) names: Vec<String>,
    pub(super) sizes: Vec<u64>,
    pub(super) usage_flags: Vec<RenderGraphBufferUsageFlags>,
    pub(super) is_imported: Vec<bool>,
    pub(super) is_transient: Vec<bool>,
}

impl RenderGraphBufferTable {
    pub(super) fn add(
        &mut self,
        def: RenderGraphBufferDef,
    ) -> RenderGraphBufferId {
        let id = RenderGraphBufferId(self.names.len() as u32);
        self.names.push(def.name);
        self.sizes.push(def.size);
        self.usage_flags.push(def.usage_flags);
        self.is_imported.push(def.imported);
        self.is_transient.push(!def.imported);
        id
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub(super) fn contains(
        &self,
        buffer: RenderGraphBufferId,
    ) -> bool {
        buffer.index() < self.names.len()
    }

    pub fn name(
        &self,
        buffer: RenderGraphBufferId,
    ) -> &str {
        &self.names[buffer.index()]
    }

    pub fn imported(
        &self,
        buffer: RenderGraphBufferId,
    ) -> bool {
        self.is_imported[buffer.index()]
    }

    pub fn transient(
        &self,
        buffer: RenderGraphBufferId,
    ) -> bool {
        self.is_transient[buffer.index()]
    }

    pub(super) fn is_compatible(
        &self,
        a: RenderGraphBufferId,
        b: RenderGraphBufferId,
    ) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }

        self.sizes[a.index()] == self.sizes[b.index()]
            && self.usage_flags[a.index()] == self.usage_flags[b.index()]
    }

    pub(super) fn clear(&mut self) {
        self.names.clear();
        self.sizes.clear();
        self.usage_flags.clear();
        self.is_imported.clear();
        self.is_transient.clear();
    }
}

/// Version -> producer lookup for buffers; same flat layout as the image
/// producer table
#[derive(Default, Debug)]
pub struct BufferProducerTable {
    pub(super) version_offsets: Vec<u32>,
    pub(super) version_producers: Vec<RenderGraphPassId>,
    pub(super) latest: Vec<RenderGraphBufferVersionId>,
}

impl BufferProducerTable {
    pub fn producer(
        &self,
        version_id: RenderGraphBufferVersionId,
    ) -> RenderGraphPassId {
        if version_id.is_invalid() {
            return RenderGraphPassId::INVALID;
        }

        let buffer = version_id.buffer().index();
        if buffer + 1 >= self.version_offsets.len() {
            return RenderGraphPassId::INVALID;
        }

        let base = self.version_offsets[buffer];
        let end = self.version_offsets[buffer + 1];
        let idx = base + version_id.version();
        if idx >= end {
            return RenderGraphPassId::INVALID;
        }

        self.version_producers[idx as usize]
    }

    pub fn latest_version(
        &self,
        buffer: RenderGraphBufferId,
    ) -> RenderGraphBufferVersionId {
        if buffer.index() < self.latest.len() {
            self.latest[buffer.index()]
        } else {
            RenderGraphBufferVersionId::INVALID
        }
    }

    pub fn version_count(
        &self,
        buffer: RenderGraphBufferId,
    ) -> u32 {
        if buffer.index() + 1 >= self.version_offsets.len() {
            return 0;
        }
        self.version_offsets[buffer.index() + 1] - self.version_offsets[buffer.index()]
    }
}
