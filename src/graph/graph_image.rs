use super::RenderGraphPassId;

/// An ID for an image declared within the graph. Dense; assigned in creation
/// order. Image and buffer handles occupy independent handle spaces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderGraphImageId(pub(super) u32);

impl RenderGraphImageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An ID for an image allocation slot (possibly shared by multiple logical
/// images whose lifetimes don't overlap)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhysicalImageId(pub(super) u32);

impl PhysicalImageId {
    pub(super) const INVALID: PhysicalImageId = PhysicalImageId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self != PhysicalImageId::INVALID
    }
}

/// Unique ID for a particular version of an image. Any time an image is
/// written, a new version is produced. Packed as `(version << 32) | image`.
/// This is a semantic identifier only - unpack before indexing any table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderGraphImageVersionId(pub(super) u64);

impl RenderGraphImageVersionId {
    pub(super) const INVALID: RenderGraphImageVersionId = RenderGraphImageVersionId(u64::MAX);

    pub(super) fn new(
        image: RenderGraphImageId,
        version: u32,
    ) -> Self {
        RenderGraphImageVersionId(((version as u64) << 32) | image.0 as u64)
    }

    pub fn image(self) -> RenderGraphImageId {
        RenderGraphImageId(self.0 as u32)
    }

    pub fn version(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn is_invalid(self) -> bool {
        self == RenderGraphImageVersionId::INVALID
    }
}

bitflags::bitflags! {
    /// How an image is used at an access site (and, OR'd across all sites,
    /// what the image must be created with)
    #[derive(Default)]
    pub struct RenderGraphImageUsageFlags: u32 {
        const TRANSFER_SRC = 1<<0;
        const TRANSFER_DST = 1<<1;
        const SAMPLED = 1<<2;
        const STORAGE = 1<<3;
        const COLOR_ATTACHMENT = 1<<4;
        const DEPTH_STENCIL_ATTACHMENT = 1<<5;
    }
}

bitflags::bitflags! {
    #[derive(Default)]
    pub struct RenderGraphImageCreateFlags: u32 {
        const CUBE_COMPATIBLE = 1<<0;
        const MUTABLE_FORMAT = 1<<1;
    }
}

/// Abstract pixel format. Backends map these to their native equivalents
/// (VkFormat, DXGI_FORMAT, MTLPixelFormat).
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderGraphFormat {
    UNDEFINED,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    D32_SFLOAT,
}

impl Default for RenderGraphFormat {
    fn default() -> Self {
        RenderGraphFormat::UNDEFINED
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderGraphExtents3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Default for RenderGraphExtents3D {
    fn default() -> Self {
        RenderGraphExtents3D {
            width: 1,
            height: 1,
            depth: 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderGraphImageType {
    Dim1D,
    Dim2D,
    Dim3D,
}

impl Default for RenderGraphImageType {
    fn default() -> Self {
        RenderGraphImageType::Dim2D
    }
}

/// Everything needed to declare an image in the graph. Imported images are
/// externally owned (swapchain images etc.); they are excluded from aliasing
/// and bound to native resources through the backend.
#[derive(Clone, Debug)]
pub struct RenderGraphImageDef {
    pub name: String,
    pub format: RenderGraphFormat,
    pub extents: RenderGraphExtents3D,
    pub usage_flags: RenderGraphImageUsageFlags,
    pub image_type: RenderGraphImageType,
    pub create_flags: RenderGraphImageCreateFlags,
    pub mip_count: u32,
    pub layer_count: u32,
    pub sample_count: u32,
    pub imported: bool,
}

impl Default for RenderGraphImageDef {
    fn default() -> Self {
        RenderGraphImageDef {
            name: Default::default(),
            format: Default::default(),
            extents: Default::default(),
            usage_flags: Default::default(),
            image_type: Default::default(),
            create_flags: Default::default(),
            mip_count: 1,
            layer_count: 1,
            sample_count: 1,
            imported: false,
        }
    }
}

/// Column-oriented storage for all image declarations. Every column is
/// indexed by `RenderGraphImageId`.
#[derive(Default, Debug)]
pub struct RenderGraphImageTable {
    pub(super) names: Vec<String>,
    pub(super) formats: Vec<RenderGraphFormat>,
    pub(super) extents: Vec<RenderGraphExtents3D>,
    pub(super) usage_flags: Vec<RenderGraphImageUsageFlags>,
    pub(super) image_types: Vec<RenderGraphImageType>,
    pub(super) create_flags: Vec<RenderGraphImageCreateFlags>,
    pub(super) mip_counts: Vec<u32>,
    pub(super) layer_counts: Vec<u32>,
    pub(super) sample_counts: Vec<u32>,
    pub(super) is_imported: Vec<bool>,
    pub(super) is_transient: Vec<bool>,
}

impl RenderGraphImageTable {
    pub(super) fn add(
        &mut self,
        def: RenderGraphImageDef,
    ) -> RenderGraphImageId {
        let id = RenderGraphImageId(self.names.len() as u32);
        self.names.push(def.name);
        self.formats.push(def.format);
        self.extents.push(def.extents);
        self.usage_flags.push(def.usage_flags);
        self.image_types.push(def.image_type);
        self.create_flags.push(def.create_flags);
        self.mip_counts.push(def.mip_count);
        self.layer_counts.push(def.layer_count);
        self.sample_counts.push(def.sample_count);
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
        image: RenderGraphImageId,
    ) -> bool {
        image.index() < self.names.len()
    }

    pub fn name(
        &self,
        image: RenderGraphImageId,
    ) -> &str {
        &self.names[image.index()]
    }

    pub fn imported(
        &self,
        image: RenderGraphImageId,
    ) -> bool {
        self.is_imported[image.index()]
    }

    pub fn transient(
        &self,
        image: RenderGraphImageId,
    ) -> bool {
        self.is_transient[image.index()]
    }

    /// True if two images can share backing memory, assuming their lifetimes
    /// don't overlap. Requires equality on every creation-relevant column.
    pub(super) fn is_compatible(
        &self,
        a: RenderGraphImageId,
        b: RenderGraphImageId,
    ) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }

        let a = a.index();
        let b = b.index();
        self.formats[a] == self.formats[b]
            && self.extents[a] == self.extents[b]
            && self.usage_flags[a] == self.usage_flags[b]
            && self.image_types[a] == self.image_types[b]
            && self.create_flags[a] == self.create_flags[b]
            && self.mip_counts[a] == self.mip_counts[b]
            && self.layer_counts[a] == self.layer_counts[b]
            && self.sample_counts[a] == self.sample_counts[b]
    }

    pub(super) fn clear(&mut self) {
        self.names.clear();
        self.formats.clear();
        self.extents.clear();
        self.usage_flags.clear();
        self.image_types.clear();
        self.create_flags.clear();
        self.mip_counts.clear();
        self.layer_counts.clear();
        self.sample_counts.clear();
        self.is_imported.clear();
        self.is_transient.clear();
    }
}

/// Version -> producer lookup in flat-array form. For image `i`, versions
/// `[0..N)` occupy the contiguous range starting at `version_offsets[i]`,
/// with `N = version_offsets[i+1] - version_offsets[i]`.
#[derive(Default, Debug)]
pub struct ImageProducerTable {
    /// len = image_count + 1
    pub(super) version_offsets: Vec<u32>,
    /// len = total image versions; `RenderGraphPassId::INVALID` when unfilled
    pub(super) version_producers: Vec<RenderGraphPassId>,
    /// len = image_count; packed `(image, last_version)` or invalid if the
    /// image was never written
    pub(super) latest: Vec<RenderGraphImageVersionId>,
}

impl ImageProducerTable {
    /// The pass that produced this exact version, or `INVALID` when the
    /// version is out of range or was never recorded
    pub fn producer(
        &self,
        version_id: RenderGraphImageVersionId,
    ) -> RenderGraphPassId {
        if version_id.is_invalid() {
            return RenderGraphPassId::INVALID;
        }

        let image = version_id.image().index();
        if image + 1 >= self.version_offsets.len() {
            return RenderGraphPassId::INVALID;
        }

        let base = self.version_offsets[image];
        let end = self.version_offsets[image + 1];
        let idx = base + version_id.version();
        if idx >= end {
            return RenderGraphPassId::INVALID;
        }

        self.version_producers[idx as usize]
    }

    pub fn latest_version(
        &self,
        image: RenderGraphImageId,
    ) -> RenderGraphImageVersionId {
        if image.index() < self.latest.len() {
            self.latest[image.index()]
        } else {
            RenderGraphImageVersionId::INVALID
        }
    }

    /// Number of versions recorded for this image (equals its write count)
    pub fn version_count(
        &self,
        image: RenderGraphImageId,
    ) -> u32 {
        if image.index() + 1 >= self.version_offsets.len() {
            return 0;
        }
        self.version_offsets[image.index() + 1] - self.version_offsets[image.index()]
    }
}
