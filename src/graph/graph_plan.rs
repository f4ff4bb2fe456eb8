use super::*;
use fnv::FnvHashMap;
use std::collections::VecDeque;

/// Sentinel for "not scheduled / never touched" positions in the sorted
/// pass order
const UNUSED_POSITION: u32 = u32::MAX;

/// Versioned views of the dependency arenas. Entries are parallel to the
/// arenas they were derived from: `image_read_versions[i]` names the version
/// that `image_read_deps.resources[i]` binds to.
#[derive(Default, Debug)]
pub struct VersionedDependencies {
    pub(super) image_read_versions: Vec<RenderGraphImageVersionId>,
    pub(super) image_write_versions: Vec<RenderGraphImageVersionId>,
    pub(super) buffer_read_versions: Vec<RenderGraphBufferVersionId>,
    pub(super) buffer_write_versions: Vec<RenderGraphBufferVersionId>,

    /// Total writes recorded per image; sizes the producer tables
    pub(super) image_version_counts: Vec<u32>,
    pub(super) buffer_version_counts: Vec<u32>,
}

#[derive(Default, Debug)]
pub struct ProducerTables {
    pub images: ImageProducerTable,
    pub buffers: BufferProducerTable,
}

/// Pass-to-pass edges in CSR form. Only live passes have edges; a culled
/// pass has zero degree and an empty adjacency range.
#[derive(Default, Debug)]
pub struct RenderGraphDag {
    /// len = pass_count + 1
    pub adjacency_begins: Vec<u32>,
    pub adjacency_list: Vec<RenderGraphPassId>,
    pub in_degrees: Vec<u32>,
    pub out_degrees: Vec<u32>,
}

impl RenderGraphDag {
    pub fn edges_from(
        &self,
        pass: RenderGraphPassId,
    ) -> &[RenderGraphPassId] {
        let begin = self.adjacency_begins[pass.index()] as usize;
        let end = self.adjacency_begins[pass.index() + 1] as usize;
        &self.adjacency_list[begin..end]
    }
}

/// First/last positions in the scheduled pass order at which each resource
/// is touched (read or written) by a live pass. Inclusive on both ends.
#[derive(Default, Debug)]
pub struct ResourceLifetimes {
    pub(super) image_first_use: Vec<u32>,
    pub(super) image_last_use: Vec<u32>,
    pub(super) buffer_first_use: Vec<u32>,
    pub(super) buffer_last_use: Vec<u32>,
}

impl ResourceLifetimes {
    /// Scheduled `[first, last]` interval, or None if no live pass touches
    /// the image
    pub fn image_interval(
        &self,
        image: RenderGraphImageId,
    ) -> Option<(u32, u32)> {
        let first = self.image_first_use[image.index()];
        if first == UNUSED_POSITION {
            None
        } else {
            Some((first, self.image_last_use[image.index()]))
        }
    }

    pub fn buffer_interval(
        &self,
        buffer: RenderGraphBufferId,
    ) -> Option<(u32, u32)> {
        let first = self.buffer_first_use[buffer.index()];
        if first == UNUSED_POSITION {
            None
        } else {
            Some((first, self.buffer_last_use[buffer.index()]))
        }
    }
}

/// The aliasing results handed to the backend: one physical slot per group
/// of lifetime-disjoint compatible transients, plus the slots of imported
/// resources (which never share).
#[derive(Default, Debug)]
pub struct PhysicalResourceTables {
    /// Physical slot -> the logical image whose descriptor defines the slot
    pub physical_images: Vec<RenderGraphImageId>,
    /// Logical image -> physical slot; invalid if no live pass uses it
    pub image_physical_ids: Vec<PhysicalImageId>,

    pub physical_buffers: Vec<RenderGraphBufferId>,
    pub buffer_physical_ids: Vec<PhysicalBufferId>,
}

impl PhysicalResourceTables {
    pub fn image_physical(
        &self,
        image: RenderGraphImageId,
    ) -> PhysicalImageId {
        if image.index() < self.image_physical_ids.len() {
            self.image_physical_ids[image.index()]
        } else {
            PhysicalImageId::INVALID
        }
    }

    pub fn buffer_physical(
        &self,
        buffer: RenderGraphBufferId,
    ) -> PhysicalBufferId {
        if buffer.index() < self.buffer_physical_ids.len() {
            self.buffer_physical_ids[buffer.index()]
        } else {
            PhysicalBufferId::INVALID
        }
    }

    pub fn physical_image_count(&self) -> usize {
        self.physical_images.len()
    }

    pub fn physical_buffer_count(&self) -> usize {
        self.physical_buffers.len()
    }
}

/// Everything derived by a compile. Execution only needs `sorted_passes` and
/// `barrier_plan`; the intermediate tables are retained for backends and
/// debugging.
#[derive(Debug)]
pub struct RenderGraphPlan {
    pub live_passes: Vec<bool>,
    pub sorted_passes: Vec<RenderGraphPassId>,
    /// Scheduled position per pass; `u32::MAX` for culled passes
    pub(super) pass_positions: Vec<u32>,

    pub versions: VersionedDependencies,
    pub producers: ProducerTables,
    pub dag: RenderGraphDag,
    pub lifetimes: ResourceLifetimes,
    pub physical_resources: PhysicalResourceTables,
    pub barrier_plan: RenderGraphBarrierPlan,
}

impl RenderGraphPlan {
    /// Position of a pass in the scheduled order, or None if it was culled
    pub fn scheduled_position(
        &self,
        pass: RenderGraphPassId,
    ) -> Option<usize> {
        let position = self.pass_positions[pass.index()];
        if position == UNUSED_POSITION {
            None
        } else {
            Some(position as usize)
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        registry: &RenderGraphResourceRegistry,
        passes: &RenderGraphPassTopology,
        image_read_deps: &ImageDependencyList,
        image_write_deps: &ImageDependencyList,
        buffer_read_deps: &BufferDependencyList,
        buffer_write_deps: &BufferDependencyList,
        outputs: &OutputTable,
        config: &RenderGraphConfig,
    ) -> RenderGraphResult<RenderGraphPlan> {
        let versions = assign_versions(
            registry,
            passes,
            image_read_deps,
            image_write_deps,
            buffer_read_deps,
            buffer_write_deps,
        );

        let producers = build_producer_tables(registry, passes, image_write_deps, buffer_write_deps, &versions);

        let live_passes = cull_passes(
            registry,
            passes,
            image_read_deps,
            buffer_read_deps,
            outputs,
            &versions,
            &producers,
        );

        validate_graph(
            registry,
            passes,
            image_read_deps,
            image_write_deps,
            buffer_read_deps,
            buffer_write_deps,
            outputs,
            &versions,
            &producers,
            &live_passes,
            config,
        )?;

        let dag = build_dag(
            passes,
            image_read_deps,
            buffer_read_deps,
            &versions,
            &producers,
            &live_passes,
        );

        let sorted_passes = schedule_passes(&dag, &live_passes)?;

        let mut pass_positions = vec![UNUSED_POSITION; passes.pass_count()];
        for (position, &pass) in sorted_passes.iter().enumerate() {
            pass_positions[pass.index()] = position as u32;
        }

        let lifetimes = analyze_lifetimes(
            registry,
            image_read_deps,
            image_write_deps,
            buffer_read_deps,
            buffer_write_deps,
            &sorted_passes,
            &pass_positions,
        );

        let physical_resources = assign_physical_resources(registry, &lifetimes);

        let barrier_plan = build_barrier_plan(
            passes,
            image_read_deps,
            image_write_deps,
            buffer_read_deps,
            buffer_write_deps,
            &sorted_passes,
            &physical_resources,
        );

        let plan = RenderGraphPlan {
            live_passes,
            sorted_passes,
            pass_positions,
            versions,
            producers,
            dag,
            lifetimes,
            physical_resources,
            barrier_plan,
        };

        print_final_plan(registry, &plan);

        Ok(plan)
    }
}

//
// Assign a version to every recorded access. Writes produce new versions;
// reads bind to the most recent prior write in registration order, which is
// the only total order available before scheduling. An unwritten or
// out-of-range resource yields the invalid sentinel, to be judged by
// validation.
//
#[profiling::function]
fn assign_versions(
    registry: &RenderGraphResourceRegistry,
    passes: &RenderGraphPassTopology,
    image_read_deps: &ImageDependencyList,
    image_write_deps: &ImageDependencyList,
    buffer_read_deps: &BufferDependencyList,
    buffer_write_deps: &BufferDependencyList,
) -> VersionedDependencies {
    log::trace!("-- Assign resource versions --");

    let image_count = registry.images.len();
    let buffer_count = registry.buffers.len();

    let mut versions = VersionedDependencies::default();
    versions
        .image_read_versions
        .resize(image_read_deps.len(), RenderGraphImageVersionId::INVALID);
    versions
        .image_write_versions
        .resize(image_write_deps.len(), RenderGraphImageVersionId::INVALID);
    versions
        .buffer_read_versions
        .resize(buffer_read_deps.len(), RenderGraphBufferVersionId::INVALID);
    versions
        .buffer_write_versions
        .resize(buffer_write_deps.len(), RenderGraphBufferVersionId::INVALID);
    versions.image_version_counts.resize(image_count, 0);
    versions.buffer_version_counts.resize(buffer_count, 0);

    for &current_pass in &passes.passes {
        // Image reads bind to the latest version visible at this point in
        // registration order
        for i in image_read_deps.range(current_pass) {
            let image = image_read_deps.resources[i];
            let next_version = if image.index() < image_count {
                versions.image_version_counts[image.index()]
            } else {
                0
            };

            if next_version == 0 {
                // Unwritten (or imported-only) at this point; no producer.
                // Validation decides whether that is legal.
                versions.image_read_versions[i] = RenderGraphImageVersionId::INVALID;
            } else {
                versions.image_read_versions[i] =
                    RenderGraphImageVersionId::new(image, next_version - 1);
            }
        }

        // Image writes mint the next version
        for i in image_write_deps.range(current_pass) {
            let image = image_write_deps.resources[i];
            if image.index() >= image_count {
                versions.image_write_versions[i] = RenderGraphImageVersionId::INVALID;
                continue;
            }

            let next_version = versions.image_version_counts[image.index()];
            versions.image_write_versions[i] = RenderGraphImageVersionId::new(image, next_version);
            versions.image_version_counts[image.index()] = next_version + 1;
            log::trace!(
                "  {:?} writes image {:?} v{}",
                current_pass,
                image,
                next_version
            );
        }

        // Buffer reads
        for i in buffer_read_deps.range(current_pass) {
            let buffer = buffer_read_deps.resources[i];
            let next_version = if buffer.index() < buffer_count {
                versions.buffer_version_counts[buffer.index()]
            } else {
                0
            };

            if next_version == 0 {
                versions.buffer_read_versions[i] = RenderGraphBufferVersionId::INVALID;
            } else {
                versions.buffer_read_versions[i] =
                    RenderGraphBufferVersionId::new(buffer, next_version - 1);
            }
        }

        // Buffer writes
        for i in buffer_write_deps.range(current_pass) {
            let buffer = buffer_write_deps.resources[i];
            if buffer.index() >= buffer_count {
                versions.buffer_write_versions[i] = RenderGraphBufferVersionId::INVALID;
                continue;
            }

            let next_version = versions.buffer_version_counts[buffer.index()];
            versions.buffer_write_versions[i] =
                RenderGraphBufferVersionId::new(buffer, next_version);
            versions.buffer_version_counts[buffer.index()] = next_version + 1;
            log::trace!(
                "  {:?} writes buffer {:?} v{}",
                current_pass,
                buffer,
                next_version
            );
        }
    }

    versions
}

//
// Build the flat version -> producer lookup. Offsets are prefix sums of the
// per-handle version counts; producer slots start as the invalid sentinel
// and are filled from the write entries.
//
#[profiling::function]
fn build_producer_tables(
    registry: &RenderGraphResourceRegistry,
    passes: &RenderGraphPassTopology,
    image_write_deps: &ImageDependencyList,
    buffer_write_deps: &BufferDependencyList,
    versions: &VersionedDependencies,
) -> ProducerTables {
    log::trace!("-- Build producer tables --");

    let image_count = registry.images.len();
    let buffer_count = registry.buffers.len();

    let mut producers = ProducerTables::default();

    producers.images.version_offsets.resize(image_count + 1, 0);
    producers
        .images
        .latest
        .resize(image_count, RenderGraphImageVersionId::INVALID);
    {
        let mut running = 0u32;
        for image_index in 0..image_count {
            producers.images.version_offsets[image_index] = running;
            let version_count = versions.image_version_counts[image_index];
            if version_count > 0 {
                producers.images.latest[image_index] = RenderGraphImageVersionId::new(
                    RenderGraphImageId(image_index as u32),
                    version_count - 1,
                );
            }
            running += version_count;
        }
        producers.images.version_offsets[image_count] = running;
        producers
            .images
            .version_producers
            .resize(running as usize, RenderGraphPassId::INVALID);
    }

    producers
        .buffers
        .version_offsets
        .resize(buffer_count + 1, 0);
    producers
        .buffers
        .latest
        .resize(buffer_count, RenderGraphBufferVersionId::INVALID);
    {
        let mut running = 0u32;
        for buffer_index in 0..buffer_count {
            producers.buffers.version_offsets[buffer_index] = running;
            let version_count = versions.buffer_version_counts[buffer_index];
            if version_count > 0 {
                producers.buffers.latest[buffer_index] = RenderGraphBufferVersionId::new(
                    RenderGraphBufferId(buffer_index as u32),
                    version_count - 1,
                );
            }
            running += version_count;
        }
        producers.buffers.version_offsets[buffer_count] = running;
        producers
            .buffers
            .version_producers
            .resize(running as usize, RenderGraphPassId::INVALID);
    }

    // Fill image producers for each (image, version)
    for &current_pass in &passes.passes {
        for i in image_write_deps.range(current_pass) {
            let version_id = versions.image_write_versions[i];
            if version_id.is_invalid() {
                continue;
            }

            let image = version_id.image();
            let base = producers.images.version_offsets[image.index()];
            let end = producers.images.version_offsets[image.index() + 1];
            let idx = base + version_id.version();
            if idx < end {
                producers.images.version_producers[idx as usize] = current_pass;
            }
        }

        for i in buffer_write_deps.range(current_pass) {
            let version_id = versions.buffer_write_versions[i];
            if version_id.is_invalid() {
                continue;
            }

            let buffer = version_id.buffer();
            let base = producers.buffers.version_offsets[buffer.index()];
            let end = producers.buffers.version_offsets[buffer.index() + 1];
            let idx = base + version_id.version();
            if idx < end {
                producers.buffers.version_producers[idx as usize] = current_pass;
            }
        }
    }

    producers
}

//
// Mark passes live by reverse reachability from the declared outputs. The
// worklist is seeded with the producers of the latest version of every
// output, then grows through read entries: if a live pass reads a resource,
// its producer must also be live. Writes are not traversed - the next
// reader's read entry supplies them.
//
#[profiling::function]
fn cull_passes(
    registry: &RenderGraphResourceRegistry,
    passes: &RenderGraphPassTopology,
    image_read_deps: &ImageDependencyList,
    buffer_read_deps: &BufferDependencyList,
    outputs: &OutputTable,
    versions: &VersionedDependencies,
    producers: &ProducerTables,
) -> Vec<bool> {
    log::trace!("-- Cull unreferenced passes --");

    let pass_count = passes.pass_count();
    let mut live_passes = vec![false; pass_count];
    let mut worklist = VecDeque::new();

    let enqueue_pass = |pass: RenderGraphPassId,
                            live_passes: &mut Vec<bool>,
                            worklist: &mut VecDeque<RenderGraphPassId>| {
        if !pass.is_valid() || pass.index() >= pass_count {
            return;
        }
        if !live_passes[pass.index()] {
            live_passes[pass.index()] = true;
            worklist.push_back(pass);
            log::trace!("  Pass {:?} is live", pass);
        }
    };

    // Seed roots from declared outputs
    for &output_image in &outputs.image_outputs {
        if registry.images.contains(output_image) {
            let producer = producers
                .images
                .producer(producers.images.latest_version(output_image));
            log::trace!(
                "  Output image {:?} produced by {:?}",
                output_image,
                producer
            );
            enqueue_pass(producer, &mut live_passes, &mut worklist);
        }
    }
    for &output_buffer in &outputs.buffer_outputs {
        if registry.buffers.contains(output_buffer) {
            let producer = producers
                .buffers
                .producer(producers.buffers.latest_version(output_buffer));
            log::trace!(
                "  Output buffer {:?} produced by {:?}",
                output_buffer,
                producer
            );
            enqueue_pass(producer, &mut live_passes, &mut worklist);
        }
    }

    // Reverse traversal over read dependencies
    while let Some(current_pass) = worklist.pop_front() {
        for i in image_read_deps.range(current_pass) {
            let producer = producers.images.producer(versions.image_read_versions[i]);
            enqueue_pass(producer, &mut live_passes, &mut worklist);
        }

        for i in buffer_read_deps.range(current_pass) {
            let producer = producers.buffers.producer(versions.buffer_read_versions[i]);
            enqueue_pass(producer, &mut live_passes, &mut worklist);
        }
    }

    live_passes
}

//
// Fail fast on malformed graphs before building the DAG. Only live passes
// are checked - a culled pass never executes, so its dangling reads are
// harmless.
//
#[allow(clippy::too_many_arguments)]
#[profiling::function]
pub(super) fn validate_graph(
    registry: &RenderGraphResourceRegistry,
    passes: &RenderGraphPassTopology,
    image_read_deps: &ImageDependencyList,
    image_write_deps: &ImageDependencyList,
    buffer_read_deps: &BufferDependencyList,
    buffer_write_deps: &BufferDependencyList,
    outputs: &OutputTable,
    versions: &VersionedDependencies,
    producers: &ProducerTables,
    live_passes: &[bool],
    config: &RenderGraphConfig,
) -> RenderGraphResult<()> {
    log::trace!("-- Validate graph --");

    if outputs.is_empty() {
        return Err(RenderGraphError::NoOutputsDeclared);
    }

    for &current_pass in &passes.passes {
        if !live_passes[current_pass.index()] {
            continue;
        }

        // Image reads
        for i in image_read_deps.range(current_pass) {
            let image = image_read_deps.resources[i];
            if !registry.images.contains(image) {
                return Err(RenderGraphError::ImageReadOutOfRange(current_pass, image));
            }

            let version_id = versions.image_read_versions[i];
            let imported = registry.images.imported(image);

            if version_id.is_invalid() {
                // No write happened before this read; only legal for
                // imported resources
                if !imported {
                    return Err(RenderGraphError::ImageReadBeforeWrite(current_pass, image));
                }
            } else if !producers.images.producer(version_id).is_valid()
                && !imported
                && config.unresolved_producer_policy == UnresolvedProducerPolicy::Strict
            {
                return Err(RenderGraphError::UnresolvedImageProducer(
                    current_pass,
                    image,
                ));
            }
        }

        // Buffer reads
        for i in buffer_read_deps.range(current_pass) {
            let buffer = buffer_read_deps.resources[i];
            if !registry.buffers.contains(buffer) {
                return Err(RenderGraphError::BufferReadOutOfRange(current_pass, buffer));
            }

            let version_id = versions.buffer_read_versions[i];
            let imported = registry.buffers.imported(buffer);

            if version_id.is_invalid() {
                if !imported {
                    return Err(RenderGraphError::BufferReadBeforeWrite(
                        current_pass,
                        buffer,
                    ));
                }
            } else if !producers.buffers.producer(version_id).is_valid()
                && !imported
                && config.unresolved_producer_policy == UnresolvedProducerPolicy::Strict
            {
                return Err(RenderGraphError::UnresolvedBufferProducer(
                    current_pass,
                    buffer,
                ));
            }
        }

        // Image writes
        for i in image_write_deps.range(current_pass) {
            let image = image_write_deps.resources[i];
            if !registry.images.contains(image) || versions.image_write_versions[i].is_invalid() {
                return Err(RenderGraphError::ImageWriteOutOfRange(current_pass, image));
            }
        }

        // Buffer writes
        for i in buffer_write_deps.range(current_pass) {
            let buffer = buffer_write_deps.resources[i];
            if !registry.buffers.contains(buffer) || versions.buffer_write_versions[i].is_invalid()
            {
                return Err(RenderGraphError::BufferWriteOutOfRange(
                    current_pass,
                    buffer,
                ));
            }
        }
    }

    Ok(())
}

//
// Build producer -> consumer edges from the read entries of live passes,
// deduplicate, and pack into CSR form.
//
#[profiling::function]
fn build_dag(
    passes: &RenderGraphPassTopology,
    image_read_deps: &ImageDependencyList,
    buffer_read_deps: &BufferDependencyList,
    versions: &VersionedDependencies,
    producers: &ProducerTables,
    live_passes: &[bool],
) -> RenderGraphDag {
    log::trace!("-- Build DAG --");

    let pass_count = passes.pass_count();
    let mut outgoing: Vec<Vec<RenderGraphPassId>> = vec![Default::default(); pass_count];

    let mut add_edge = |from: RenderGraphPassId, to: RenderGraphPassId| {
        if !from.is_valid() || from.index() >= pass_count {
            return;
        }
        if from == to {
            return;
        }
        if !live_passes[from.index()] || !live_passes[to.index()] {
            return;
        }
        log::trace!("  Edge {:?} -> {:?}", from, to);
        outgoing[from.index()].push(to);
    };

    for &consumer_pass in &passes.passes {
        if !live_passes[consumer_pass.index()] {
            continue;
        }

        for i in image_read_deps.range(consumer_pass) {
            let producer = producers.images.producer(versions.image_read_versions[i]);
            add_edge(producer, consumer_pass);
        }

        for i in buffer_read_deps.range(consumer_pass) {
            let producer = producers.buffers.producer(versions.buffer_read_versions[i]);
            add_edge(producer, consumer_pass);
        }
    }

    // Deduplicate edges per producer and compute degrees
    let mut dag = RenderGraphDag {
        adjacency_begins: vec![0; pass_count + 1],
        adjacency_list: Default::default(),
        in_degrees: vec![0; pass_count],
        out_degrees: vec![0; pass_count],
    };

    for list in &mut outgoing {
        list.sort_by_key(|pass| pass.index());
        list.dedup();
    }

    for (from, list) in outgoing.iter().enumerate() {
        dag.out_degrees[from] = list.len() as u32;
        for &to in list {
            dag.in_degrees[to.index()] += 1;
        }
    }

    let mut running = 0u32;
    for (from, list) in outgoing.iter().enumerate() {
        dag.adjacency_begins[from] = running;
        dag.adjacency_list.extend_from_slice(list);
        running = dag.adjacency_list.len() as u32;
    }
    dag.adjacency_begins[pass_count] = running;

    dag
}

//
// Kahn's algorithm over the live subgraph. Ready passes drain FIFO, so ties
// break in registration order. If the sort cannot drain every live pass the
// graph has a cycle.
//
#[profiling::function]
pub(super) fn schedule_passes(
    dag: &RenderGraphDag,
    live_passes: &[bool],
) -> RenderGraphResult<Vec<RenderGraphPassId>> {
    log::trace!("-- Schedule passes --");

    let pass_count = live_passes.len();
    let mut in_degrees = dag.in_degrees.clone();
    let mut ready_queue = VecDeque::new();
    let mut sorted_passes = Vec::with_capacity(pass_count);

    for pass_index in 0..pass_count {
        if live_passes[pass_index] && in_degrees[pass_index] == 0 {
            ready_queue.push_back(RenderGraphPassId(pass_index as u32));
        }
    }

    while let Some(current_pass) = ready_queue.pop_front() {
        log::trace!("  Schedule {:?}", current_pass);
        sorted_passes.push(current_pass);

        for &next_pass in dag.edges_from(current_pass) {
            in_degrees[next_pass.index()] -= 1;
            if in_degrees[next_pass.index()] == 0 {
                ready_queue.push_back(next_pass);
            }
        }
    }

    let live_count = live_passes.iter().filter(|&&live| live).count();
    if sorted_passes.len() != live_count {
        log::error!(
            "Scheduled {} of {} live passes; the graph has a cycle",
            sorted_passes.len(),
            live_count
        );
        return Err(RenderGraphError::CycleDetected);
    }

    Ok(sorted_passes)
}

/// Debug check that a DAG and live-flag set can drain completely under
/// Kahn's algorithm (i.e. the live subgraph is acyclic). Tolerates edges to
/// culled passes, unlike the scheduler, so it can be pointed at
/// hand-constructed DAGs in tests.
pub fn verify_acyclic(
    dag: &RenderGraphDag,
    live_passes: &[bool],
) -> bool {
    let pass_count = live_passes.len();
    if dag.in_degrees.len() != pass_count || dag.adjacency_begins.len() != pass_count + 1 {
        return false;
    }

    let mut in_degrees = dag.in_degrees.clone();
    let mut ready_queue = VecDeque::new();

    for pass_index in 0..pass_count {
        if live_passes[pass_index] && in_degrees[pass_index] == 0 {
            ready_queue.push_back(RenderGraphPassId(pass_index as u32));
        }
    }

    let mut visited = 0;
    while let Some(current_pass) = ready_queue.pop_front() {
        visited += 1;

        for &next_pass in dag.edges_from(current_pass) {
            if !live_passes[next_pass.index()] {
                continue;
            }
            in_degrees[next_pass.index()] -= 1;
            if in_degrees[next_pass.index()] == 0 {
                ready_queue.push_back(next_pass);
            }
        }
    }

    visited == live_passes.iter().filter(|&&live| live).count()
}

//
// First/last scheduled positions per resource. Positions (not pass handles)
// are what make interval comparisons meaningful for aliasing.
//
#[profiling::function]
fn analyze_lifetimes(
    registry: &RenderGraphResourceRegistry,
    image_read_deps: &ImageDependencyList,
    image_write_deps: &ImageDependencyList,
    buffer_read_deps: &BufferDependencyList,
    buffer_write_deps: &BufferDependencyList,
    sorted_passes: &[RenderGraphPassId],
    pass_positions: &[u32],
) -> ResourceLifetimes {
    log::trace!("-- Analyze resource lifetimes --");

    let image_count = registry.images.len();
    let buffer_count = registry.buffers.len();

    let mut lifetimes = ResourceLifetimes {
        image_first_use: vec![UNUSED_POSITION; image_count],
        image_last_use: vec![0; image_count],
        buffer_first_use: vec![UNUSED_POSITION; buffer_count],
        buffer_last_use: vec![0; buffer_count],
    };

    fn update_lifetime(
        first_use: &mut [u32],
        last_use: &mut [u32],
        resource_index: usize,
        position: u32,
    ) {
        if resource_index >= first_use.len() {
            return;
        }
        if first_use[resource_index] == UNUSED_POSITION {
            first_use[resource_index] = position;
        }
        last_use[resource_index] = position;
    }

    for &pass in sorted_passes {
        let position = pass_positions[pass.index()];

        for i in image_read_deps.range(pass) {
            update_lifetime(
                &mut lifetimes.image_first_use,
                &mut lifetimes.image_last_use,
                image_read_deps.resources[i].index(),
                position,
            );
        }
        for i in image_write_deps.range(pass) {
            update_lifetime(
                &mut lifetimes.image_first_use,
                &mut lifetimes.image_last_use,
                image_write_deps.resources[i].index(),
                position,
            );
        }
        for i in buffer_read_deps.range(pass) {
            update_lifetime(
                &mut lifetimes.buffer_first_use,
                &mut lifetimes.buffer_last_use,
                buffer_read_deps.resources[i].index(),
                position,
            );
        }
        for i in buffer_write_deps.range(pass) {
            update_lifetime(
                &mut lifetimes.buffer_first_use,
                &mut lifetimes.buffer_last_use,
                buffer_write_deps.resources[i].index(),
                position,
            );
        }
    }

    lifetimes
}

fn intervals_overlap(
    first_a: u32,
    last_a: u32,
    first_b: u32,
    last_b: u32,
) -> bool {
    first_a.max(first_b) <= last_a.min(last_b)
}

//
// Greedy first-fit aliasing. Walk logical handles in ascending order and
// drop each one into the first physical slot whose representative descriptor
// matches and whose packed intervals don't overlap the new lifetime.
// Imported resources get dedicated slots marked with an empty interval list
// so nothing ever packs next to them. Deterministic and cheap; the slot
// assignment is the contract, not the packing quality.
//
#[profiling::function]
fn assign_physical_resources(
    registry: &RenderGraphResourceRegistry,
    lifetimes: &ResourceLifetimes,
) -> PhysicalResourceTables {
    log::trace!("-- Assign physical resources --");

    let image_count = registry.images.len();
    let buffer_count = registry.buffers.len();

    let mut tables = PhysicalResourceTables {
        physical_images: Default::default(),
        image_physical_ids: vec![PhysicalImageId::INVALID; image_count],
        physical_buffers: Default::default(),
        buffer_physical_ids: vec![PhysicalBufferId::INVALID; buffer_count],
    };

    // Images
    {
        // Intervals already packed into each slot; empty = imported slot
        let mut slot_intervals: Vec<Vec<(u32, u32)>> = Default::default();

        for image_index in 0..image_count {
            let image = RenderGraphImageId(image_index as u32);
            let first = lifetimes.image_first_use[image_index];
            let last = lifetimes.image_last_use[image_index];

            // Skip unused
            if first == UNUSED_POSITION {
                continue;
            }

            // Imported images are externally owned; assign a dedicated slot
            // that never aliases
            if registry.images.imported(image) {
                let physical = PhysicalImageId(tables.physical_images.len() as u32);
                tables.physical_images.push(image);
                tables.image_physical_ids[image_index] = physical;
                slot_intervals.push(Default::default());
                log::trace!("  Image {:?} -> {:?} (imported)", image, physical);
                continue;
            }

            let mut assigned = None;
            for (slot_index, intervals) in slot_intervals.iter_mut().enumerate() {
                if intervals.is_empty() {
                    continue;
                }

                let representative = tables.physical_images[slot_index];
                if !registry.images.is_compatible(representative, image) {
                    continue;
                }

                let overlaps = intervals
                    .iter()
                    .any(|&(slot_first, slot_last)| {
                        intervals_overlap(first, last, slot_first, slot_last)
                    });
                if overlaps {
                    continue;
                }

                intervals.push((first, last));
                assigned = Some(PhysicalImageId(slot_index as u32));
                break;
            }

            let physical = assigned.unwrap_or_else(|| {
                let physical = PhysicalImageId(tables.physical_images.len() as u32);
                tables.physical_images.push(image);
                slot_intervals.push(vec![(first, last)]);
                physical
            });

            tables.image_physical_ids[image_index] = physical;
            log::trace!(
                "  Image {:?} -> {:?} used in [{}:{}]",
                image,
                physical,
                first,
                last
            );
        }
    }

    // Buffers
    {
        let mut slot_intervals: Vec<Vec<(u32, u32)>> = Default::default();

        for buffer_index in 0..buffer_count {
            let buffer = RenderGraphBufferId(buffer_index as u32);
            let first = lifetimes.buffer_first_use[buffer_index];
            let last = lifetimes.buffer_last_use[buffer_index];

            if first == UNUSED_POSITION {
                continue;
            }

            if registry.buffers.imported(buffer) {
                let physical = PhysicalBufferId(tables.physical_buffers.len() as u32);
                tables.physical_buffers.push(buffer);
                tables.buffer_physical_ids[buffer_index] = physical;
                slot_intervals.push(Default::default());
                log::trace!("  Buffer {:?} -> {:?} (imported)", buffer, physical);
                continue;
            }

            let mut assigned = None;
            for (slot_index, intervals) in slot_intervals.iter_mut().enumerate() {
                if intervals.is_empty() {
                    continue;
                }

                let representative = tables.physical_buffers[slot_index];
                if !registry.buffers.is_compatible(representative, buffer) {
                    continue;
                }

                let overlaps = intervals
                    .iter()
                    .any(|&(slot_first, slot_last)| {
                        intervals_overlap(first, last, slot_first, slot_last)
                    });
                if overlaps {
                    continue;
                }

                intervals.push((first, last));
                assigned = Some(PhysicalBufferId(slot_index as u32));
                break;
            }

            let physical = assigned.unwrap_or_else(|| {
                let physical = PhysicalBufferId(tables.physical_buffers.len() as u32);
                tables.physical_buffers.push(buffer);
                slot_intervals.push(vec![(first, last)]);
                physical
            });

            tables.buffer_physical_ids[buffer_index] = physical;
            log::trace!(
                "  Buffer {:?} -> {:?} used in [{}:{}]",
                buffer,
                physical,
                first,
                last
            );
        }
    }

    tables
}

fn to_access_type(
    has_read: bool,
    has_write: bool,
) -> RenderGraphAccessType {
    if has_read && has_write {
        RenderGraphAccessType::ReadWrite
    } else if has_write {
        RenderGraphAccessType::Write
    } else {
        RenderGraphAccessType::Read
    }
}

/// Most recent use of a physical slot, tracked while walking the schedule
#[derive(Clone, Copy)]
struct LastUse {
    logical: u32,
    usage_bits: u32,
    domain: RenderGraphPipelineDomain,
    access: RenderGraphAccessType,
    valid: bool,
}

impl Default for LastUse {
    fn default() -> Self {
        LastUse {
            logical: 0,
            usage_bits: 0,
            domain: RenderGraphPipelineDomain::Any,
            access: RenderGraphAccessType::Read,
            valid: false,
        }
    }
}

/// Coalesced accesses of one pass to one logical resource
#[derive(Default, Clone, Copy)]
struct CoalescedAccess {
    has_read: bool,
    has_write: bool,
    usage_bits: u32,
}

#[allow(clippy::too_many_arguments)]
fn plan_resource_barriers(
    pass_ops: &mut Vec<RenderGraphBarrierOp>,
    last_use: &mut LastUse,
    kind: RenderGraphResourceKind,
    logical: u32,
    physical: u32,
    desired_access: RenderGraphAccessType,
    desired_usage_bits: u32,
    storage_compatible: bool,
) {
    // A physical slot changing logical occupants needs an aliasing barrier
    // at the new occupant's pass
    if last_use.valid && last_use.logical != logical {
        pass_ops.push(RenderGraphBarrierOp {
            barrier_type: RenderGraphBarrierType::Aliasing,
            kind,
            logical,
            physical,
            prev_logical: last_use.logical,
            ..Default::default()
        });
    }

    if last_use.valid {
        // State/usage changed across passes. Backends decide what a
        // transition means (Vk layout + barrier, D3D12 state transition, ...)
        let changed = last_use.usage_bits != desired_usage_bits
            || last_use.access != desired_access
            || last_use.domain != RenderGraphPipelineDomain::Any;
        if changed {
            pass_ops.push(RenderGraphBarrierOp {
                barrier_type: RenderGraphBarrierType::Transition,
                kind,
                logical,
                physical,
                src_domain: last_use.domain,
                dst_domain: RenderGraphPipelineDomain::Any,
                src_access: last_use.access,
                dst_access: desired_access,
                src_usage_bits: last_use.usage_bits,
                dst_usage_bits: desired_usage_bits,
                ..Default::default()
            });
        }

        // Write -> (read/write) ordering on storage resources
        if last_use.access != RenderGraphAccessType::Read && storage_compatible {
            pass_ops.push(RenderGraphBarrierOp {
                barrier_type: RenderGraphBarrierType::Uav,
                kind,
                logical,
                physical,
                ..Default::default()
            });
        }
    }

    last_use.valid = true;
    last_use.logical = logical;
    last_use.access = desired_access;
    last_use.domain = RenderGraphPipelineDomain::Any;
    last_use.usage_bits = desired_usage_bits;
}

//
// Walk the schedule tracking the most recent use of every physical slot and
// emit aliasing/transition/UAV ops per pass. The first visit of a slot emits
// nothing - backends own first-use initialization. Per-pass op vectors are
// flattened into the CSR + column plan at the end.
//
#[profiling::function]
fn build_barrier_plan(
    passes: &RenderGraphPassTopology,
    image_read_deps: &ImageDependencyList,
    image_write_deps: &ImageDependencyList,
    buffer_read_deps: &BufferDependencyList,
    buffer_write_deps: &BufferDependencyList,
    sorted_passes: &[RenderGraphPassId],
    physical_resources: &PhysicalResourceTables,
) -> RenderGraphBarrierPlan {
    log::trace!("-- Build barrier plan --");

    let pass_count = passes.pass_count();
    let mut scratch: Vec<Vec<RenderGraphBarrierOp>> = vec![Default::default(); pass_count];

    let mut last_image_use =
        vec![LastUse::default(); physical_resources.physical_image_count()];
    let mut last_buffer_use =
        vec![LastUse::default(); physical_resources.physical_buffer_count()];

    for &pass in sorted_passes {
        // Images touched by this pass, coalesced per logical. Iterate in
        // first-appearance order so emission is deterministic.
        {
            let mut accesses = FnvHashMap::<RenderGraphImageId, CoalescedAccess>::default();
            let mut touch_order = Vec::default();

            for i in image_read_deps.range(pass) {
                let logical = image_read_deps.resources[i];
                let access = accesses.entry(logical).or_insert_with(|| {
                    touch_order.push(logical);
                    Default::default()
                });
                access.has_read = true;
                access.usage_bits |= image_read_deps.usage_bits[i].bits();
            }

            for i in image_write_deps.range(pass) {
                let logical = image_write_deps.resources[i];
                let access = accesses.entry(logical).or_insert_with(|| {
                    touch_order.push(logical);
                    Default::default()
                });
                access.has_write = true;
                access.usage_bits |= image_write_deps.usage_bits[i].bits();
            }

            for logical in touch_order {
                let access = accesses[&logical];
                let physical = physical_resources.image_physical(logical);
                if !physical.is_valid() {
                    continue;
                }

                let storage_compatible = access.usage_bits
                    & RenderGraphImageUsageFlags::STORAGE.bits()
                    != 0;
                plan_resource_barriers(
                    &mut scratch[pass.index()],
                    &mut last_image_use[physical.index()],
                    RenderGraphResourceKind::Image,
                    logical.0,
                    physical.0,
                    to_access_type(access.has_read, access.has_write),
                    access.usage_bits,
                    storage_compatible,
                );
            }
        }

        // Buffers touched by this pass
        {
            let mut accesses = FnvHashMap::<RenderGraphBufferId, CoalescedAccess>::default();
            let mut touch_order = Vec::default();

            for i in buffer_read_deps.range(pass) {
                let logical = buffer_read_deps.resources[i];
                let access = accesses.entry(logical).or_insert_with(|| {
                    touch_order.push(logical);
                    Default::default()
                });
                access.has_read = true;
                access.usage_bits |= buffer_read_deps.usage_bits[i].bits();
            }

            for i in buffer_write_deps.range(pass) {
                let logical = buffer_write_deps.resources[i];
                let access = accesses.entry(logical).or_insert_with(|| {
                    touch_order.push(logical);
                    Default::default()
                });
                access.has_write = true;
                access.usage_bits |= buffer_write_deps.usage_bits[i].bits();
            }

            for logical in touch_order {
                let access = accesses[&logical];
                let physical = physical_resources.buffer_physical(logical);
                if !physical.is_valid() {
                    continue;
                }

                let storage_compatible = access.usage_bits
                    & RenderGraphBufferUsageFlags::STORAGE_BUFFER.bits()
                    != 0;
                plan_resource_barriers(
                    &mut scratch[pass.index()],
                    &mut last_buffer_use[physical.index()],
                    RenderGraphResourceKind::Buffer,
                    logical.0,
                    physical.0,
                    to_access_type(access.has_read, access.has_write),
                    access.usage_bits,
                    storage_compatible,
                );
            }
        }
    }

    // Flatten scratch into the CSR + column layout
    let mut plan = RenderGraphBarrierPlan::default();
    plan.pass_begins.resize(pass_count + 1, 0);
    plan.pass_lengths.resize(pass_count, 0);

    let mut running = 0u32;
    for pass_index in 0..pass_count {
        plan.pass_begins[pass_index] = running;
        plan.pass_lengths[pass_index] = scratch[pass_index].len() as u32;
        running += plan.pass_lengths[pass_index];

        for op in &scratch[pass_index] {
            plan.push_op(op);
        }
    }
    plan.pass_begins[pass_count] = running;

    plan
}

//
// Trace dump of the compiled plan for debugger-free inspection
//
fn print_final_plan(
    registry: &RenderGraphResourceRegistry,
    plan: &RenderGraphPlan,
) {
    log::trace!("-- Compiled plan --");
    log::trace!("  Schedule: {:?}", plan.sorted_passes);

    for &pass in &plan.sorted_passes {
        let range = plan.barrier_plan.pass_range(pass);
        log::trace!("  {:?}: {} barrier ops", pass, range.len());
        for op in plan.barrier_plan.pass_ops(pass) {
            log::trace!("    {:?}", op);
        }
    }

    for (slot_index, &representative) in plan.physical_resources.physical_images.iter().enumerate()
    {
        log::trace!(
            "  Physical image {} <- {:?} {:?}",
            slot_index,
            representative,
            registry.images.name(representative)
        );
    }
    for (slot_index, &representative) in
        plan.physical_resources.physical_buffers.iter().enumerate()
    {
        log::trace!(
            "  Physical buffer {} <- {:?} {:?}",
            slot_index,
            representative,
            registry.buffers.name(representative)
        );
    }
}
