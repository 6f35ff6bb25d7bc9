use glam::{UVec3, Vec3};

/// Uniform grid over a fixed world box for O(1) neighbor queries.
///
/// Construction follows the sorted-list layout: assign a linearized cell
/// id per particle, radix-sort (cell id, particle id) pairs, then record
/// where each cell's run begins. `cell_start` holds -1 for empty cells.
///
/// Positions outside the box are clamped into the boundary cells per axis
/// rather than rejected; containment is the plane constraints' job, the
/// grid only has to stay well defined.
pub struct UniformGrid {
    origin: Vec3,
    cell_size: f32,
    inv_cell_size: f32,
    dims: UVec3,
    /// Number of live entries in the sorted arrays.
    len: usize,
    /// First sorted index per cell, -1 when the cell is empty.
    cell_start: Vec<i32>,
    /// Unsorted per-particle cell assignment, rebuilt every `build`.
    cell_id: Vec<u32>,
    particle_id: Vec<u32>,
    sorted_cell_id: Vec<u32>,
    sorted_particle_id: Vec<u32>,
    /// Radix sort scratch. Grows monotonically, never shrinks, and is
    /// released only with the grid.
    scratch: Vec<(u32, u32)>,
}

impl UniformGrid {
    /// Create a grid covering `[bounds_min, bounds_max]` with the given
    /// cell size (normally the SPH support radius) and particle capacity.
    pub fn new(bounds_min: Vec3, bounds_max: Vec3, cell_size: f32, max_particles: usize) -> Self {
        let extent = (bounds_max - bounds_min).max(Vec3::splat(cell_size));
        let dims = UVec3::new(
            (extent.x / cell_size).ceil().max(1.0) as u32,
            (extent.y / cell_size).ceil().max(1.0) as u32,
            (extent.z / cell_size).ceil().max(1.0) as u32,
        );
        let cell_count = (dims.x * dims.y * dims.z) as usize;
        Self {
            origin: bounds_min,
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            dims,
            len: 0,
            cell_start: vec![-1; cell_count],
            cell_id: vec![0; max_particles],
            particle_id: vec![0; max_particles],
            sorted_cell_id: vec![0; max_particles],
            sorted_particle_id: vec![0; max_particles],
            scratch: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Sorted cell ids of the live entries, for inspection.
    pub fn sorted_cell_ids(&self) -> &[u32] {
        &self.sorted_cell_id[..self.len]
    }

    /// Sorted particle ids of the live entries, for inspection.
    pub fn sorted_particle_ids(&self) -> &[u32] {
        &self.sorted_particle_id[..self.len]
    }

    pub fn cell_starts(&self) -> &[i32] {
        &self.cell_start
    }

    /// Rebuild the grid from the first `count` positions.
    pub fn build(&mut self, positions: &[Vec3], count: usize) {
        for s in self.cell_start.iter_mut() {
            *s = -1;
        }

        for i in 0..count {
            let cell = self.linearize(self.cell_coords(positions[i]));
            self.cell_id[i] = cell;
            self.particle_id[i] = i as u32;
        }

        self.sorted_cell_id[..count].copy_from_slice(&self.cell_id[..count]);
        self.sorted_particle_id[..count].copy_from_slice(&self.particle_id[..count]);
        self.radix_sort(count);
        self.len = count;

        for k in 0..count {
            if k == 0 || self.sorted_cell_id[k - 1] != self.sorted_cell_id[k] {
                self.cell_start[self.sorted_cell_id[k] as usize] = k as i32;
            }
        }
    }

    /// Visit every particle in the 3x3x3 cell block around `pos`.
    /// Calls `callback(particle_index)` for each candidate; the caller is
    /// responsible for distance checks.
    pub fn for_each_neighbor<F: FnMut(u32)>(&self, pos: Vec3, mut callback: F) {
        let c = self.cell_coords(pos);
        for dz in -1..=1_i32 {
            for dy in -1..=1_i32 {
                for dx in -1..=1_i32 {
                    let nx = c.x as i32 + dx;
                    let ny = c.y as i32 + dy;
                    let nz = c.z as i32 + dz;
                    if nx < 0
                        || ny < 0
                        || nz < 0
                        || nx >= self.dims.x as i32
                        || ny >= self.dims.y as i32
                        || nz >= self.dims.z as i32
                    {
                        continue;
                    }
                    let cell =
                        self.linearize(UVec3::new(nx as u32, ny as u32, nz as u32));
                    let start = self.cell_start[cell as usize];
                    if start < 0 {
                        continue;
                    }
                    let mut k = start as usize;
                    while k < self.len && self.sorted_cell_id[k] == cell {
                        callback(self.sorted_particle_id[k]);
                        k += 1;
                    }
                }
            }
        }
    }

    /// World position to clamped cell coordinates.
    #[inline]
    fn cell_coords(&self, pos: Vec3) -> UVec3 {
        let rel = (pos - self.origin) * self.inv_cell_size;
        UVec3::new(
            (rel.x.floor() as i32).clamp(0, self.dims.x as i32 - 1) as u32,
            (rel.y.floor() as i32).clamp(0, self.dims.y as i32 - 1) as u32,
            (rel.z.floor() as i32).clamp(0, self.dims.z as i32 - 1) as u32,
        )
    }

    #[inline]
    fn linearize(&self, c: UVec3) -> u32 {
        (c.z * self.dims.y + c.y) * self.dims.x + c.x
    }

    /// Stable LSD radix sort of the (cell id, particle id) pairs by cell
    /// id, 8 bits per pass. Only as many passes as the cell-id range needs.
    fn radix_sort(&mut self, count: usize) {
        if self.scratch.len() < count {
            self.scratch.resize(count, (0, 0));
        }

        let mut max_key = (self.dims.x * self.dims.y * self.dims.z).saturating_sub(1);
        let mut passes = 1;
        while max_key >= 256 {
            passes += 1;
            max_key >>= 8;
        }

        for pass in 0..passes {
            let shift = pass * 8;
            let mut offsets = [0u32; 256];
            for k in 0..count {
                offsets[((self.sorted_cell_id[k] >> shift) & 0xff) as usize] += 1;
            }
            let mut sum = 0;
            for slot in offsets.iter_mut() {
                let run = *slot;
                *slot = sum;
                sum += run;
            }
            for k in 0..count {
                let key = self.sorted_cell_id[k];
                let digit = ((key >> shift) & 0xff) as usize;
                self.scratch[offsets[digit] as usize] = (key, self.sorted_particle_id[k]);
                offsets[digit] += 1;
            }
            for (k, &(key, id)) in self.scratch[..count].iter().enumerate() {
                self.sorted_cell_id[k] = key;
                self.sorted_particle_id[k] = id;
            }
        }
    }
}
