use std::collections::BTreeMap;
use std::fmt;

use crate::array::{span, Array, Axis, ALL};




/**
 * Identifies one of the per-patch data arrays.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Field {
    Conserved,
    VertCoords,
    CellCoords,
    CellVolume,
    FaceAreaI,
    FaceAreaJ,
}




// ============================================================================
impl Field {

    pub fn all() -> [Field; 6] {
        [
            Field::Conserved,
            Field::VertCoords,
            Field::CellCoords,
            Field::CellVolume,
            Field::FaceAreaI,
            Field::FaceAreaJ,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Conserved => "conserved",
            Field::VertCoords => "vert_coords",
            Field::CellCoords => "cell_coords",
            Field::CellVolume => "cell_volume",
            Field::FaceAreaI => "face_area_i",
            Field::FaceAreaJ => "face_area_j",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::all().into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.name())
    }
}




/**
 * Identifies the part of the mesh where a field's data resides: cell
 * centers, cell vertices, or one of the two face families. The array extent
 * is one larger than the cell count on each node-like axis.
 */
#[derive(Clone, Copy, Debug)]
pub enum MeshLocation {
    Cell,
    Vert,
    FaceI,
    FaceJ,
}




// ============================================================================
impl MeshLocation {

    /// Whether the i and j axes of this location are node-like.
    ///
    pub fn node_like(self) -> (bool, bool) {
        match self {
            MeshLocation::Cell => (false, false),
            MeshLocation::Vert => (true, true),
            MeshLocation::FaceI => (true, false),
            MeshLocation::FaceJ => (false, true),
        }
    }
}




/**
 * The component count and mesh location of one field.
 */
#[derive(Clone, Copy, Debug)]
pub struct FieldDescriptor {
    pub num_fields: usize,
    pub location: MeshLocation,
}

impl FieldDescriptor {
    pub fn new(num_fields: usize, location: MeshLocation) -> Self {
        Self {
            num_fields,
            location,
        }
    }
}




/// Position of a patch in the block decomposition: the radial shell number,
/// a reserved middle coordinate, and the polar position within the shell.
///
pub type BlockIndex = (i64, i64, i64);

/// A block position paired with a field: the key to one stored array.
///
pub type PatchIndex = (BlockIndex, Field);




/**
 * One of the four edges of a patch: inner/outer radial, lower/upper polar.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchBoundary {
    Il,
    Ir,
    Jl,
    Jr,
}




/// The boundary-value policy: given the patch position, the edge in
/// question, the requested guard depth, and the patch data, produce the
/// guard-zone array for that edge. Shape (depth, nj, c) for i edges and
/// (ni, depth, c) for j edges.
///
pub type BoundaryValue = Box<dyn Fn(BlockIndex, PatchBoundary, usize, &Array) -> Array>;




/**
 * A patch-indexed store of the solution state and the mesh geometry. Every
 * patch has the same logical size; the field's mesh location fixes the array
 * extents. Conserved data is the only field rewritten after startup, through
 * `commit`. Guard-zone assembly (`fetch`) stitches neighboring patches
 * together and falls back to the installed boundary-value policy at the
 * domain edges.
 */
pub struct Database {
    ni: usize,
    nj: usize,
    header: BTreeMap<Field, FieldDescriptor>,
    patches: BTreeMap<PatchIndex, Array>,
    boundary_value: Option<BoundaryValue>,
}




// ============================================================================
impl Database {

    pub fn new(ni: usize, nj: usize, header: Vec<(Field, FieldDescriptor)>) -> Self {
        Self {
            ni,
            nj,
            header: header.into_iter().collect(),
            patches: BTreeMap::new(),
            boundary_value: None,
        }
    }

    pub fn patch_dim(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }

    fn descriptor(&self, field: Field) -> FieldDescriptor {
        *self
            .header
            .get(&field)
            .unwrap_or_else(|| panic!("field {} is not in the header", field))
    }

    /// The array shape required of the given field on any patch.
    ///
    pub fn expected_shape(&self, field: Field) -> (usize, usize, usize) {
        let desc = self.descriptor(field);
        let (node_i, node_j) = desc.location.node_like();
        (
            self.ni + node_i as usize,
            self.nj + node_j as usize,
            desc.num_fields,
        )
    }

    /// Install the boundary-value policy consulted by `fetch` at edges with
    /// no neighboring patch.
    ///
    pub fn set_boundary_value(&mut self, policy: BoundaryValue) {
        self.boundary_value = Some(policy);
    }

    /// Store an array under the given index. The shape must agree with the
    /// field's descriptor and the patch dimensions.
    ///
    pub fn insert(&mut self, index: PatchIndex, array: Array) {
        let expected = self.expected_shape(index.1);
        assert!(
            array.dim() == expected,
            "patch {:?}/{} has shape {:?}, expected {:?}",
            index.0,
            index.1,
            array.dim(),
            expected
        );
        self.patches.insert(index, array);
    }

    pub fn at(&self, block: BlockIndex, field: Field) -> &Array {
        self.patches
            .get(&(block, field))
            .unwrap_or_else(|| panic!("no patch {:?}/{}", block, field))
    }

    pub fn get(&self, block: BlockIndex, field: Field) -> Option<&Array> {
        self.patches.get(&(block, field))
    }

    pub fn contains(&self, block: BlockIndex, field: Field) -> bool {
        self.patches.contains_key(&(block, field))
    }

    /// Visit the patches holding the given field, in index order.
    ///
    pub fn all(&self, field: Field) -> impl Iterator<Item = (BlockIndex, &Array)> {
        self.patches
            .iter()
            .filter(move |((_, f), _)| *f == field)
            .map(|((block, _), array)| (*block, array))
    }

    /// The block indexes holding the given field, in index order.
    ///
    pub fn blocks(&self, field: Field) -> Vec<BlockIndex> {
        self.all(field).map(|(block, _)| block).collect()
    }

    /// Visit every stored patch, in index order.
    ///
    pub fn iter(&self) -> impl Iterator<Item = (&PatchIndex, &Array)> {
        self.patches.iter()
    }

    /// The total number of cells covered by patches of the given field.
    ///
    pub fn num_cells(&self, field: Field) -> usize {
        let (node_i, node_j) = self.descriptor(field).location.node_like();

        self.all(field)
            .map(|(_, array)| {
                (array.dim().0 - node_i as usize) * (array.dim().1 - node_j as usize)
            })
            .sum()
    }

    fn neighbor(&self, block: BlockIndex, edge: PatchBoundary) -> BlockIndex {
        let (b, i, j) = block;
        match edge {
            PatchBoundary::Il => (b - 1, i, j),
            PatchBoundary::Ir => (b + 1, i, j),
            PatchBoundary::Jl => (b, i, j - 1),
            PatchBoundary::Jr => (b, i, j + 1),
        }
    }

    fn guard_strip(&self, block: BlockIndex, edge: PatchBoundary, depth: usize, field: Field) -> Array {
        let patch = self.at(block, field);

        if let Some(neighbor) = self.get(self.neighbor(block, edge), field) {
            let (mi, mj, _) = neighbor.dim();
            match edge {
                PatchBoundary::Il => neighbor.take(Axis::I, span(mi - depth, mi)),
                PatchBoundary::Ir => neighbor.take(Axis::I, span(0, depth)),
                PatchBoundary::Jl => neighbor.take(Axis::J, span(mj - depth, mj)),
                PatchBoundary::Jr => neighbor.take(Axis::J, span(0, depth)),
            }
            .to_owned()
        } else {
            let policy = self
                .boundary_value
                .as_ref()
                .expect("no boundary-value policy is installed");
            policy(block, edge, depth, patch)
        }
    }

    /// Assemble a guard-padded copy of one patch: the patch data in the
    /// interior, plus `gi_lo` / `gi_hi` extra rows on the radial sides and
    /// `gj_lo` / `gj_hi` extra columns on the polar sides, filled from the
    /// adjacent patches where they exist and from the boundary-value policy
    /// where they do not. Guard corners are left zeroed.
    ///
    pub fn fetch(
        &self,
        block: BlockIndex,
        gi_lo: usize,
        gi_hi: usize,
        gj_lo: usize,
        gj_hi: usize,
        field: Field,
    ) -> Array {
        let patch = self.at(block, field);
        let (ni, nj, nk) = patch.dim();
        let mut res = Array::zeros((ni + gi_lo + gi_hi, nj + gj_lo + gj_hi, nk));

        res.select_mut(span(gi_lo, gi_lo + ni), span(gj_lo, gj_lo + nj), ALL)
            .assign(patch.view());

        if gi_lo > 0 {
            let strip = self.guard_strip(block, PatchBoundary::Il, gi_lo, field);
            res.select_mut(span(0, gi_lo), span(gj_lo, gj_lo + nj), ALL)
                .assign(strip.view());
        }
        if gi_hi > 0 {
            let strip = self.guard_strip(block, PatchBoundary::Ir, gi_hi, field);
            res.select_mut(span(gi_lo + ni, gi_lo + ni + gi_hi), span(gj_lo, gj_lo + nj), ALL)
                .assign(strip.view());
        }
        if gj_lo > 0 {
            let strip = self.guard_strip(block, PatchBoundary::Jl, gj_lo, field);
            res.select_mut(span(gi_lo, gi_lo + ni), span(0, gj_lo), ALL)
                .assign(strip.view());
        }
        if gj_hi > 0 {
            let strip = self.guard_strip(block, PatchBoundary::Jr, gj_hi, field);
            res.select_mut(span(gi_lo, gi_lo + ni), span(gj_lo + nj, gj_lo + nj + gj_hi), ALL)
                .assign(strip.view());
        }
        res
    }

    /// Blend a freshly computed array into the stored one:
    /// stored <- rk_factor * stored + (1 - rk_factor) * new. A factor of
    /// zero replaces the stored array outright.
    ///
    pub fn commit(&mut self, index: PatchIndex, new: Array, rk_factor: f64) {
        let stored = self
            .patches
            .get_mut(&index)
            .unwrap_or_else(|| panic!("commit to missing patch {:?}/{}", index.0, index.1));

        assert!(stored.dim() == new.dim(), "commit changes the patch shape");

        if rk_factor == 0.0 {
            *stored = new;
        } else {
            for (x, y) in stored.as_mut_slice().iter_mut().zip(new.as_slice()) {
                *x = rk_factor * *x + (1.0 - rk_factor) * y
            }
        }
    }

    /// Concatenate patches into one global array: radial shells
    /// `block_lo .. block_hi` along axis 0 and polar positions
    /// `j_lo .. j_hi` along axis 1, at middle coordinate `i0`. Node-like
    /// axes share their boundary rows between adjacent patches; the shared
    /// row appears once in the result.
    ///
    pub fn assemble(
        &self,
        block_lo: i64,
        block_hi: i64,
        j_lo: i64,
        j_hi: i64,
        i0: i64,
        field: Field,
    ) -> Array {
        let (pi, pj, nk) = self.expected_shape(field);
        let (node_i, node_j) = self.descriptor(field).location.node_like();
        let nb = (block_hi - block_lo) as usize;
        let nx = (j_hi - j_lo) as usize;

        let ti = nb * self.ni + node_i as usize;
        let tj = nx * self.nj + node_j as usize;
        let mut res = Array::zeros((ti, tj, nk));

        for (bn, b) in (block_lo..block_hi).enumerate() {
            for (xn, x) in (j_lo..j_hi).enumerate() {
                let patch = self.at((b, i0, x), field);
                let (ri, rj) = (bn * self.ni, xn * self.nj);
                res.select_mut(span(ri, ri + pi), span(rj, rj + pj), ALL)
                    .assign(patch.view());
            }
        }
        res
    }
}
