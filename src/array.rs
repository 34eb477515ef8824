use core::ops::{Add, Index, IndexMut, Sub};




/**
 * Identifier for one of the three array axes. Axis `K` is the trailing
 * (component) axis; `I` and `J` index mesh rows and columns.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    I,
    J,
    K,
}




/**
 * A half-open window `[lo, hi)` on one axis, or the whole axis.
 */
#[derive(Clone, Copy, Debug)]
pub enum AxisRange {
    All,
    Span(usize, usize),
}

pub const ALL: AxisRange = AxisRange::All;

/// Less imposing factory function to construct a half-open axis window.
///
pub fn span(lo: usize, hi: usize) -> AxisRange {
    AxisRange::Span(lo, hi)
}

impl AxisRange {
    fn resolve(self, extent: usize) -> (usize, usize) {
        match self {
            AxisRange::All => (0, extent),
            AxisRange::Span(lo, hi) => {
                assert!(
                    lo <= hi && hi <= extent,
                    "axis range {}..{} out of bounds for extent {}",
                    lo,
                    hi,
                    extent
                );
                (lo, hi - lo)
            }
        }
    }
}




/**
 * An owned, dense, row-major rank-3 array of f64. The trailing axis holds the
 * per-zone components (5 for conserved data, 2 for coordinates, 1 for
 * volumes and areas). Windows into the array are `ArrayView` /
 * `ArrayViewMut`; writes go through the explicit `assign` and `fill` methods
 * on the mutable view, never through rebinding.
 */
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Array {
    dim: (usize, usize, usize),
    data: Vec<f64>,
}




// ============================================================================
impl Array {

    /// Create an array of zeros with the given shape.
    ///
    pub fn zeros(dim: (usize, usize, usize)) -> Self {
        Self {
            dim,
            data: vec![0.0; dim.0 * dim.1 * dim.2],
        }
    }

    /// Wrap a row-major buffer whose length matches the given shape.
    ///
    pub fn from_shape_vec(dim: (usize, usize, usize), data: Vec<f64>) -> Self {
        assert!(
            data.len() == dim.0 * dim.1 * dim.2,
            "buffer of length {} does not fill an array of shape {:?}",
            data.len(),
            dim
        );
        Self { dim, data }
    }

    /// Create an array with values defined from a closure of the index.
    ///
    pub fn from_fn<F>(dim: (usize, usize, usize), mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(dim.0 * dim.1 * dim.2);

        for i in 0..dim.0 {
            for j in 0..dim.1 {
                for k in 0..dim.2 {
                    data.push(f(i, j, k))
                }
            }
        }
        Self { dim, data }
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.dim
    }

    pub fn shape(&self, axis: Axis) -> usize {
        match axis {
            Axis::I => self.dim.0,
            Axis::J => self.dim.1,
            Axis::K => self.dim.2,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Return a view of the whole array.
    ///
    pub fn view(&self) -> ArrayView {
        ArrayView {
            data: &self.data,
            start: (0, 0, 0),
            dim: self.dim,
            stride: (self.dim.1 * self.dim.2, self.dim.2),
        }
    }

    pub fn view_mut(&mut self) -> ArrayViewMut {
        ArrayViewMut {
            start: (0, 0, 0),
            dim: self.dim,
            stride: (self.dim.1 * self.dim.2, self.dim.2),
            data: &mut self.data,
        }
    }

    /// Return a view narrowed on all three axes.
    ///
    pub fn select(&self, ri: AxisRange, rj: AxisRange, rk: AxisRange) -> ArrayView {
        self.view().select(ri, rj, rk)
    }

    pub fn select_mut(&mut self, ri: AxisRange, rj: AxisRange, rk: AxisRange) -> ArrayViewMut {
        self.view_mut().select(ri, rj, rk)
    }

    /// Return a view narrowed on a single axis.
    ///
    pub fn take(&self, axis: Axis, range: AxisRange) -> ArrayView {
        match axis {
            Axis::I => self.select(range, ALL, ALL),
            Axis::J => self.select(ALL, range, ALL),
            Axis::K => self.select(ALL, ALL, range),
        }
    }
}

impl Index<(usize, usize, usize)> for Array {
    type Output = f64;

    fn index(&self, index: (usize, usize, usize)) -> &f64 {
        let (i, j, k) = index;
        &self.data[(i * self.dim.1 + j) * self.dim.2 + k]
    }
}

impl IndexMut<(usize, usize, usize)> for Array {
    fn index_mut(&mut self, index: (usize, usize, usize)) -> &mut f64 {
        let (i, j, k) = index;
        &mut self.data[(i * self.dim.1 + j) * self.dim.2 + k]
    }
}




/**
 * A non-owning window into an `Array`: per-axis start and count over the
 * owner's row-major strides. Creating one is O(1) and copying it is free.
 */
#[derive(Clone, Copy)]
pub struct ArrayView<'a> {
    data: &'a [f64],
    start: (usize, usize, usize),
    dim: (usize, usize, usize),
    stride: (usize, usize),
}




// ============================================================================
impl<'a> ArrayView<'a> {

    pub fn dim(&self) -> (usize, usize, usize) {
        self.dim
    }

    pub fn shape(&self, axis: Axis) -> usize {
        match axis {
            Axis::I => self.dim.0,
            Axis::J => self.dim.1,
            Axis::K => self.dim.2,
        }
    }

    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        (self.start.0 + i) * self.stride.0 + (self.start.1 + j) * self.stride.1 + self.start.2 + k
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.offset(i, j, k)]
    }

    /// Narrow this view on all three axes. Ranges are relative to the view.
    ///
    pub fn select(&self, ri: AxisRange, rj: AxisRange, rk: AxisRange) -> ArrayView<'a> {
        let (i0, ni) = ri.resolve(self.dim.0);
        let (j0, nj) = rj.resolve(self.dim.1);
        let (k0, nk) = rk.resolve(self.dim.2);

        ArrayView {
            data: self.data,
            start: (self.start.0 + i0, self.start.1 + j0, self.start.2 + k0),
            dim: (ni, nj, nk),
            stride: self.stride,
        }
    }

    pub fn take(&self, axis: Axis, range: AxisRange) -> ArrayView<'a> {
        match axis {
            Axis::I => self.select(range, ALL, ALL),
            Axis::J => self.select(ALL, range, ALL),
            Axis::K => self.select(ALL, ALL, range),
        }
    }

    /// Iterate the window in row-major order.
    ///
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (ni, nj, nk) = self.dim;
        (0..ni).flat_map(move |i| {
            (0..nj).flat_map(move |j| (0..nk).map(move |k| self.get(i, j, k)))
        })
    }

    /// Copy the window into a new owned array.
    ///
    pub fn to_owned(&self) -> Array {
        Array::from_shape_vec(self.dim, self.iter().collect())
    }
}

impl<'a> From<&'a Array> for ArrayView<'a> {
    fn from(array: &'a Array) -> Self {
        array.view()
    }
}




/**
 * A mutable window into an `Array`. Assignment through the window writes to
 * the owner's storage. A source axis of extent 1 broadcasts over the
 * destination axis.
 */
pub struct ArrayViewMut<'a> {
    data: &'a mut [f64],
    start: (usize, usize, usize),
    dim: (usize, usize, usize),
    stride: (usize, usize),
}




// ============================================================================
impl<'a> ArrayViewMut<'a> {

    pub fn dim(&self) -> (usize, usize, usize) {
        self.dim
    }

    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        (self.start.0 + i) * self.stride.0 + (self.start.1 + j) * self.stride.1 + self.start.2 + k
    }

    pub fn select(self, ri: AxisRange, rj: AxisRange, rk: AxisRange) -> ArrayViewMut<'a> {
        let (i0, ni) = ri.resolve(self.dim.0);
        let (j0, nj) = rj.resolve(self.dim.1);
        let (k0, nk) = rk.resolve(self.dim.2);

        ArrayViewMut {
            data: self.data,
            start: (self.start.0 + i0, self.start.1 + j0, self.start.2 + k0),
            dim: (ni, nj, nk),
            stride: self.stride,
        }
    }

    pub fn fill(&mut self, value: f64) {
        let (ni, nj, nk) = self.dim;

        for i in 0..ni {
            for j in 0..nj {
                for k in 0..nk {
                    let n = self.offset(i, j, k);
                    self.data[n] = value
                }
            }
        }
    }

    /// Assign the source window elementwise into this one. Shapes must agree
    /// on each axis, except that a source extent of 1 broadcasts.
    ///
    pub fn assign(&mut self, source: ArrayView) {
        let (ni, nj, nk) = self.dim;
        let (si, sj, sk) = source.dim();

        assert!(
            (si == ni || si == 1) && (sj == nj || sj == 1) && (sk == nk || sk == 1),
            "cannot assign from shape {:?} into shape {:?}",
            source.dim(),
            self.dim
        );

        for i in 0..ni {
            for j in 0..nj {
                for k in 0..nk {
                    let n = self.offset(i, j, k);
                    self.data[n] = source.get(
                        if si == 1 { 0 } else { i },
                        if sj == 1 { 0 } else { j },
                        if sk == 1 { 0 } else { k },
                    )
                }
            }
        }
    }
}




// ============================================================================
fn assert_same_shape(a: (usize, usize, usize), b: (usize, usize, usize)) {
    assert!(a == b, "shapes {:?} and {:?} do not conform", a, b);
}

impl Add for ArrayView<'_> {
    type Output = Array;

    fn add(self, other: Self) -> Array {
        assert_same_shape(self.dim(), other.dim());
        Array::from_shape_vec(
            self.dim(),
            self.iter().zip(other.iter()).map(|(x, y)| x + y).collect(),
        )
    }
}

impl Sub for ArrayView<'_> {
    type Output = Array;

    fn sub(self, other: Self) -> Array {
        assert_same_shape(self.dim(), other.dim());
        Array::from_shape_vec(
            self.dim(),
            self.iter().zip(other.iter()).map(|(x, y)| x - y).collect(),
        )
    }
}

impl Add for Array {
    type Output = Array;

    fn add(mut self, other: Array) -> Array {
        assert_same_shape(self.dim(), other.dim());

        for (x, y) in self.data.iter_mut().zip(other.data.iter()) {
            *x += y
        }
        self
    }
}

impl Sub for Array {
    type Output = Array;

    fn sub(mut self, other: Array) -> Array {
        assert_same_shape(self.dim(), other.dim());

        for (x, y) in self.data.iter_mut().zip(other.data.iter()) {
            *x -= y
        }
        self
    }
}

impl Add<Array> for ArrayView<'_> {
    type Output = Array;

    fn add(self, mut other: Array) -> Array {
        assert_same_shape(self.dim(), other.dim());

        for (y, x) in other.data.iter_mut().zip(self.iter()) {
            *y += x
        }
        other
    }
}




// ============================================================================
#[cfg(test)]
mod test {
    use super::*;

    fn iota(dim: (usize, usize, usize)) -> Array {
        let mut n = 0.0;
        Array::from_fn(dim, |_, _, _| {
            n += 1.0;
            n - 1.0
        })
    }

    #[test]
    fn selection_views_the_expected_window() {
        let a = iota((4, 3, 2));
        let v = a.select(span(1, 3), span(0, 2), ALL);

        assert_eq!(v.dim(), (2, 2, 2));
        assert_eq!(v.get(0, 0, 0), a[(1, 0, 0)]);
        assert_eq!(v.get(1, 1, 1), a[(2, 1, 1)]);
        assert_eq!(v.to_owned().dim(), (2, 2, 2));
    }

    #[test]
    fn nested_selection_composes() {
        let a = iota((6, 4, 5));
        let v = a.select(span(1, 5), ALL, span(0, 3)).select(span(2, 4), span(1, 3), ALL);

        assert_eq!(v.dim(), (2, 2, 3));
        assert_eq!(v.get(0, 0, 0), a[(3, 1, 0)]);
        assert_eq!(v.get(1, 1, 2), a[(4, 2, 2)]);
    }

    #[test]
    fn assignment_writes_through_to_the_owner() {
        let src = iota((2, 3, 2));
        let mut a = Array::zeros((4, 3, 2));

        a.select_mut(span(1, 3), ALL, ALL).assign(src.view());

        assert_eq!(a[(0, 0, 0)], 0.0);
        assert_eq!(a[(1, 0, 0)], src[(0, 0, 0)]);
        assert_eq!(a[(2, 2, 1)], src[(1, 2, 1)]);
    }

    #[test]
    fn assignment_broadcasts_unit_axes() {
        let src = Array::from_fn((1, 3, 1), |_, j, _| j as f64);
        let mut a = Array::zeros((2, 3, 2));

        a.view_mut().assign(src.view());

        assert_eq!(a[(0, 2, 0)], 2.0);
        assert_eq!(a[(1, 2, 1)], 2.0);
        assert_eq!(a[(1, 0, 1)], 0.0);
    }

    #[test]
    #[should_panic]
    fn assignment_of_nonconforming_shapes_panics() {
        let src = iota((2, 2, 2));
        let mut a = Array::zeros((4, 3, 2));
        a.view_mut().assign(src.view());
    }

    #[test]
    fn elementwise_add_and_sub() {
        let a = iota((3, 2, 2));
        let b = iota((3, 2, 2));
        let c = a.view() + b.view();
        let d = c.view() - a.view();

        assert_eq!(c[(2, 1, 1)], 2.0 * a[(2, 1, 1)]);
        assert_eq!(d, b);
    }

    #[test]
    fn take_narrows_one_axis() {
        let a = iota((5, 4, 3));
        let v = a.take(Axis::J, span(1, 3));

        assert_eq!(v.dim(), (5, 2, 3));
        assert_eq!(v.get(4, 0, 2), a[(4, 1, 2)]);
    }
}
