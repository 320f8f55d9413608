use super::Backend;

/// Pure-Rust CPU backend.
///
/// # Type mappings
/// - `Scalar`: `f64`
/// - `Tensor1D`: `Vec<f64>`
/// - `Tensor2D`: [`CpuTensor2D`], a row-major buffer with its shape
#[derive(Clone, Debug, Copy)]
pub struct CpuBackend;

/// Row-major 2D tensor: `(data, rows, cols)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTensor2D(pub Vec<f64>, pub usize, pub usize);

impl CpuTensor2D {
    /// Creates a tensor from row-major data.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        Self(data, rows, cols)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self(self.0.iter().map(|&x| f(x)).collect(), self.1, self.2)
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        assert_eq!(
            (self.1, self.2),
            (other.1, other.2),
            "Shape mismatch in element-wise op"
        );
        Self(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
            self.1,
            self.2,
        )
    }

    fn broadcast_rows(&self, v: &[f64], f: impl Fn(f64, f64) -> f64) -> Self {
        assert_eq!(v.len(), self.2, "Broadcast vector must match column count");
        if self.2 == 0 {
            return self.clone();
        }
        let data = self
            .0
            .chunks(self.2)
            .flat_map(|row| row.iter().zip(v.iter()).map(|(&a, &b)| f(a, b)))
            .collect::<Vec<_>>();
        Self(data, self.1, self.2)
    }

    fn fold_cols(&self, init: f64, f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
        let mut acc = vec![init; self.2];
        if self.2 == 0 {
            return acc;
        }
        for row in self.0.chunks(self.2) {
            for (a, &x) in acc.iter_mut().zip(row.iter()) {
                *a = f(*a, x);
            }
        }
        acc
    }
}

impl From<&[Vec<f64>]> for CpuTensor2D {
    fn from(x: &[Vec<f64>]) -> Self {
        if x.is_empty() {
            return CpuTensor2D::new(Vec::new(), 0, 0);
        }
        let rows = x.len();
        let cols = x[0].len();
        assert!(
            x.iter().all(|row| row.len() == cols),
            "All rows must have same length"
        );
        let data: Vec<f64> = x.iter().flat_map(|row| row.iter()).copied().collect();
        CpuTensor2D::new(data, rows, cols)
    }
}

impl Backend for CpuBackend {
    type Scalar = f64;
    type Tensor1D = Vec<f64>;
    type Tensor2D = CpuTensor2D;

    // --- Constructors ---
    fn zeros_1d(len: usize) -> Self::Tensor1D {
        vec![0.0; len]
    }

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(vec![0.0; rows * cols], rows, cols)
    }

    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D {
        data
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(data, rows, cols)
    }

    // --- Element-wise ops (1D) ---
    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a.iter().zip(b.iter()).map(|(a, b)| a + b).collect()
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a.iter().zip(b.iter()).map(|(a, b)| a - b).collect()
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a.iter().zip(b.iter()).map(|(a, b)| a * b).collect()
    }

    fn div_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a.iter().zip(b.iter()).map(|(a, b)| a / b).collect()
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t.iter().map(|x| x * s).collect()
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t.iter().map(|x| x + s).collect()
    }

    fn sqrt_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter().map(|x| x.sqrt()).collect()
    }

    // --- Element-wise ops (2D) ---
    fn add_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        a.zip_with(b, |x, y| x + y)
    }

    fn sub_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        a.zip_with(b, |x, y| x - y)
    }

    fn mul_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        a.zip_with(b, |x, y| x * y)
    }

    fn div_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        a.zip_with(b, |x, y| x / y)
    }

    fn mul_scalar_2d(t: &Self::Tensor2D, s: &Self::Scalar) -> Self::Tensor2D {
        t.map(|x| x * s)
    }

    fn add_scalar_2d(t: &Self::Tensor2D, s: &Self::Scalar) -> Self::Tensor2D {
        t.map(|x| x + s)
    }

    fn sqrt_2d(t: &Self::Tensor2D) -> Self::Tensor2D {
        t.map(f64::sqrt)
    }

    fn abs_2d(t: &Self::Tensor2D) -> Self::Tensor2D {
        t.map(f64::abs)
    }

    fn sign_2d(t: &Self::Tensor2D) -> Self::Tensor2D {
        t.map(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
    }

    // --- Reductions ---
    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.iter().sum::<f64>()
    }

    fn sum_all_2d(t: &Self::Tensor2D) -> Self::Scalar {
        t.0.iter().sum::<f64>()
    }

    fn mean_all_2d(t: &Self::Tensor2D) -> Self::Scalar {
        t.0.iter().sum::<f64>() / t.0.len() as f64
    }

    fn scalar_f64(value: f64) -> Self::Scalar {
        value
    }

    // --- Access ---
    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64> {
        t.clone()
    }

    fn to_vec_2d(t: &Self::Tensor2D) -> Vec<f64> {
        t.0.clone()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        (t.1, t.2)
    }

    // --- Linear algebra ---
    fn matmul(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        let (m, k) = (a.1, a.2);
        let (k2, n) = (b.1, b.2);
        assert_eq!(k, k2, "Matmul inner dimensions must agree");
        let mut out = vec![0.0; m * n];
        for i in 0..m {
            for p in 0..k {
                let a_ip = a.0[i * k + p];
                if a_ip == 0.0 {
                    continue;
                }
                let b_row = &b.0[p * n..(p + 1) * n];
                let out_row = &mut out[i * n..(i + 1) * n];
                for (o, &b_pj) in out_row.iter_mut().zip(b_row.iter()) {
                    *o += a_ip * b_pj;
                }
            }
        }
        CpuTensor2D::new(out, m, n)
    }

    fn transpose(t: &Self::Tensor2D) -> Self::Tensor2D {
        let (rows, cols) = (t.1, t.2);
        let mut out = vec![0.0; rows * cols];
        for i in 0..rows {
            for j in 0..cols {
                out[j * rows + i] = t.0[i * cols + j];
            }
        }
        CpuTensor2D::new(out, cols, rows)
    }

    // --- Column-wise ---
    fn col_min_2d(t: &Self::Tensor2D) -> Self::Tensor1D {
        t.fold_cols(f64::INFINITY, f64::min)
    }

    fn col_max_2d(t: &Self::Tensor2D) -> Self::Tensor1D {
        t.fold_cols(f64::NEG_INFINITY, f64::max)
    }

    fn col_sum_2d(t: &Self::Tensor2D) -> Self::Tensor1D {
        t.fold_cols(0.0, |a, x| a + x)
    }

    // --- Broadcasting ---
    fn broadcast_add_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D {
        t.broadcast_rows(v, |a, b| a + b)
    }

    fn broadcast_sub_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D {
        t.broadcast_rows(v, |a, b| a - b)
    }

    fn broadcast_mul_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D {
        t.broadcast_rows(v, |a, b| a * b)
    }

    fn broadcast_div_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D {
        t.broadcast_rows(v, |a, b| a / b)
    }
}
