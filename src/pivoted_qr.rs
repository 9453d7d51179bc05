//! This module computes QR with column pivoting by calling into the
//! corresponding Lapack routine. Pivoted QR is currently not
//! implemented in ndarray-linalg, making this module necessary.
//!
//! Only the absolute diagonal of R is kept. For $AP = QR$ the diagonal
//! satisfies $|r_{11}|\geq |r_{22}|\geq \dots$, which makes it a cheap rank
//! revealing alternative to the singular values.

use crate::types::Result;
use ndarray::{Array1, ArrayBase, Data, Ix2};

pub trait PivotedQR {
    type A;

    /// Absolute values of the diagonal of R in the pivoted QR of `self`.
    fn pivoted_r_diag(&self) -> Result<Array1<Self::A>>;
}

impl<A, S> PivotedQR for ArrayBase<S, Ix2>
where
    A: imp::PivotedQRImpl,
    S: Data<Elem = A>,
{
    type A = A;

    fn pivoted_r_diag(&self) -> Result<Array1<A>> {
        let m = self.nrows();
        let n = self.ncols();

        if m == 0 || n == 0 {
            return Ok(Array1::zeros(0));
        }

        // Lapack expects column major storage.
        let mut data: Vec<A> = self.t().iter().cloned().collect();
        A::pivoted_r_diag_impl(&mut data, m, n)
    }
}

mod imp {

    use crate::types::{PowerSpectrumError, Result};
    use ndarray::Array1;

    pub trait PivotedQRImpl: ndarray::LinalgScalar {
        fn pivoted_r_diag_impl(data: &mut [Self], m: usize, n: usize) -> Result<Array1<Self>>;
    }

    macro_rules! impl_qr_pivot {
        ($scalar:ty, $qrf:path) => {
            impl PivotedQRImpl for $scalar {
                fn pivoted_r_diag_impl(
                    data: &mut [Self],
                    m: usize,
                    n: usize,
                ) -> Result<Array1<Self>> {
                    let k = m.min(n);
                    let mut tau = vec![0.0 as $scalar; k];
                    let mut jpvt = vec![0i32; n];
                    let mut info = 0;
                    let mut work_size = [0.0 as $scalar];

                    unsafe {
                        $qrf(
                            m as i32,
                            n as i32,
                            data,
                            m as i32,
                            &mut jpvt,
                            &mut tau,
                            &mut work_size,
                            -1,
                            &mut info,
                        );
                    }

                    if info != 0 {
                        return Err(PowerSpectrumError::PivotedQRError(info));
                    }

                    let lwork = work_size[0] as usize;
                    let mut work = vec![0.0 as $scalar; lwork.max(1)];
                    unsafe {
                        $qrf(
                            m as i32,
                            n as i32,
                            data,
                            m as i32,
                            &mut jpvt,
                            &mut tau,
                            &mut work,
                            lwork.max(1) as i32,
                            &mut info,
                        );
                    }

                    if info != 0 {
                        return Err(PowerSpectrumError::PivotedQRError(info));
                    }

                    Ok(Array1::from_iter((0..k).map(|i| data[i + i * m].abs())))
                }
            }
        };
    }

    impl_qr_pivot!(f64, lapack::dgeqp3);
    impl_qr_pivot!(f32, lapack::sgeqp3);
}
