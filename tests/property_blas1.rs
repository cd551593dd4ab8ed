//! Property-based tests for the BLAS level-1 routines
//!
//! Algebraic laws that must hold regardless of size, stride, or data, checked
//! against the device dispatch path with proptest.

use proptest::prelude::*;

use escalar::validate::{compare_scalars, compare_vectors, F32_ELEMENTWISE_MARGIN};
use escalar::{reference, Executor};

/// (n, incx, buffer) with buffer exactly (n-1)*incx + 1 long
fn vector_strategy() -> impl Strategy<Value = (usize, usize, Vec<f32>)> {
    (1usize..48, 1usize..5).prop_flat_map(|(n, incx)| {
        let len = (n - 1) * incx + 1;
        prop::collection::vec(-100.0f32..100.0, len..=len)
            .prop_map(move |buffer| (n, incx, buffer))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Device scal agrees with the reference kernel.
    #[test]
    fn scal_matches_reference((n, incx, host) in vector_strategy(), alpha in -4.0f32..4.0) {
        let mut expected = host.clone();
        reference::scal(n, alpha, &mut expected, incx);

        let ex = Executor::auto().unwrap();
        let x = ex.alloc_from_host(&host).unwrap();
        ex.scal(n, alpha, &x, incx).unwrap();
        let result = ex.read_back(&x).unwrap().wait().unwrap();
        ex.wait_all().unwrap();

        prop_assert!(compare_vectors(&result, &expected, F32_ELEMENTWISE_MARGIN));
    }

    /// scal(1.0) is the identity, bit for bit.
    #[test]
    fn scal_one_is_identity((n, incx, host) in vector_strategy()) {
        let ex = Executor::auto().unwrap();
        let x = ex.alloc_from_host(&host).unwrap();
        ex.scal(n, 1.0, &x, incx).unwrap();
        let result = ex.read_back(&x).unwrap().wait().unwrap();
        ex.wait_all().unwrap();

        prop_assert_eq!(result, host);
    }

    /// scal(0.0) zeroes every logical element and touches nothing else.
    #[test]
    fn scal_zero_zeroes_logical_elements((n, incx, host) in vector_strategy()) {
        let ex = Executor::auto().unwrap();
        let x = ex.alloc_from_host(&host).unwrap();
        ex.scal(n, 0.0, &x, incx).unwrap();
        let result = ex.read_back(&x).unwrap().wait().unwrap();
        ex.wait_all().unwrap();

        for (i, (&got, &orig)) in result.iter().zip(host.iter()).enumerate() {
            if i % incx == 0 && i / incx < n {
                prop_assert_eq!(got, 0.0, "logical element at flat index {} not zeroed", i);
            } else {
                prop_assert_eq!(got, orig, "gap element at flat index {} modified", i);
            }
        }
    }

    /// scal(a) then scal(b) equals scal(a*b) within the element-wise margin.
    #[test]
    fn scal_composes(
        (n, incx, host) in vector_strategy(),
        a in -2.0f32..2.0,
        b in -2.0f32..2.0,
    ) {
        let ex = Executor::auto().unwrap();

        let stepwise = ex.alloc_from_host(&host).unwrap();
        ex.scal(n, a, &stepwise, incx).unwrap();
        ex.scal(n, b, &stepwise, incx).unwrap();
        let two_steps = ex.read_back(&stepwise).unwrap().wait().unwrap();

        let fused = ex.alloc_from_host(&host).unwrap();
        ex.scal(n, a * b, &fused, incx).unwrap();
        let one_step = ex.read_back(&fused).unwrap().wait().unwrap();
        ex.wait_all().unwrap();

        prop_assert!(compare_vectors(&two_steps, &one_step, F32_ELEMENTWISE_MARGIN));
    }

    /// axpy with alpha = 0 leaves y unchanged.
    #[test]
    fn axpy_zero_alpha_is_identity((n, incx, host) in vector_strategy()) {
        let ex = Executor::auto().unwrap();
        let x = ex.alloc_from_host(&host).unwrap();
        let y = ex.alloc_from_host(&host).unwrap();
        ex.axpy(n, 0.0, &x, incx, &y, incx).unwrap();
        let result = ex.read_back(&y).unwrap().wait().unwrap();
        ex.wait_all().unwrap();

        prop_assert_eq!(result, host);
    }

    /// dot is symmetric: dot(x, y) == dot(y, x).
    #[test]
    fn dot_is_symmetric((n, incx, x_host) in vector_strategy(), seed in any::<u64>()) {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(seed);
        let y_host: Vec<f32> = (0..x_host.len()).map(|_| rng.gen_range(-10.0f32..10.0)).collect();

        let ex = Executor::auto().unwrap();
        let x = ex.alloc_from_host(&x_host).unwrap();
        let y = ex.alloc_from_host(&y_host).unwrap();
        let xy = ex.dot(n, &x, incx, &y, incx).unwrap().wait().unwrap();
        let yx = ex.dot(n, &y, incx, &x, incx).unwrap().wait().unwrap();
        ex.wait_all().unwrap();

        prop_assert_eq!(xy, yx);
    }

    /// nrm2 squared agrees with dot(x, x) computed by the reference.
    #[test]
    fn nrm2_consistent_with_self_dot((n, incx, host) in vector_strategy()) {
        let expected = reference::dot(n, &host, incx, &host, incx).sqrt();

        let ex = Executor::auto().unwrap();
        let x = ex.alloc_from_host(&host).unwrap();
        let got = ex.nrm2(n, &x, incx).unwrap().wait().unwrap();
        ex.wait_all().unwrap();

        prop_assert!(
            compare_scalars(got, expected, 1e-3),
            "nrm2 {} vs sqrt(dot) {}",
            got,
            expected
        );
    }
}
