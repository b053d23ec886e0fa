//! End-to-end scaling tests
//!
//! Every test goes through the public entry points (`scale_f32`, `scale_f64`,
//! `dispatch`, `launch`) and checks results bit-for-bit against a direct
//! multiply.

use proptest::prelude::*;
use trueno_scal::{
    dispatch, launch, scale_f32, scale_f64, Partition, Precision, ScalConfig, ScalError,
    ScaleOp, Scalar, VectorMut, VectorRef,
};

const PROPTEST_CASES: u32 = 50;

fn bits32(v: &[f32]) -> Vec<u32> {
    v.iter().map(|x| x.to_bits()).collect()
}

fn bits64(v: &[f64]) -> Vec<u64> {
    v.iter().map(|x| x.to_bits()).collect()
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_ten_elements_four_workers() {
    let config = ScalConfig::new().with_workers(4);
    let x: Vec<f32> = (0..10).map(|i| i as f32).collect();
    let mut y = vec![0.0f32; 10];

    let report = scale_f32(&config, 2.0, &x, &mut y).expect("scale should succeed");

    let counts: Vec<usize> = report.workers.iter().map(|w| w.partition.local_count).collect();
    let offsets: Vec<usize> = report.workers.iter().map(|w| w.partition.start_offset).collect();
    assert_eq!(counts, vec![3, 3, 2, 2]);
    assert_eq!(offsets, vec![0, 3, 6, 8]);
    assert_eq!(y, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0]);
}

#[test]
fn test_empty_vector() {
    let config = ScalConfig::new().with_workers(4);
    let x: [f32; 0] = [];
    let mut y: [f32; 0] = [];

    let report = scale_f32(&config, 2.0, &x, &mut y).expect("empty scale should succeed");

    assert_eq!(report.workers.len(), 4);
    assert!(report.workers.iter().all(|w| w.partition.local_count == 0));
    assert_eq!(report.transfers(), 0);
    assert_eq!(report.active_workers(), 0);
}

#[test]
fn test_workers_touch_only_their_partition() {
    let config = ScalConfig::new().with_workers(3).with_chunk(4);
    let x: Vec<f64> = (1..=11i32).map(f64::from).collect();
    let mut y = vec![0.0f64; 11];

    let report = scale_f64(&config, 1.0, &x, &mut y).expect("scale should succeed");

    for w in &report.workers {
        let expected = Partition::for_worker(11, 3, w.worker_id()).expect("valid worker");
        assert_eq!(w.partition, expected);
        let per_chunk = w.partition.local_count / 4 + usize::from(w.partition.local_count % 4 != 0);
        assert_eq!(w.transfers_in, per_chunk);
        assert_eq!(w.transfers_out, per_chunk);
    }
    assert_eq!(y, x);
}

#[test]
fn test_multi_chunk_partitions() {
    // 3 workers x (2 full chunks + tail of 5)
    let config = ScalConfig::new().with_workers(3).with_chunk(16);
    let x: Vec<f32> = (0..111).map(|i| i as f32 * 0.5 - 20.0).collect();
    let mut y = vec![0.0f32; 111];

    let report = scale_f32(&config, 1.5, &x, &mut y).expect("scale should succeed");

    for w in &report.workers {
        assert_eq!(w.full_chunks, 2);
        assert_eq!(w.tail_len, 5);
    }
    let expected: Vec<f32> = x.iter().map(|v| v * 1.5).collect();
    assert_eq!(bits32(&y), bits32(&expected));
}

#[test]
fn test_special_values_propagate() {
    let config = ScalConfig::new().with_workers(2);
    let x = [f32::INFINITY, f32::NEG_INFINITY, f32::NAN, 0.0, -0.0, f32::MIN_POSITIVE];
    let mut y = [0.0f32; 6];

    scale_f32(&config, -2.0, &x, &mut y).expect("scale should succeed");

    let expected: Vec<f32> = x.iter().map(|v| v * -2.0).collect();
    assert_eq!(bits32(&y), bits32(&expected));
}

#[test]
fn test_alpha_zero_and_one() {
    let config = ScalConfig::new().with_workers(5);
    let x: Vec<f64> = (0..37i32).map(|i| f64::from(i) - 18.0).collect();
    let mut y = vec![9.0f64; 37];

    scale_f64(&config, 1.0, &x, &mut y).expect("scale should succeed");
    assert_eq!(y, x);

    scale_f64(&config, 0.0, &x, &mut y).expect("scale should succeed");
    assert_eq!(bits64(&y), bits64(&x.iter().map(|v| v * 0.0).collect::<Vec<_>>()));
}

// ============================================================================
// DISPATCH
// ============================================================================

#[test]
fn test_dispatch_resolves_integer_alpha() {
    let x = [1.5f32, 2.5, -3.5];
    let mut y = [0.0f32; 3];
    let op = ScaleOp::new(VectorRef::F32(&x), VectorMut::F32(&mut y), Scalar::I32(-4));

    let report = dispatch(op, &ScalConfig::new()).expect("dispatch should succeed");

    assert_eq!(report.precision, Precision::Single);
    assert_eq!(y, [-6.0, -10.0, 14.0]);
}

#[test]
fn test_dispatch_rejects_large_integer_for_single() {
    let x = [1.0f32];
    let mut y = [0.0f32];
    let op = ScaleOp::new(VectorRef::F32(&x), VectorMut::F32(&mut y), 16_777_217);

    assert!(matches!(
        dispatch(op, &ScalConfig::new()),
        Err(ScalError::ScalarNotRepresentable { precision: Precision::Single, .. })
    ));
}

#[test]
fn test_dispatch_double_accepts_any_integer() {
    let x = [1.0f64, -1.0];
    let mut y = [0.0f64; 2];
    let op = ScaleOp::new(VectorRef::F64(&x), VectorMut::F64(&mut y), i32::MIN);

    dispatch(op, &ScalConfig::new()).expect("dispatch should succeed");

    assert_eq!(y, [f64::from(i32::MIN), -f64::from(i32::MIN)]);
}

#[test]
fn test_dispatch_zero_count_is_noop() {
    let x = [1.0f64; 8];
    let mut y = [5.0f64; 8];
    let op = ScaleOp::new(VectorRef::F64(&x), VectorMut::F64(&mut y), 2.0f64).with_count(0);

    let report = dispatch(op, &ScalConfig::new().with_workers(4)).expect("dispatch should succeed");

    assert_eq!(report.transfers(), 0);
    assert_eq!(y, [5.0; 8]);
}

#[test]
fn test_launch_rejects_bad_chunk() {
    let config = ScalConfig::new().with_chunk_f32(10);
    let mut y = [0.0f32; 4];
    assert!(matches!(
        launch(&config, 1.0f32, &[1.0; 4], &mut y),
        Err(ScalError::InvalidConfig(_))
    ));
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    /// y[i] == alpha * x[i] bit-for-bit, any population, any chunk
    #[test]
    fn prop_scale_correct_f32(
        x in prop::collection::vec(-1e20f32..1e20, 0..300),
        alpha in -1e10f32..1e10,
        workers in 1usize..17,
        chunk_groups in 1usize..9,
    ) {
        let config = ScalConfig::new().with_workers(workers).with_chunk(chunk_groups * 4);
        let mut y = vec![0.0f32; x.len()];

        let report = scale_f32(&config, alpha, &x, &mut y).unwrap();

        let expected: Vec<f32> = x.iter().map(|v| v * alpha).collect();
        prop_assert_eq!(bits32(&y), bits32(&expected));
        prop_assert_eq!(report.elements(), x.len());
    }

    #[test]
    fn prop_scale_correct_f64(
        x in prop::collection::vec(-1e200f64..1e200, 0..300),
        alpha in -1e50f64..1e50,
        workers in 1usize..17,
    ) {
        let config = ScalConfig::new().with_workers(workers).with_chunk_f64(8);
        let mut y = vec![0.0f64; x.len()];

        scale_f64(&config, alpha, &x, &mut y).unwrap();

        let expected: Vec<f64> = x.iter().map(|v| v * alpha).collect();
        prop_assert_eq!(bits64(&y), bits64(&expected));
    }

    /// Running twice with the same inputs writes the same bits
    #[test]
    fn prop_rerun_is_idempotent(
        x in prop::collection::vec(-1e6f32..1e6, 0..200),
        alpha in -100.0f32..100.0,
    ) {
        let config = ScalConfig::new().with_workers(6).with_chunk(8);
        let mut first = vec![0.0f32; x.len()];
        let mut second = vec![1.0f32; x.len()];

        scale_f32(&config, alpha, &x, &mut first).unwrap();
        scale_f32(&config, alpha, &x, &mut second).unwrap();
        prop_assert_eq!(bits32(&first), bits32(&second));

        scale_f32(&config, alpha, &x, &mut second).unwrap();
        prop_assert_eq!(bits32(&first), bits32(&second));
    }

    /// Growing N by one across a chunk boundary leaves the common prefix unchanged
    #[test]
    fn prop_chunk_boundary_prefix(
        full in prop::collection::vec(-1e6f32..1e6, 1..150),
        alpha in -100.0f32..100.0,
    ) {
        let config = ScalConfig::new().with_workers(1).with_chunk(8);
        let n = full.len() - 1;

        let mut short = vec![0.0f32; n];
        let mut long = vec![0.0f32; n + 1];
        scale_f32(&config, alpha, &full[..n], &mut short).unwrap();
        scale_f32(&config, alpha, &full, &mut long).unwrap();

        prop_assert_eq!(bits32(&short), bits32(&long[..n]));
    }

    /// The worker count does not change the result
    #[test]
    fn prop_population_invariant(
        x in prop::collection::vec(-1e6f64..1e6, 0..200),
        alpha in -100.0f64..100.0,
        p1 in 1usize..20,
        p2 in 1usize..20,
    ) {
        let mut y1 = vec![0.0f64; x.len()];
        let mut y2 = vec![0.0f64; x.len()];
        scale_f64(&ScalConfig::new().with_workers(p1), alpha, &x, &mut y1).unwrap();
        scale_f64(&ScalConfig::new().with_workers(p2), alpha, &x, &mut y2).unwrap();
        prop_assert_eq!(bits64(&y1), bits64(&y2));
    }
}
