use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scattercore::{
    gather_points, gather_points_diagnosed, gather_points_par, gather_points_with_config, AxisData,
    GatherConfig, GatherError, RangeBounds,
};

struct RandomScatter {
    x: Vec<f64>,
    y: Vec<f64>,
    x_mask: Vec<bool>,
    y_mask: Vec<bool>,
    x_sel: Vec<i64>,
    y_sel_mask: Vec<bool>,
}

fn random_scatter(seed: u64, len_x: usize, len_y: usize) -> RandomScatter {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut coords = |len: usize| -> Vec<f64> {
        (0..len)
            .map(|_| if rng.gen_bool(0.05) { f64::NAN } else { rng.gen_range(-100.0..100.0) })
            .collect()
    };
    let x = coords(len_x);
    let y = coords(len_y);

    let x_mask = (0..len_x).map(|_| rng.gen_bool(0.9)).collect();
    let y_mask = (0..len_y).map(|_| rng.gen_bool(0.9)).collect();
    let x_sel = (0..len_x / 10).map(|_| rng.gen_range(0..len_x as i64)).collect();
    let y_sel_mask = (0..len_y).map(|_| rng.gen_bool(0.1)).collect();

    RandomScatter { x, y, x_mask, y_mask, x_sel, y_sel_mask }
}

#[test]
fn test_random_inputs_keep_invariants() {
    let data = random_scatter(42, 5_000, 4_321);
    let index = AxisData::new(&data.x).with_mask(&data.x_mask).with_selection(&data.x_sel);
    let value = AxisData::new(&data.y).with_mask(&data.y_mask).with_selection_mask(&data.y_sel_mask);
    let bounds = RangeBounds::new(-50.0, 75.0, -80.0, 20.0);

    let (gathered, diag) = gather_points_diagnosed(&index, &value, &bounds).unwrap();
    let selection = gathered.selection.as_ref().unwrap();

    assert_eq!(gathered.len(), selection.len());
    assert!(gathered.len() <= data.x.len().min(data.y.len()));
    assert_eq!(diag.total, 4_321);
    assert_eq!(diag.passed + diag.rejected(), diag.total);
    assert_eq!(diag.selected, gathered.selected_count());

    for p in &gathered.points {
        assert!(!p[0].is_nan() && !p[1].is_nan());
        assert!(bounds.contains(p[0], p[1]));
    }

    // survivors are a subsequence of the input, in order
    let mut cursor = 0;
    for p in &gathered.points {
        while cursor < diag.total && (data.x[cursor], data.y[cursor]) != (p[0], p[1]) {
            cursor += 1;
        }
        assert!(cursor < diag.total, "point {p:?} not found in input order");
        cursor += 1;
    }
}

#[test]
fn test_parallel_and_sequential_agree_on_random_inputs() {
    for seed in 0..8 {
        let data = random_scatter(seed, 20_000, 20_000);
        let index = AxisData::new(&data.x).with_mask(&data.x_mask).with_selection(&data.x_sel);
        let value = AxisData::new(&data.y).with_mask(&data.y_mask).with_selection_mask(&data.y_sel_mask);
        let bounds = RangeBounds::new(-90.0, 90.0, -60.0, 60.0);

        let sequential = gather_points(&index, &value, &bounds).unwrap();
        let parallel = gather_points_par(&index, &value, &bounds).unwrap();
        assert_eq!(sequential, parallel, "seed {seed}");
    }
}

#[test]
fn test_config_dispatch_gives_identical_results() {
    let data = random_scatter(7, 10_000, 10_000);
    let index = AxisData::new(&data.x).with_selection(&data.x_sel);
    let value = AxisData::new(&data.y).with_mask(&data.y_mask);
    let bounds = RangeBounds::unbounded();

    let expected = gather_points(&index, &value, &bounds).unwrap();

    for config in [
        GatherConfig::default(),
        GatherConfig::sequential(),
        GatherConfig::parallel(0),
        GatherConfig::parallel(2),
    ] {
        let gathered = gather_points_with_config(&index, &value, &bounds, &config).unwrap();
        assert_eq!(gathered, expected, "{config:?}");
    }
}

#[test]
fn test_errors_are_reported_before_any_work() {
    let x = vec![0.0; 5];
    let index = AxisData::new(&x).with_selection(&[100]);
    let value = AxisData::new(&x);

    for result in [
        gather_points(&index, &value, &RangeBounds::unbounded()),
        gather_points_par(&index, &value, &RangeBounds::unbounded()),
        gather_points_with_config(&index, &value, &RangeBounds::unbounded(), &GatherConfig::parallel(2)),
    ] {
        assert!(matches!(result, Err(GatherError::IndexOutOfRange { index: 100, len: 5, .. })));
    }
}

#[test]
fn test_config_roundtrips_through_json() {
    let config = GatherConfig::parallel(4);
    let json = serde_json::to_string(&config).unwrap();
    let back: GatherConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.num_threads, 4);
    assert_eq!(back.parallel_threshold, 0);
}
