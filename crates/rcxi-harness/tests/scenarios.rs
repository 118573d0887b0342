// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness End-to-End Scenarios
// ─────────────────────────────────────────────────────────────────────

use std::fs;

use rcxi_core::{compute_metrics, detect_lock, shuffle_series};
use rcxi_harness::{
    load_embeddings, read_summary_json, read_turn_csv, run_all, run_condition, run_one,
    run_shuffled, write_run,
};
use rcxi_types::{EmbeddingSeries, EndpointConfig, LockState, RunConfig, RunType};

fn basis(d: usize, i: usize) -> Vec<f64> {
    let mut v = vec![0.0; d];
    v[i] = 1.0;
    v
}

/// 12 turns: four orthogonal directions, then turn 3 repeated.
fn scenario_a() -> EmbeddingSeries {
    let mut turns: Vec<Vec<f64>> = (0..4).map(|i| basis(4, i)).collect();
    turns.extend(vec![basis(4, 3); 8]);
    EmbeddingSeries::new(turns).unwrap()
}

/// 12 turns alternating between two orthogonal directions.
fn scenario_b() -> EmbeddingSeries {
    EmbeddingSeries::new((0..12).map(|t| basis(2, t % 2)).collect()).unwrap()
}

/// Topic drift every third turn.
fn drifted(n: usize) -> EmbeddingSeries {
    EmbeddingSeries::new(
        (0..n)
            .map(|t| {
                let topic = (t / 3) as f64 * 1.3;
                vec![topic.cos(), topic.sin(), 0.2 * (t % 3) as f64]
            })
            .collect(),
    )
    .unwrap()
}

/// Slowly converging conversation.
fn converging(n: usize) -> EmbeddingSeries {
    EmbeddingSeries::new(
        (0..n)
            .map(|t| {
                let w = (-(t as f64) / 4.0).exp();
                vec![1.0 - w, w, 0.3 * w]
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_scenario_a_locks_after_zero_windows_fill() {
    let config = RunConfig::default();
    let metrics = compute_metrics(&scenario_a(), &config).unwrap();

    for t in 4..12 {
        assert!(metrics.xi[t].unwrap().abs() < 1e-12, "xi[{t}] = {:?}", metrics.xi[t]);
    }
    for t in (config.k + 3)..12 {
        assert!(metrics.lvs[t].unwrap().abs() < 1e-12, "lvs[{t}] = {:?}", metrics.lvs[t]);
    }
    // ξ is zero from turn 4, so five zeros first end at turn 8.
    assert_eq!(detect_lock(&metrics, &config), LockState::Locked(8));
}

#[test]
fn test_scenario_b_never_locks() {
    let config = RunConfig::default();
    let metrics = compute_metrics(&scenario_b(), &config).unwrap();

    for t in 1..12 {
        assert!((metrics.xi[t].unwrap() - 1.0).abs() < 1e-12);
    }
    for lvs in metrics.lvs.iter().flatten() {
        assert!(*lvs > 0.0);
    }
    assert_eq!(detect_lock(&metrics, &config), LockState::Unlocked);
}

#[test]
fn test_scenario_c_shuffle_output_bit_identical() {
    let config = RunConfig {
        seed: 42,
        provider: "synthetic".into(),
        ..Default::default()
    };
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    let first = run_shuffled(&scenario_a(), &config).unwrap();
    let second = run_shuffled(&scenario_a(), &config).unwrap();
    let wa = write_run(dir_a.path(), "scenario_a", &first).unwrap();
    let wb = write_run(dir_b.path(), "scenario_a", &second).unwrap();

    assert_eq!(fs::read(&wa.csv).unwrap(), fs::read(&wb.csv).unwrap());
    assert_eq!(fs::read(&wa.json).unwrap(), fs::read(&wb.json).unwrap());
    assert_eq!(first.permutation, second.permutation);
    assert!(wa.csv.ends_with("scenario_a.shuffled.csv"));
}

#[test]
fn test_shuffle_breaks_temporal_order() {
    let base = converging(20);
    let (shuffled, perm) = shuffle_series(&base, 42).unwrap();
    assert!(!perm.is_identity());
    assert_ne!(shuffled.turns(), base.turns());

    let config = RunConfig::default();
    let identity = run_one(&base, &config).unwrap();
    let permuted = run_one(&shuffled, &config.with_run_type(RunType::Shuffled)).unwrap();
    assert!(identity.lock.is_locked());
    assert!(permuted.summary.e1_median_xi > identity.summary.e1_median_xi);
}

#[test]
fn test_prepending_does_not_delay_lock_beyond_shift() {
    let config = RunConfig::default();
    let base = scenario_a();
    let base_lock = detect_lock(&compute_metrics(&base, &config).unwrap(), &config);
    let t = base_lock.turn().unwrap();

    let mut turns = vec![vec![0.5, 0.5, 0.0, 0.0], vec![0.0, 0.5, 0.5, 0.0]];
    turns.extend(base.into_inner());
    let extended = EmbeddingSeries::new(turns).unwrap();
    let lock = detect_lock(&compute_metrics(&extended, &config).unwrap(), &config);
    assert!(lock.turn().unwrap() <= t + 2);
}

#[test]
fn test_parallel_runs_match_sequential() {
    let base = converging(30);
    let config = RunConfig::default();
    let sequential: Vec<_> = RunType::ALL
        .iter()
        .filter(|rt| **rt != RunType::Null)
        .map(|rt| {
            run_condition(&base, None, &config.with_run_type(*rt), &EndpointConfig::default())
                .unwrap()
        })
        .collect();

    let parallel: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = [RunType::Identity, RunType::Shuffled]
            .into_iter()
            .map(|rt| {
                let base = &base;
                let config = config.with_run_type(rt);
                s.spawn(move || {
                    run_condition(base, None, &config, &EndpointConfig::default()).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (a, b) in sequential.iter().zip(&parallel) {
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.summary, b.summary);
    }
}

#[test]
fn test_run_all_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        provider: "synthetic".into(),
        ..Default::default()
    };
    let combined = run_all(
        &converging(40),
        &drifted(40),
        &config,
        &EndpointConfig::default(),
        dir.path(),
        "transcript",
    )
    .unwrap();

    assert!(combined.evaluation.e1_pass);
    assert!(combined.tlock_identity.is_locked());
    assert_eq!(combined.tlock_null, LockState::Unlocked);
    assert!((0.0..=1.0).contains(&combined.evaluation.mann_whitney_p));

    let id_cols = read_turn_csv(&combined.identity_csv).unwrap();
    assert_eq!(id_cols.xi.len(), 39);
    assert_eq!(id_cols.pt.len(), 39);

    let summary = read_summary_json(&combined.null_json).unwrap();
    assert_eq!(summary.run_type, RunType::Null);
    assert_eq!(summary.tlock, LockState::Unlocked);

    let results = fs::read_to_string(dir.path().join("transcript.results.json")).unwrap();
    assert!(results.contains("\"Tlock_identity\""));
    assert!(results.contains("\"E1_pass\": true"));
}

#[test]
fn test_bad_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        k: 0,
        ..Default::default()
    };
    let err = run_all(
        &converging(20),
        &drifted(20),
        &config,
        &EndpointConfig::default(),
        dir.path(),
        "bad",
    )
    .unwrap_err();
    assert_eq!(err.kind(), "ConfigurationError");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_load_embeddings_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("emb.json");
    fs::write(&json_path, "[[1, 0], [0.8, 0.2], [0.7, 0.3]]").unwrap();
    let csv_path = dir.path().join("emb.csv");
    fs::write(&csv_path, "d0,d1\n1,0\n0.8,0.2\n0.7,0.3\n").unwrap();

    let a = load_embeddings(&json_path).unwrap();
    let b = load_embeddings(&csv_path).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 3);

    let bad = dir.path().join("emb.npy");
    fs::write(&bad, "").unwrap();
    assert_eq!(load_embeddings(&bad).unwrap_err().kind(), "ParseError");
}
