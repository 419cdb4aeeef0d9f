use corrsum::distributed::{broadcast, builder, comm, decide};
use corrsum::matrix::Cell;
use corrsum::partition::partition;
use corrsum::reduce::{Discovery, reduce};
use corrsum::{
    CorrError, CorrelationMatrix, Dataset, Engine, NameMask, RetentionRecord, Threshold,
    ThresholdMode, Topology, correlation_matrix, summarize,
};
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};

// Half of the columns are noisy copies of an earlier column so that some
// pairs land inside the interval and some do not.
fn random_dataset(rows: usize, cols: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values = Array2::<f64>::zeros((rows, cols));
    for c in 0..cols {
        for r in 0..rows {
            values[[r, c]] = if c % 2 == 1 {
                values[[r, c - 1]] + rng.gen_range(-0.3..0.3)
            } else {
                rng.gen_range(-1.0..1.0)
            };
        }
    }
    Dataset::from_observations(values).expect("valid dataset")
}

fn loose_threshold() -> Threshold {
    Threshold::resolve(ThresholdMode::Correlation, Some((0.4, 1.0))).expect("range")
}

#[test]
fn matrix_is_symmetric_for_every_topology() {
    let dataset = random_dataset(12, 7, 11);
    for workers in 1..=7 {
        for threads in 1..=3 {
            let summary = summarize(
                &dataset,
                &loose_threshold(),
                None,
                Engine::Distributed,
                Topology::new(workers, threads).expect("topology"),
            )
            .expect("summary");
            assert!(
                summary.matrix.is_symmetric(),
                "{} workers, {} threads",
                workers,
                threads
            );
        }
    }
}

#[test]
fn results_do_not_depend_on_worker_count() {
    let dataset = random_dataset(20, 9, 3);
    let threshold = loose_threshold();
    let serial = summarize(
        &dataset,
        &threshold,
        None,
        Engine::Serial,
        Topology::single(),
    )
    .expect("serial summary");

    for workers in 1..=dataset.variable_count() {
        let distributed = summarize(
            &dataset,
            &threshold,
            None,
            Engine::Distributed,
            Topology::new(workers, 2).expect("topology"),
        )
        .expect("distributed summary");
        assert!(
            distributed.matrix.same_values(&serial.matrix),
            "{} workers",
            workers
        );
        assert_eq!(distributed.retention, serial.retention, "{} workers", workers);
    }
}

#[test]
fn masked_results_do_not_depend_on_worker_count() {
    let dataset = random_dataset(15, 8, 21);
    let mask = NameMask::from_vec(vec![false, true, false, false, true, false, false, false]);
    let threshold = loose_threshold();
    let serial = summarize(
        &dataset,
        &threshold,
        Some(&mask),
        Engine::Serial,
        Topology::single(),
    )
    .expect("serial summary");

    for workers in [1, 2, 3, 5, 8] {
        let distributed = summarize(
            &dataset,
            &threshold,
            Some(&mask),
            Engine::Distributed,
            Topology::new(workers, 2).expect("topology"),
        )
        .expect("distributed summary");
        assert_eq!(distributed.retention, serial.retention, "{} workers", workers);
    }
}

#[test]
fn retention_matches_brute_force_definition() {
    let dataset = random_dataset(10, 6, 99);
    let threshold = loose_threshold();
    let summary = summarize(
        &dataset,
        &threshold,
        None,
        Engine::Distributed,
        Topology::new(4, 2).expect("topology"),
    )
    .expect("summary");

    let n = dataset.variable_count();
    assert!(summary.retention.is_kept(0));
    for v in 0..n {
        let expected = (0..n)
            .filter(|&u| u != v)
            .any(|u| threshold.contains(summary.matrix.get(v, u)));
        assert_eq!(summary.retention.is_variable_kept(v), expected, "variable {}", v);
    }
}

#[test]
fn repeated_runs_are_identical() {
    let dataset = random_dataset(16, 6, 5);
    let run = || {
        summarize(
            &dataset,
            &loose_threshold(),
            None,
            Engine::Distributed,
            Topology::new(3, 2).expect("topology"),
        )
        .expect("summary")
    };
    let first = run();
    let second = run();
    assert!(first.matrix.same_values(&second.matrix));
    assert_eq!(first.retention, second.retention);
}

#[test]
fn more_workers_than_variables_is_clamped() {
    let dataset = random_dataset(8, 3, 1);
    let summary = summarize(
        &dataset,
        &loose_threshold(),
        None,
        Engine::Distributed,
        Topology::new(10, 1).expect("topology"),
    )
    .expect("summary");
    assert!(summary.matrix.same_values(&correlation_matrix(&dataset)));
}

#[test]
fn mask_of_wrong_length_is_rejected() {
    let dataset = random_dataset(8, 3, 1);
    let mask = NameMask::from_vec(vec![true, false]);
    let err = summarize(
        &dataset,
        &loose_threshold(),
        Some(&mask),
        Engine::Distributed,
        Topology::new(2, 1).expect("topology"),
    )
    .unwrap_err();
    assert!(matches!(err, CorrError::DimensionMismatch { .. }));
}

#[test]
fn gather_rejects_short_block() {
    let dataset = random_dataset(6, 4, 2);
    let mut nodes = comm::mesh(2);
    let peer = nodes.pop().expect("rank 1");
    let coordinator = nodes.pop().expect("rank 0");

    let mut block = builder::compute_block(&dataset, partition(4, 2, 1));
    block.pop();
    peer.send(comm::COORDINATOR, comm::Packet::Cells(block))
        .expect("send");

    let own = builder::compute_block(&dataset, partition(4, 2, 0));
    let mut local = CorrelationMatrix::new(4);
    let err = builder::gather(&coordinator, &mut local, own).unwrap_err();
    assert!(matches!(
        err,
        CorrError::Protocol {
            peer: 1,
            stage: "gather",
            ..
        }
    ));
}

#[test]
fn gather_rejects_cells_outside_peer_rows() {
    let dataset = random_dataset(6, 4, 2);
    let mut nodes = comm::mesh(2);
    let peer = nodes.pop().expect("rank 1");
    let coordinator = nodes.pop().expect("rank 0");

    // Right count, wrong rows: the peer claims the coordinator's rows.
    let stolen: Vec<Cell> = builder::compute_block(&dataset, partition(4, 2, 0));
    peer.send(comm::COORDINATOR, comm::Packet::Cells(stolen.clone()))
        .expect("send");

    let mut local = CorrelationMatrix::new(4);
    let err = builder::gather(&coordinator, &mut local, stolen).unwrap_err();
    assert!(matches!(err, CorrError::Protocol { peer: 1, .. }));
}

#[test]
fn gather_rejects_duplicate_cells() {
    let dataset = random_dataset(6, 4, 2);
    let mut nodes = comm::mesh(2);
    let peer = nodes.pop().expect("rank 1");
    let coordinator = nodes.pop().expect("rank 0");

    // Right count and rows, but one cell is sent twice and another never.
    let mut block = builder::compute_block(&dataset, partition(4, 2, 1));
    let first = block[0];
    if let Some(last) = block.last_mut() {
        *last = first;
    }
    peer.send(comm::COORDINATOR, comm::Packet::Cells(block))
        .expect("send");

    let own = builder::compute_block(&dataset, partition(4, 2, 0));
    let mut local = CorrelationMatrix::new(4);
    let err = builder::gather(&coordinator, &mut local, own).unwrap_err();
    assert!(matches!(
        err,
        CorrError::Protocol {
            peer: 1,
            stage: "gather",
            ..
        }
    ));
}

#[test]
fn gather_reports_vanished_peer() {
    let dataset = random_dataset(6, 4, 2);
    let mut nodes = comm::mesh(2);
    let peer = nodes.pop().expect("rank 1");
    let coordinator = nodes.pop().expect("rank 0");
    drop(peer);

    let own = builder::compute_block(&dataset, partition(4, 2, 0));
    let mut local = CorrelationMatrix::new(4);
    let err = builder::gather(&coordinator, &mut local, own).unwrap_err();
    assert!(matches!(err, CorrError::PeerDisconnected { peer: 1 }));
}

#[test]
fn broadcast_rejects_wrong_dimension() {
    let mut nodes = comm::mesh(2);
    let peer = nodes.pop().expect("rank 1");
    let coordinator = nodes.pop().expect("rank 0");

    coordinator
        .send(
            1,
            comm::Packet::Matrix {
                dim: 3,
                values: vec![0.0; 9],
            },
        )
        .expect("send");
    let mut local = CorrelationMatrix::new(4);
    let err = broadcast::broadcast_matrix(&peer, &mut local).unwrap_err();
    assert!(matches!(
        err,
        CorrError::Protocol {
            stage: "broadcast",
            ..
        }
    ));

    coordinator
        .send(
            1,
            comm::Packet::Matrix {
                dim: 4,
                values: vec![0.0; 15],
            },
        )
        .expect("send");
    assert!(broadcast::broadcast_matrix(&peer, &mut local).is_err());
}

#[test]
fn merge_collects_every_peer_discovery() {
    let mut nodes = comm::mesh(3);
    let second = nodes.pop().expect("rank 2");
    let first = nodes.pop().expect("rank 1");
    let coordinator = nodes.pop().expect("rank 0");

    // 6 variables over 3 workers: rows 0..2, 2..4, 4..6.
    assert_eq!(
        decide::merge_discoveries(
            &first,
            RetentionRecord::new(6),
            vec![Discovery { x: 2, y: 5 }, Discovery { x: 3, y: 0 }],
        )
        .expect("send"),
        None
    );
    decide::merge_discoveries(&second, RetentionRecord::new(6), Vec::new()).expect("send");

    let merged = decide::merge_discoveries(&coordinator, RetentionRecord::new(6), Vec::new())
        .expect("merge")
        .expect("coordinator record");
    assert_eq!(merged.kept_variables(), vec![0, 2, 3, 5]);
}

#[test]
fn merge_rejects_discovery_outside_peer_rows() {
    let mut nodes = comm::mesh(2);
    let peer = nodes.pop().expect("rank 1");
    let coordinator = nodes.pop().expect("rank 0");

    decide::merge_discoveries(&peer, RetentionRecord::new(4), vec![Discovery { x: 0, y: 1 }])
        .expect("send");
    let err = decide::merge_discoveries(&coordinator, RetentionRecord::new(4), Vec::new())
        .unwrap_err();
    assert!(matches!(
        err,
        CorrError::Protocol {
            stage: "reduce",
            ..
        }
    ));
}

#[test]
fn serial_reduce_matches_distributed_on_same_matrix() {
    let dataset = random_dataset(9, 5, 8);
    let matrix = correlation_matrix(&dataset);
    let serial = reduce(&matrix, &loose_threshold(), None).expect("reduce");
    let summary = summarize(
        &dataset,
        &loose_threshold(),
        None,
        Engine::Distributed,
        Topology::new(5, 1).expect("topology"),
    )
    .expect("summary");
    assert_eq!(serial, summary.retention);
}
