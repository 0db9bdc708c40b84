use std::num::NonZeroUsize;
use std::time::Duration;

use comms::msg::{HaloTag, Msg};
use comms::topology::wire_group;
use rand::Rng;
use tokio::time::{sleep, timeout};

use solver::halo::HaloExchanger;
use solver::{Partition, Scratch, Segment, SolverConfig, SolverErr, StencilUpdater, WorkerContext};

fn ctx(rank: usize, workers: usize) -> WorkerContext {
    WorkerContext::new(rank, NonZeroUsize::new(workers).unwrap())
}

fn segment_for(rank: usize, workers: usize, cfg: &SolverConfig) -> Segment {
    let partition = Partition::for_worker(cfg.global_size, ctx(rank, workers)).unwrap();
    Segment::new(&partition, cfg)
}

/// A config whose single sweep leaves globally distinct values everywhere:
/// with a zero field and zero boundaries, point `j` becomes
/// `-0.5 * source[j]`.
fn rank_stamped_config(workers: usize) -> SolverConfig {
    let global_size = workers * 2;
    SolverConfig {
        global_size,
        left_boundary: 0.0,
        right_boundary: 0.0,
        grid_spacing: 1.0,
        source_term: Some((0..global_size).map(|j| -2.0 * (j as f32 + 1.0)).collect()),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn one_round_mirrors_every_neighbor_edge() {
    const WORKERS: usize = 3;
    let cfg = rank_stamped_config(WORKERS);

    let mut handles = Vec::new();
    for seat in wire_group(NonZeroUsize::new(WORKERS).unwrap()) {
        let cfg = cfg.clone();
        handles.push(tokio::spawn(async move {
            let rank = seat.rank;
            let mut segment = segment_for(rank, WORKERS, &cfg);
            let mut scratch = Scratch::for_segment(&segment);
            let updater = StencilUpdater::new(cfg.grid_spacing);

            updater.step(&segment, &mut scratch);
            updater.commit(&mut segment, &scratch);

            let mut exchanger = HaloExchanger::new(&ctx(rank, WORKERS), seat.left, seat.right);
            exchanger.exchange(1, &mut segment).await.unwrap();
            (rank, segment)
        }));
    }

    let mut segments = Vec::new();
    for handle in handles {
        segments.push(handle.await.unwrap());
    }
    segments.sort_by_key(|(rank, _)| *rank);

    // After the sweep the interiors are [1, 2], [3, 4], [5, 6] by rank.
    assert_eq!(segments[0].1.interior(), [1.0, 2.0]);
    assert_eq!(segments[1].1.interior(), [3.0, 4.0]);
    assert_eq!(segments[2].1.interior(), [5.0, 6.0]);

    // Each halo now mirrors the neighbor's edge value.
    assert_eq!(segments[0].1.right_halo(), 3.0);
    assert_eq!(segments[1].1.left_halo(), 2.0);
    assert_eq!(segments[1].1.right_halo(), 5.0);
    assert_eq!(segments[2].1.left_halo(), 4.0);

    // Open sides keep the physical boundary.
    assert_eq!(segments[0].1.left_halo(), 0.0);
    assert_eq!(segments[2].1.right_halo(), 0.0);
}

#[tokio::test]
async fn a_wrong_kind_frame_fails_the_exchange() {
    let (mine, mut theirs) = comms::pair();

    // Rank 0 of 2 is even: its first action is receiving boundary-down.
    let sender = tokio::spawn(async move { theirs.send(&Msg::ResidualShare(1.0)).await });

    let cfg = SolverConfig {
        global_size: 2,
        ..Default::default()
    };
    let mut segment = segment_for(0, 2, &cfg);
    let mut exchanger = HaloExchanger::new(&ctx(0, 2), None, Some(mine));

    let err = exchanger.exchange(1, &mut segment).await.unwrap_err();
    assert!(matches!(
        err,
        SolverErr::UnexpectedMessage {
            iteration: 1,
            expected: "halo boundary-down",
            got: "residual share",
        }
    ));

    sender.await.unwrap().unwrap();
}

#[tokio::test]
async fn a_wrong_tag_frame_fails_the_exchange() {
    let (mine, mut theirs) = comms::pair();

    let sender = tokio::spawn(async move {
        theirs
            .send(&Msg::Halo {
                tag: HaloTag::BoundaryUp,
                value: 1.0,
            })
            .await
    });

    let cfg = SolverConfig {
        global_size: 2,
        ..Default::default()
    };
    let mut segment = segment_for(0, 2, &cfg);
    let mut exchanger = HaloExchanger::new(&ctx(0, 2), None, Some(mine));

    let err = exchanger.exchange(7, &mut segment).await.unwrap_err();
    assert!(matches!(
        err,
        SolverErr::UnexpectedMessage {
            iteration: 7,
            expected: "halo boundary-down",
            got: "halo boundary-up",
        }
    ));

    sender.await.unwrap().unwrap();
}

#[tokio::test]
async fn a_vanished_neighbor_surfaces_as_io_error() {
    let (mine, theirs) = comms::pair();
    drop(theirs);

    let cfg = SolverConfig {
        global_size: 2,
        ..Default::default()
    };
    let mut segment = segment_for(0, 2, &cfg);
    let mut exchanger = HaloExchanger::new(&ctx(0, 2), None, Some(mine));

    let err = exchanger.exchange(1, &mut segment).await.unwrap_err();
    assert!(matches!(err, SolverErr::Io(_)));
}

/// Many rounds over every group size with random per-rank delays. Any
/// ordering bug in the plans shows up here as a hang, caught by the
/// timeout.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn repeated_exchanges_never_deadlock() {
    const ROUNDS: usize = 25;

    for workers in 2..=6 {
        let cfg = rank_stamped_config(workers);

        let run = async {
            let mut handles = Vec::new();
            for seat in wire_group(NonZeroUsize::new(workers).unwrap()) {
                let cfg = cfg.clone();
                handles.push(tokio::spawn(async move {
                    let rank = seat.rank;
                    let mut segment = segment_for(rank, workers, &cfg);
                    let mut exchanger =
                        HaloExchanger::new(&ctx(rank, workers), seat.left, seat.right);

                    for round in 1..=ROUNDS {
                        let jitter = rand::rng().random_range(0..3);
                        sleep(Duration::from_millis(jitter)).await;
                        exchanger.exchange(round, &mut segment).await.unwrap();
                    }
                }));
            }

            for handle in handles {
                handle.await.unwrap();
            }
        };

        timeout(Duration::from_secs(30), run)
            .await
            .unwrap_or_else(|_| panic!("deadlocked with {workers} workers"));
    }
}
