use approx::assert_abs_diff_eq;
use fireworks::{FireworkVariant, Simulation};

const FPS: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
struct Launch {
    frame: u64,
    variant: FireworkVariant,
    delay_after: f64,
}

fn show(seed: u64, frames: u64) -> (Vec<Launch>, Vec<(u64, usize, usize)>) {
    let mut sim = Simulation::builder()
        .seed(seed)
        .seconds_between_launches(3.0)
        .max_batch_size(1)
        .frame_rate(FPS)
        .build()
        .unwrap();
    sim.start();

    let mut launches = Vec::new();
    let mut trace = Vec::new();
    let mut next_id = 0;
    for _ in 0..frames {
        sim.advance();
        for fw in sim.fireworks() {
            if fw.id().0 >= next_id {
                next_id = fw.id().0 + 1;
                launches.push(Launch {
                    frame: sim.frame(),
                    variant: fw.variant(),
                    delay_after: sim.current_delay(),
                });
            }
        }
        trace.push((sim.frame(), sim.fireworks().len(), sim.particle_count()));
    }
    (launches, trace)
}

#[test]
fn same_seed_replays_the_same_show() {
    let (launches_a, trace_a) = show(2024, 60 * 60);
    let (launches_b, trace_b) = show(2024, 60 * 60);
    assert!(launches_a.len() >= 8);
    assert_eq!(launches_a, launches_b);
    assert_eq!(trace_a, trace_b);
}

#[test]
fn different_seeds_diverge() {
    let (_, trace_a) = show(1, 60 * 30);
    let (_, trace_b) = show(2, 60 * 30);
    assert_ne!(trace_a, trace_b);
}

#[test]
fn delays_follow_the_two_phase_cycle() {
    let (launches, _) = show(77, 60 * 90);
    assert_eq!(launches[0].frame, 180);
    assert!(launches.len() >= 10);

    let mut saw_half = false;
    let mut saw_full = false;
    for (i, launch) in launches.iter().enumerate() {
        if i % 2 == 0 {
            assert_abs_diff_eq!(
                launch.delay_after,
                3.0 + launch.variant.additional_delay(),
                epsilon = 1e-12
            );
        } else if launch.delay_after == 1.5 {
            saw_half = true;
        } else if launch.delay_after == 3.0 {
            saw_full = true;
        } else {
            panic!("unexpected reset delay {} at {launch:?}", launch.delay_after);
        }
    }
    assert!(saw_half && saw_full);

    for pair in launches.windows(2) {
        let gap = (pair[1].frame - pair[0].frame) as f64 / FPS;
        assert_abs_diff_eq!(gap, pair[0].delay_after, epsilon = 1.5 / FPS);
    }
}

#[test]
fn light_batches_relaunch_after_the_base_delay() {
    let mut sim = Simulation::builder()
        .seed(3)
        .seconds_between_launches(3.0)
        .max_batch_size(1)
        .frame_rate(FPS)
        .build()
        .unwrap();
    sim.queue_firework(FireworkVariant::Small);
    sim.queue_firework(FireworkVariant::Small);
    sim.start();

    let mut frames = Vec::new();
    let mut next_id = 0;
    while frames.len() < 3 {
        sim.advance();
        for fw in sim.fireworks() {
            if fw.id().0 >= next_id {
                next_id = fw.id().0 + 1;
                frames.push(sim.frame());
            }
        }
    }
    assert_eq!(frames[0], 180);
    assert_eq!(frames[1], 360);
    let reset_gap = frames[2] - frames[1];
    assert!(reset_gap == 90 || reset_gap == 180, "got {reset_gap}");
}

#[test]
fn heaviest_variant_in_a_batch_wins() {
    let mut sim = Simulation::builder().seed(5).build().unwrap();
    sim.queue_firework(FireworkVariant::Double);
    sim.queue_firework(FireworkVariant::Small);
    sim.queue_firework(FireworkVariant::Medium);
    sim.launch_batch(3);
    assert_eq!(sim.fireworks().len(), 3);
    assert_eq!(sim.current_delay(), 5.0);
}
