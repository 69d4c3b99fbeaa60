//! End-to-end behaviour of the leader/follower simulation.

use flight_domain::{
    Action, EntityId, Key, KeyBindings, Pose, Position, SimulationConfig, TrajectoryPoint,
};
use flight_persistence::{JsonFileStore, PersistenceService};
use flight_simulator::{
    Aircraft, ChannelTransport, Controller, Exporter, Fleet, InputScript, KeyboardState,
    LaunchGenerator, LaunchLayout, MemoryTransport, ScenarioSpec, SimError, SimulationClock,
    TerminationReason, TickOutcome, TraceRenderer, FOLLOWER_ID, LEADER_ID,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn leader() -> EntityId {
    EntityId::from(LEADER_ID)
}

fn follower() -> EntityId {
    EntityId::from(FOLLOWER_ID)
}

fn pair_clock(config: SimulationConfig, seed: u64, transport: MemoryTransport) -> SimulationClock {
    let config = Arc::new(config);
    let launch = LaunchGenerator::new(config.world_size, Some(seed)).generate(LaunchLayout::Random);
    let scenario = ScenarioSpec::pair();
    let fleet = scenario.build_fleet(config, &launch).unwrap();
    SimulationClock::new(fleet, Exporter::new(transport), scenario.goal_watch().unwrap()).unwrap()
}

/// Clock whose follower starts at `start` heading east toward a goal at
/// (100, 100).
fn boundary_clock(start: Position, transport: MemoryTransport) -> SimulationClock {
    let mut config = SimulationConfig::default();
    config.speed.init = 5.0;
    let config = Arc::new(config);

    let fleet = Fleet::new(
        Arc::clone(&config),
        vec![
            Aircraft::new(
                LEADER_ID,
                Pose::new(500.0, 500.0, 0.0),
                Position::new(900.0, 500.0),
                Controller::Manual(KeyBindings::arrows()),
                &config,
            ),
            Aircraft::new(
                FOLLOWER_ID,
                Pose::new(start.x, start.y, 0.0),
                Position::new(100.0, 100.0),
                Controller::Follow { leader: leader() },
                &config,
            ),
        ],
    )
    .unwrap();
    SimulationClock::new(fleet, Exporter::new(transport), follower()).unwrap()
}

fn run_script(clock: &mut SimulationClock, script: &InputScript, ticks: u64) {
    let mut renderer = TraceRenderer::default();
    for tick in 0..ticks {
        let outcome = clock.step(&script.frame(tick), &mut renderer).unwrap();
        assert!(matches!(outcome, TickOutcome::Continue), "halted at tick {tick}");
    }
}

fn random_keys(rng: &mut StdRng) -> KeyboardState {
    let mut keys = KeyboardState::new();
    for key in [Key::Right, Key::Left, Key::Down, Key::Up] {
        if rng.gen_range(0..3) == 0 {
            keys.press(key);
        }
    }
    keys
}

#[test]
fn test_speeds_stay_within_bounds_under_random_input() {
    let config = SimulationConfig::default();
    let mut clock = pair_clock(config.clone(), 11, MemoryTransport::new());
    let mut rng = StdRng::seed_from_u64(2024);
    let mut renderer = TraceRenderer::default();

    for _ in 0..400 {
        let input = random_keys(&mut rng);
        let outcome = clock.step(&input, &mut renderer).unwrap();
        for aircraft in clock.fleet().iter() {
            assert!(config.speed.contains(aircraft.speed()));
            assert!(config.angular_speed.contains(aircraft.angular_speed()));
        }
        if matches!(outcome, TickOutcome::Halted(_)) {
            break;
        }
    }
}

#[test]
fn test_follower_matches_leader_every_tick() {
    let script = InputScript::new()
        .hold(0, 30, [Key::Right])
        .hold(10, 25, [Key::Down])
        .hold(40, 60, [Key::Left, Key::Up]);
    let mut clock = pair_clock(SimulationConfig::default(), 5, MemoryTransport::new());
    run_script(&mut clock, &script, 60);

    let lead = clock.fleet().get(&leader()).unwrap().history();
    let wing = clock.fleet().get(&follower()).unwrap().history();
    assert_eq!(lead.len(), wing.len());
    for (a, b) in lead.records().iter().zip(wing.records()) {
        assert_eq!(a.tick, b.tick);
        assert_eq!(a.action, b.action);
    }
}

#[test]
fn test_same_seed_and_script_are_deterministic() {
    let script = InputScript::new()
        .hold(0, 15, [Key::Right, Key::Down])
        .hold(20, 35, [Key::Up]);

    let mut first = pair_clock(SimulationConfig::default(), 77, MemoryTransport::new());
    let mut second = pair_clock(SimulationConfig::default(), 77, MemoryTransport::new());
    run_script(&mut first, &script, 35);
    run_script(&mut second, &script, 35);

    for id in [leader(), follower()] {
        assert_eq!(
            first.fleet().get(&id).unwrap().history(),
            second.fleet().get(&id).unwrap().history()
        );
    }
}

#[test]
fn test_history_has_one_contiguous_record_per_tick() {
    let mut clock = pair_clock(SimulationConfig::default(), 9, MemoryTransport::new());
    run_script(&mut clock, &InputScript::new(), 25);

    assert_eq!(clock.ticks_run(), 25);
    for aircraft in clock.fleet().iter() {
        let ticks: Vec<u64> = aircraft.history().records().iter().map(|r| r.tick).collect();
        assert_eq!(ticks, (0..25).collect::<Vec<_>>());
    }
}

#[test]
fn test_recorded_state_precedes_action() {
    let mut clock = pair_clock(SimulationConfig::default(), 13, MemoryTransport::new());
    run_script(&mut clock, &InputScript::new().hold(0, 10, [Key::Down]), 10);

    let records = clock.fleet().get(&leader()).unwrap().history().records().to_vec();
    for pair in records.windows(2) {
        let next = flight_simulator::euler_step(pair[0].state, pair[0].action);
        assert_eq!(pair[1].state, next);
    }
}

#[test]
fn test_goal_boundary_is_inclusive() {
    let transport = MemoryTransport::new();
    let mut clock = boundary_clock(Position::new(70.0, 100.0), transport.clone());
    let mut renderer = TraceRenderer::default();
    let idle = KeyboardState::new();

    // 70 -> 75: still outside [80, 120]
    let outcome = clock.step(&idle, &mut renderer).unwrap();
    assert!(matches!(outcome, TickOutcome::Continue));
    assert!(!clock.goal_reached());

    // 75 -> 80: on the boundary
    let TickOutcome::Halted(termination) = clock.step(&idle, &mut renderer).unwrap() else {
        panic!("expected goal termination");
    };
    assert_eq!(termination.reason, TerminationReason::GoalReached);
    assert_eq!(termination.ticks, 2);
    assert!(termination.export.is_ok());
    assert_eq!(
        clock.fleet().get(&follower()).unwrap().position(),
        Position::new(80.0, 100.0)
    );

    assert!(matches!(clock.step(&idle, &mut renderer), Err(SimError::Halted)));
    assert_eq!(transport.sent().len(), 3);
}

#[test]
fn test_manual_stop_wins_over_goal() {
    let transport = MemoryTransport::new();
    let mut clock = boundary_clock(Position::new(75.0, 100.0), transport.clone());

    let stop = KeyboardState::with_keys([Key::Enter]);
    let TickOutcome::Halted(termination) =
        clock.step(&stop, &mut TraceRenderer::default()).unwrap()
    else {
        panic!("expected termination");
    };
    assert_eq!(termination.reason, TerminationReason::ManualStop);
    assert_eq!(transport.sent().len(), 3);
}

#[test]
fn test_accelerate_saturates_at_max() {
    let mut clock = pair_clock(SimulationConfig::default(), 21, MemoryTransport::new());
    run_script(&mut clock, &InputScript::new().hold(0, 20, [Key::Right]), 20);

    assert_eq!(clock.fleet().get(&leader()).unwrap().speed(), 5.0);
    assert_eq!(clock.fleet().get(&follower()).unwrap().speed(), 5.0);
}

#[test]
fn test_follower_copies_leader_without_lag() {
    let mut config = SimulationConfig::default();
    config.speed.init = 1.8;
    let mut clock = pair_clock(config, 4, MemoryTransport::new());
    run_script(&mut clock, &InputScript::new().hold(0, 3, [Key::Right]), 3);

    let lead: Vec<Action> = clock
        .fleet()
        .get(&leader())
        .unwrap()
        .history()
        .records()
        .iter()
        .map(|r| r.action)
        .collect();
    let wing: Vec<Action> = clock
        .fleet()
        .get(&follower())
        .unwrap()
        .history()
        .records()
        .iter()
        .map(|r| r.action)
        .collect();

    for (action, expected) in lead.iter().zip([2.0, 2.2, 2.4]) {
        assert!((action.speed - expected).abs() < 1e-9);
    }
    assert_eq!(lead, wing);
}

#[test]
fn test_export_payloads_match_histories() {
    let transport = MemoryTransport::new();
    let mut clock = pair_clock(SimulationConfig::default(), 31, transport.clone());
    run_script(&mut clock, &InputScript::new().hold(0, 8, [Key::Right]), 8);

    let stop = KeyboardState::with_keys([Key::Enter]);
    let outcome = clock.step(&stop, &mut TraceRenderer::default()).unwrap();
    assert!(matches!(outcome, TickOutcome::Halted(_)));

    for id in [leader(), follower()] {
        let points: Vec<TrajectoryPoint> =
            serde_json::from_value(transport.payload(id.as_str()).unwrap()).unwrap();
        assert_eq!(points.len(), 9);
        assert_eq!(points, clock.fleet().get(&id).unwrap().history().to_trajectory());
    }

    let config: SimulationConfig =
        serde_json::from_value(transport.payload("config").unwrap()).unwrap();
    assert_eq!(&config, clock.fleet().config());
}

#[tokio::test]
async fn test_export_reaches_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let (transport, rx) = ChannelTransport::channel();
    let service = PersistenceService::new(JsonFileStore::new(dir.path())).spawn(rx);

    let config = Arc::new(SimulationConfig::default());
    let launch = LaunchGenerator::new(config.world_size, None).generate(LaunchLayout::Default);
    let scenario = ScenarioSpec::pair();
    let fleet = scenario.build_fleet(Arc::clone(&config), &launch).unwrap();
    let mut clock = SimulationClock::new(fleet, Exporter::new(transport), follower()).unwrap();

    run_script(&mut clock, &InputScript::new().hold(0, 5, [Key::Down]), 5);
    let stop = KeyboardState::with_keys([Key::Enter]);
    let TickOutcome::Halted(termination) =
        clock.step(&stop, &mut TraceRenderer::default()).unwrap()
    else {
        panic!("expected termination");
    };
    assert!(termination.export.is_ok());

    let expected = clock.fleet().get(&leader()).unwrap().history().to_trajectory();
    drop(clock);
    let (_, report) = service.await.unwrap();
    assert_eq!(report.written, 3);
    assert_eq!(report.failed, 0);

    let raw = std::fs::read_to_string(dir.path().join("airplane1.json")).unwrap();
    let points: Vec<TrajectoryPoint> = serde_json::from_str(&raw).unwrap();
    assert_eq!(points, expected);

    let raw = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert_eq!(SimulationConfig::from_json_str(&raw).unwrap(), *config);
    assert!(dir.path().join("airplane2.json").exists());
}
