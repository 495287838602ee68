use std::{cell::RefCell, rc::Rc, time::Duration};

use glam::Vec3;
use whack_core::{
    BindingError, ConfigurationError, Event, HoleId, HoleLayout, Phase, SessionError,
    SpawnFailure, TargetId, MAX_SPAWNS_PER_TICK,
};
use whack_session::{InstantiationError, SessionConfig, SessionController, TargetFactory};
use whack_system_hud::{Hud, TextSink, GAME_OVER_TEXT};
use whack_system_spawning::Config as SpawningConfig;
use whack_world::HoleRegistry;

#[derive(Debug, Default)]
struct FactoryLog {
    created: Vec<(TargetId, Vec3)>,
    removed: Vec<TargetId>,
}

#[derive(Clone, Default)]
struct RecordingFactory {
    log: Rc<RefCell<FactoryLog>>,
    failure: Option<InstantiationError>,
}

impl RecordingFactory {
    fn failing(failure: InstantiationError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    fn created(&self) -> usize {
        self.log.borrow().created.len()
    }

    fn removed(&self) -> Vec<TargetId> {
        self.log.borrow().removed.clone()
    }
}

impl TargetFactory for RecordingFactory {
    fn instantiate(&mut self, target: TargetId, position: Vec3) -> Result<(), InstantiationError> {
        if let Some(failure) = self.failure.clone() {
            return Err(failure);
        }
        self.log.borrow_mut().created.push((target, position));
        Ok(())
    }

    fn remove(&mut self, target: TargetId) {
        self.log.borrow_mut().removed.push(target);
    }
}

#[derive(Clone, Default)]
struct LatestText {
    text: Rc<RefCell<Option<String>>>,
}

impl LatestText {
    fn get(&self) -> Option<String> {
        self.text.borrow().clone()
    }
}

impl TextSink for LatestText {
    fn set_text(&mut self, text: &str) {
        *self.text.borrow_mut() = Some(text.to_owned());
    }
}

fn controller(factory: RecordingFactory) -> SessionController {
    SessionController::new(&SessionConfig::default()).with_factory(factory)
}

fn explicit_controller(positions: Vec<Vec3>, factory: RecordingFactory) -> SessionController {
    SessionController::with_registry(
        Vec3::ZERO,
        HoleRegistry::from_positions(positions),
        SpawningConfig::new(Duration::from_secs(1), 11),
    )
    .with_factory(factory)
}

#[test]
fn start_activates_session_with_fresh_state() {
    for hole_count in 1..=5 {
        let positions = (0..hole_count).map(|x| Vec3::new(x as f32, 0.0, 0.0)).collect();
        let mut session = explicit_controller(positions, RecordingFactory::default());

        session
            .start(Duration::from_secs(10))
            .expect("start with holes succeeds");

        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.score(), 0);
        assert_eq!(session.remaining(), Duration::from_secs(10));
    }
}

#[test]
fn start_with_empty_registry_reports_configuration_error() {
    let mut session = explicit_controller(Vec::new(), RecordingFactory::default());

    let result = session.start(Duration::from_secs(10));

    assert_eq!(
        result,
        Err(SessionError::Configuration(ConfigurationError::EmptyRegistry))
    );
    assert_eq!(session.phase(), Phase::Idle);
    assert!(!session.is_spawning());
}

#[test]
fn start_without_factory_reports_missing_prototype() {
    let mut session = SessionController::new(&SessionConfig::default());

    let result = session.start(Duration::from_secs(10));

    assert_eq!(
        result,
        Err(SessionError::Configuration(
            ConfigurationError::MissingPrototype
        ))
    );
    assert_eq!(session.phase(), Phase::Idle);
}

#[test]
fn unconfigured_session_uses_fallback_grid() {
    let session = SessionController::new(&SessionConfig::default());

    assert!(session.holes().is_valid());
    assert_eq!(session.holes().len(), 9);
    assert_eq!(session.holes().layout(), HoleLayout::FallbackGrid);
}

#[test]
fn countdown_ends_exactly_once_without_time_display() {
    let factory = RecordingFactory::default();
    let mut session = controller(factory);
    session.start(Duration::from_secs(3)).expect("start");
    let _ = session.take_events();

    for _ in 0..20 {
        session.tick(Duration::from_millis(250));
    }

    let events = session.take_events();
    let endings = events
        .iter()
        .filter(|event| matches!(event, Event::SessionEnded { .. }))
        .count();
    assert_eq!(endings, 1);
    assert_eq!(session.phase(), Phase::Ended);
    assert_eq!(session.remaining(), Duration::ZERO);
    assert!(!session.is_spawning());
}

#[test]
fn hits_count_while_active_and_freeze_after_end() {
    let mut session = controller(RecordingFactory::default());
    session.start(Duration::from_secs(5)).expect("start");

    for _ in 0..4 {
        session.register_hit();
    }
    assert_eq!(session.score(), 4);

    session.stop();
    session.register_hit();
    session.tick(Duration::from_secs(1));

    assert_eq!(session.score(), 4);
    assert_eq!(session.remaining(), Duration::from_secs(5));
}

#[test]
fn scoring_does_not_need_a_score_display() {
    let time = LatestText::default();
    let mut session =
        controller(RecordingFactory::default()).with_hud(Hud::new().with_time_sink(time));
    session.start(Duration::from_secs(5)).expect("start");

    session.register_hit();

    assert_eq!(session.score(), 1);
}

#[test]
fn double_activation_registers_one_hit() {
    let factory = RecordingFactory::default();
    let mut session = controller(factory.clone());
    session.start(Duration::from_secs(10)).expect("start");
    let target = session.targets()[0].id();

    session.activate(target).expect("first activation");
    session.activate(target).expect("second activation is ignored");

    assert_eq!(session.score(), 1);
    assert_eq!(factory.removed(), vec![target]);
}

#[test]
fn full_session_scenario() {
    let factory = RecordingFactory::default();
    let time = LatestText::default();
    let score = LatestText::default();
    let hud = Hud::new()
        .with_time_sink(time.clone())
        .with_score_sink(score.clone());
    let mut session = controller(factory.clone()).with_hud(hud);

    session.start(Duration::from_secs(10)).expect("start");
    assert_eq!(score.get().as_deref(), Some("Score: 0"));
    assert_eq!(factory.created(), 1, "first spawn is immediate");

    let spawned = session
        .spawn_target()
        .expect("spawn succeeds")
        .expect("session is active");
    assert!(session.holes().get(session.targets()[1].hole()).is_some());

    session.activate(spawned).expect("activation");
    assert_eq!(session.score(), 1);
    assert_eq!(score.get().as_deref(), Some("Score: 1"));
    assert_eq!(factory.removed(), vec![spawned]);
    assert!(session.targets().iter().all(|target| target.id() != spawned));

    session.tick(Duration::from_secs_f32(10.0));
    assert_eq!(session.phase(), Phase::Ended);
    assert_eq!(time.get().as_deref(), Some(GAME_OVER_TEXT));

    let created_before = factory.created();
    assert_eq!(session.spawn_target(), Ok(None));
    session.tick(Duration::from_secs(2));
    assert_eq!(factory.created(), created_before);
}

#[test]
fn periodic_spawns_follow_the_period() {
    let factory = RecordingFactory::default();
    let mut session = controller(factory.clone());
    session.start(Duration::from_secs(10)).expect("start");
    assert_eq!(factory.created(), 1);

    for _ in 0..60 {
        session.tick(Duration::from_millis(50));
    }

    assert_eq!(factory.created(), 4, "immediate spawn plus one per second");
    assert_eq!(session.targets().len(), 4);
}

#[test]
fn instantiation_failure_discards_target_and_keeps_running() {
    let factory = RecordingFactory::failing(InstantiationError::Failed("pool exhausted".into()));
    let mut session = controller(factory);
    session.start(Duration::from_secs(10)).expect("start survives failed first spawn");

    let result = session.spawn_target();

    assert_eq!(
        result,
        Err(SessionError::TransientSpawn(SpawnFailure::Instantiation))
    );
    assert!(session.targets().is_empty());
    assert_eq!(session.score(), 0);
    assert_eq!(session.remaining(), Duration::from_secs(10));

    session.tick(Duration::from_secs(1));
    assert_eq!(session.phase(), Phase::Active);
    assert!(session.is_spawning());
}

#[test]
fn missing_capability_is_reported_as_binding_error() {
    let factory = RecordingFactory::failing(InstantiationError::MissingCapability);
    let mut session = controller(factory);
    session.start(Duration::from_secs(10)).expect("start");

    assert_eq!(
        session.spawn_target(),
        Err(SessionError::Binding(BindingError::MissingCapability))
    );
    assert!(session.targets().is_empty());
}

#[test]
fn holes_cannot_change_mid_session() {
    let mut session = controller(RecordingFactory::default());
    session.start(Duration::from_secs(10)).expect("start");

    let result = session.configure_holes(vec![Vec3::ONE]);

    assert_eq!(
        result,
        Err(SessionError::Configuration(
            ConfigurationError::SessionInProgress
        ))
    );
    assert_eq!(session.holes().len(), 9);
}

#[test]
fn single_hole_receives_every_spawn() {
    let factory = RecordingFactory::default();
    let mut session = explicit_controller(vec![Vec3::new(5.0, 0.0, 5.0)], factory.clone());
    session.start(Duration::from_secs(10)).expect("start");

    for _ in 0..3 {
        let _ = session.spawn_target().expect("spawn");
    }

    assert!(session
        .targets()
        .iter()
        .all(|target| target.hole() == HoleId::new(0)));
    assert_eq!(factory.created(), 4);
}

fn controller_with_period(spawn_period_secs: f32, factory: RecordingFactory) -> SessionController {
    let config = SessionConfig {
        spawn_period_secs,
        ..SessionConfig::default()
    };
    SessionController::new(&config).with_factory(factory)
}

#[test]
fn zero_spawn_period_is_rejected_at_start() {
    let factory = RecordingFactory::default();
    let mut session = controller_with_period(0.0, factory.clone());

    let result = session.start(Duration::from_secs(10));

    assert_eq!(
        result,
        Err(SessionError::Configuration(
            ConfigurationError::SpawnPeriodTooShort(Duration::ZERO)
        ))
    );
    assert_eq!(session.phase(), Phase::Idle);
    assert!(!session.is_spawning());
    assert_eq!(factory.created(), 0);
    assert!(matches!(
        session.take_events().last(),
        Some(Event::SessionRejected { .. })
    ));
}

#[test]
fn sub_frame_spawn_period_is_rejected_at_start() {
    let factory = RecordingFactory::default();
    let mut session = controller_with_period(1e-6, factory.clone());

    let result = session.start(Duration::from_secs(10));
    session.tick(Duration::from_millis(100));

    assert!(matches!(
        result,
        Err(SessionError::Configuration(
            ConfigurationError::SpawnPeriodTooShort(_)
        ))
    ));
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(factory.created(), 0);
}

#[test]
fn long_frame_spawns_a_bounded_batch() {
    let factory = RecordingFactory::default();
    let mut session = controller(factory.clone());
    session.start(Duration::from_secs(60)).expect("start");

    session.tick(Duration::from_secs(30));

    assert_eq!(factory.created(), 1 + MAX_SPAWNS_PER_TICK);
    assert_eq!(session.phase(), Phase::Active);
    assert!(session.is_spawning());
}

#[test]
fn stop_before_start_keeps_time_display_clear() {
    let time = LatestText::default();
    let mut session = controller(RecordingFactory::default())
        .with_hud(Hud::new().with_time_sink(time.clone()));

    session.stop();

    assert_eq!(session.phase(), Phase::Ended);
    assert_eq!(time.get(), None);
    assert_eq!(
        session.start(Duration::from_secs(10)),
        Err(SessionError::Configuration(
            ConfigurationError::AlreadyStarted
        ))
    );
}
