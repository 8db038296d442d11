use std::time::Duration;

use overworld_core::{CellCoord, Command, Event, Facing, GameMode, MotionState, TerrainKind};
use overworld_system_encounter::{Config, Encounter, EncounterContext};
use overworld_world::{self as world, query, MapLayout, World, WorldConfig};

const ELIGIBLE: EncounterContext = EncounterContext {
    game_mode: GameMode::Roaming,
    motion: MotionState::Idle,
    terrain: Some(TerrainKind::Grass),
};

fn tick_events(dt: Duration) -> Vec<Event> {
    vec![Event::TimeAdvanced { dt }]
}

fn count_triggers(rate: f64, seed: u64, tick: Duration, total: Duration) -> u64 {
    let mut encounter = Encounter::new(Config::new(rate, seed, vec!["!".to_owned()]));
    let ticks = (total.as_secs_f64() / tick.as_secs_f64()).round() as u64;
    let events = tick_events(tick);
    let mut out = Vec::new();
    for _ in 0..ticks {
        encounter.handle(&events, ELIGIBLE, &mut out);
    }
    assert_eq!(out.len() as u64, encounter.triggered());
    encounter.triggered()
}

#[test]
fn frequency_does_not_depend_on_tick_rate() {
    let total = Duration::from_secs(2_000);
    let at_60hz = count_triggers(1.0, 11, Duration::from_micros(16_667), total);
    let at_30hz = count_triggers(1.0, 12, Duration::from_micros(33_333), total);
    for count in [at_60hz, at_30hz] {
        assert!((1_800..=2_200).contains(&count), "unexpected count {count}");
    }
}

#[test]
fn same_seed_replays_identically() {
    let tick = Duration::from_micros(16_667);
    let total = Duration::from_secs(300);
    assert_eq!(
        count_triggers(0.1, 99, tick, total),
        count_triggers(0.1, 99, tick, total)
    );
}

#[test]
fn only_idle_roaming_players_on_grass_are_checked() {
    let ineligible = [
        EncounterContext {
            game_mode: GameMode::Dialogue,
            ..ELIGIBLE
        },
        EncounterContext {
            motion: MotionState::Transitioning,
            ..ELIGIBLE
        },
        EncounterContext {
            terrain: Some(TerrainKind::Water),
            ..ELIGIBLE
        },
        EncounterContext {
            terrain: None,
            ..ELIGIBLE
        },
    ];
    let events = tick_events(Duration::from_secs(1));
    for context in ineligible {
        let mut encounter = Encounter::new(Config::new(1.0e9, 0, vec!["!".to_owned()]));
        let mut out = Vec::new();
        encounter.handle(&events, context, &mut out);
        assert!(out.is_empty(), "{context:?} triggered an encounter");
    }
}

#[test]
fn encounter_opens_dialogue_in_the_world() {
    let layout = MapLayout::from_glyph_rows(&["###", "#.#", "###"], CellCoord::new(1, 1), Facing::Down)
        .expect("valid rows");
    let mut world = World::new(layout, WorldConfig::default()).expect("valid world");
    let mut encounter = Encounter::new(Config::new(1.0e9, 3, vec!["A wild thing!".to_owned()]));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_micros(16_667),
        },
        &mut events,
    );
    let actor = query::actor(&world);
    let context = EncounterContext {
        game_mode: query::game_mode(&world),
        motion: actor.motion,
        terrain: query::terrain_under_actor(&world),
    };
    let mut commands = Vec::new();
    encounter.handle(&events, context, &mut commands);
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    assert_eq!(query::game_mode(&world), GameMode::Dialogue);
    assert_eq!(
        query::dialogue(&world).map(|view| view.current_line()),
        Some("A wild thing!")
    );
}

#[test]
fn no_time_means_no_roll() {
    let mut encounter = Encounter::new(Config::new(1.0e9, 0, vec!["!".to_owned()]));
    let mut out = Vec::new();
    encounter.handle(&[Event::DialogueClosed], ELIGIBLE, &mut out);
    assert!(out.is_empty());
}
