use screen_reveal::motion::helix::HelixLayout;
use screen_reveal::{
    Direction, Director, InputOutcome, Layer, Mode, SceneError, SceneEvent, ScenePackage,
};
use std::error::Error;

const DT: f32 = 1.0 / 60.0;

fn run(director: &mut Director, secs: f32) -> Vec<SceneEvent> {
    let steps = (secs / DT).round() as usize;
    (0..steps).flat_map(|_| director.tick(DT).events).collect()
}

fn started(events: &[SceneEvent], direction: Direction) -> usize {
    events
        .iter()
        .filter(|e| **e == SceneEvent::TransitionStarted(direction))
        .count()
}

#[test]
fn overscroll_clamps_and_fires_one_forward_transition() -> Result<(), Box<dyn Error>> {
    let mut director = ScenePackage::default().director()?;
    for _ in 0..50 {
        director.on_input(400.0);
    }
    let max_scroll = director.config().dolly.max_scroll;
    assert_eq!(director.scroll().scroll_z().target(), max_scroll);

    let mut events = Vec::new();
    for _ in 0..20 {
        events.extend(run(&mut director, 0.5));
        // Input keeps arriving while the cut plays out; it must not re-trigger.
        director.on_input(400.0);
    }
    assert_eq!(started(&events, Direction::Forward), 1);
    assert_eq!(director.mode(), Mode::Spiral);
    Ok(())
}

#[test]
fn backing_off_one_pixel_after_a_flick_still_cuts_through() -> Result<(), Box<dyn Error>> {
    let mut director = ScenePackage::default().director()?;
    director.on_input(6000.0);
    director.on_input(-1.0);
    let events = run(&mut director, 10.0);
    assert_eq!(started(&events, Direction::Forward), 1);
    assert_eq!(director.tick(0.0).mode, Mode::Spiral);
    Ok(())
}

#[test]
fn reverse_lands_on_the_stored_scroll_position() -> Result<(), Box<dyn Error>> {
    let mut director = ScenePackage::default().director()?;
    director.on_input(6000.0);
    run(&mut director, 6.0);
    assert_eq!(director.mode(), Mode::Spiral);
    let stored = director
        .transition()
        .stored_scroll_z()
        .ok_or("no stored scroll position")?;

    assert_eq!(
        director.on_input(-300.0),
        InputOutcome::SwitchRequested(Direction::Reverse)
    );
    let events = run(&mut director, 2.0);
    assert_eq!(started(&events, Direction::Reverse), 1);
    assert!(events.contains(&SceneEvent::LayersSwapped(Layer::Intro)));

    let frame = director.tick(0.0);
    assert_eq!(frame.mode, Mode::Intro);
    assert_eq!(frame.scroll_z, stored);
    assert!(frame.cards.is_empty());
    assert_eq!(frame.blackout, 0.0);
    Ok(())
}

#[test]
fn zero_dt_ticks_change_nothing() -> Result<(), Box<dyn Error>> {
    let mut director = ScenePackage::default().director()?;
    director.on_input(1200.0);
    run(&mut director, 0.5);
    let first = director.tick(0.0);
    for _ in 0..5 {
        assert_eq!(director.tick(0.0), first);
    }
    Ok(())
}

#[test]
fn helix_of_eight_at_focus_two() -> Result<(), Box<dyn Error>> {
    let package = ScenePackage::default();
    let layout = HelixLayout::from_config(&package.config.helix);
    let slots = layout.layout(package.items.len(), 2.0);

    let front = &slots[2];
    assert!(front.translation.x.abs() < 1e-5);
    assert!(slots
        .iter()
        .filter(|s| s.index != 2)
        .all(|s| s.translation.z < front.translation.z));
    assert_eq!(front.scale, 1.0);
    assert_eq!(front.opacity, 1.0);

    // Two slots either side of focus both land half a turn away, stacked vertically.
    let (a, b) = (&slots[0], &slots[4]);
    assert!((a.translation.x - b.translation.x).abs() < 1e-4);
    assert!((a.translation.z - b.translation.z).abs() < 1e-4);
    let spacing = package.config.helix.vertical_spacing;
    assert!((a.translation.y - b.translation.y - 4.0 * spacing).abs() < 1e-4);
    assert!(slots.iter().all(|s| s.scale <= front.scale));
    Ok(())
}

#[test]
fn oversized_screen_is_a_construction_error() -> Result<(), Box<dyn Error>> {
    let mut package = ScenePackage::default();
    package.config.tv.screen.x = package.config.tv.cabinet.x * 2.0;
    let err = package.blueprint().err().ok_or("blueprint should fail")?;
    assert!(matches!(
        err.downcast_ref::<SceneError>(),
        Some(SceneError::Construction(_))
    ));
    Ok(())
}

#[test]
fn package_loads_from_json_bytes() -> Result<(), Box<dyn Error>> {
    let package = ScenePackage::from_bytes(
        br#"{ "transition": { "style": "cut" } }"#,
        br##"{ "items": [ { "title": "Only", "color": "#336699" } ] }"##,
    )?;
    assert_eq!(package.items.len(), 1);
    let mut director = package.director()?;
    director.on_input(6000.0);
    let events = run(&mut director, 6.0);
    assert_eq!(started(&events, Direction::Forward), 1);
    assert_eq!(director.tick(0.0).focused, Some(0));
    Ok(())
}
