//! Script lifecycle, error isolation and mouse callbacks through the `Game`
//! driver.

use std::sync::{Arc, Mutex};

use glam::Vec2;

use kinetic2d::components::collider::{BoxCollider, Collider};
use kinetic2d::components::gameobject::GameObjectBuilder;
use kinetic2d::components::rigidbody::RigidBody;
use kinetic2d::components::script::{Script, ScriptContext, ScriptError, ScriptResult};
use kinetic2d::game::Game;
use kinetic2d::resources::gameconfig::GameConfig;

type Log = Arc<Mutex<Vec<String>>>;

fn game() -> Game {
    Game::new(GameConfig::new()).unwrap()
}

struct Lifecycle(Log);

impl Script for Lifecycle {
    fn awake(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        self.0.lock().unwrap().push("awake".into());
        Ok(())
    }
    fn start(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        self.0.lock().unwrap().push("start".into());
        Ok(())
    }
    fn fixed_update(&mut self, _ctx: &mut ScriptContext, dt: f32) -> ScriptResult {
        assert!((dt - 0.02).abs() < 1e-6);
        self.0.lock().unwrap().push("fixed".into());
        Ok(())
    }
    fn update(&mut self, _ctx: &mut ScriptContext, _dt: f32) -> ScriptResult {
        self.0.lock().unwrap().push("update".into());
        Ok(())
    }
}

#[test]
fn frame_phases_run_in_order() {
    let log = Log::default();
    let mut game = game();
    game.spawn(GameObjectBuilder::new("watcher").with_script(Lifecycle(log.clone())))
        .unwrap();
    // 0.05 runs two steps and leaves 0.01, completed by the next frame
    game.run_frame(0.05);
    game.run_frame(0.01);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["awake", "start", "fixed", "fixed", "update", "fixed", "update"]
    );
}

struct AlwaysFails;

impl Script for AlwaysFails {
    fn fixed_update(&mut self, _ctx: &mut ScriptContext, _dt: f32) -> ScriptResult {
        Err(ScriptError::msg("broken script"))
    }
}

struct Accelerate;

impl Script for Accelerate {
    fn fixed_update(&mut self, ctx: &mut ScriptContext, _dt: f32) -> ScriptResult {
        let mut rb = ctx
            .rigid_body()
            .ok_or_else(|| ScriptError::msg("no rigid body"))?;
        rb.velocity.x += 1.0;
        Ok(())
    }
}

#[test]
fn failing_script_does_not_stop_the_frame() {
    let mut game = game();
    let e = game
        .spawn(
            GameObjectBuilder::new("mixed")
                .with_rigid_body(RigidBody::new())
                .with_script(AlwaysFails)
                .with_script(Accelerate),
        )
        .unwrap();
    for _ in 0..3 {
        game.run_frame(0.02);
    }
    assert_eq!(game.world().get::<RigidBody>(e).unwrap().velocity.x, 3.0);
}

struct SpawnOnStart;

impl Script for SpawnOnStart {
    fn start(&mut self, ctx: &mut ScriptContext) -> ScriptResult {
        GameObjectBuilder::new("spawned")
            .at(Vec2::new(1.0, 1.0))
            .spawn(ctx.world)
            .map_err(|e| ScriptError::msg(e.to_string()))?;
        ctx.destroy_self();
        Ok(())
    }
}

#[test]
fn scripts_can_spawn_and_destroy() {
    let mut game = game();
    game.spawn(GameObjectBuilder::new("spawner").with_script(SpawnOnStart))
        .unwrap();
    assert_eq!(game.object_count(), 1);
    game.run_frame(0.02);
    assert_eq!(game.object_count(), 1);
    let names: Vec<String> = game
        .world_mut()
        .query::<&kinetic2d::components::gameobject::GameObject>()
        .iter(game.world())
        .map(|o| o.name.clone())
        .collect();
    assert_eq!(names, vec!["spawned".to_string()]);
}

struct Clicks(Log);

impl Script for Clicks {
    fn on_mouse_enter(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        self.0.lock().unwrap().push("enter".into());
        Ok(())
    }
    fn on_mouse_click(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        self.0.lock().unwrap().push("click".into());
        Ok(())
    }
    fn on_mouse_exit(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        self.0.lock().unwrap().push("exit".into());
        Ok(())
    }
}

#[test]
fn mouse_callbacks_follow_the_cursor() {
    let log = Log::default();
    let mut game = game();
    // default camera: 640x360 render, size 1, centred on the origin
    game.spawn(
        GameObjectBuilder::new("button")
            .at(Vec2::new(100.0, 50.0))
            .with_collider(Collider::new(BoxCollider::new(20.0, 20.0)))
            .with_script(Clicks(log.clone())),
    )
    .unwrap();

    game.cursor_mut().move_to(Vec2::new(420.0, 130.0));
    game.run_frame(0.02);
    game.cursor_mut().set_pressed(true);
    game.run_frame(0.02);
    game.cursor_mut().set_pressed(false);
    game.cursor_mut().move_to(Vec2::new(0.0, 0.0));
    game.run_frame(0.02);

    assert_eq!(*log.lock().unwrap(), vec!["enter", "click", "exit"]);
}
