//! Fixed-timestep simulation tick.

use glam::{Vec2, Vec3};

use crate::consts::{LOOK_SENSITIVITY, MOVE_SPEED};
use crate::sim::camera::MoveDir;
use crate::sim::cutscene::Phase;
use crate::sim::grab;
use crate::sim::puzzle::door_fits;
use crate::sim::state::GameState;
use crate::sim::world::floor_height_at;

/// Input snapshot for one tick. Movement keys are level-triggered;
/// `click` is a one-shot the caller clears after the tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub move_forward: bool,
    pub move_back: bool,
    pub move_left: bool,
    pub move_right: bool,
    /// Mouse delta in pixels since the last tick
    pub look_delta: Vec2,
    pub click: bool,
}

/// Advance the simulation by one fixed step.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.tick_count += 1;

    // Outside normal play only the cut-scene runs; input is ignored
    if state.cutscene.phase != Phase::Normal {
        state.cutscene.advance(&mut state.rng);
        return;
    }

    apply_look_and_movement(state, input, dt);

    if input.click {
        handle_click(state);
    }

    update_buttons(state);
    update_objects(state, dt);

    // Burns residual fuel if a save was made mid-explosion
    state.cutscene.advance(&mut state.rng);
}

fn apply_look_and_movement(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.look_delta != Vec2::ZERO {
        state
            .camera
            .process_mouse(input.look_delta.x, input.look_delta.y, LOOK_SENSITIVITY);
    }

    let stride = MOVE_SPEED * dt;
    let clear = state.level_clear;
    if input.move_forward {
        state.camera.step(MoveDir::Forward, stride, clear);
    }
    if input.move_back {
        state.camera.step(MoveDir::Back, stride, clear);
    }
    if input.move_left {
        state.camera.step(MoveDir::Left, stride, clear);
    }
    if input.move_right {
        state.camera.step(MoveDir::Right, stride, clear);
    }
}

fn handle_click(state: &mut GameState) {
    // Standing at the projector with the level cleared solves the puzzle
    if !state.puzzle_clear
        && state.level_clear
        && state.puzzle.solved_from(state.camera.position)
    {
        solve_puzzle(state);
        return;
    }

    if let Some(held) = state.held.take() {
        release(state, held.object_id);
        return;
    }

    state.held = grab::pick(&state.camera, &state.objects);
}

fn solve_puzzle(state: &mut GameState) {
    state.puzzle_clear = true;

    // Snap the view to the projector pose so the reveal lines up
    let target = state.puzzle.look_target;
    state.camera.position = state.puzzle.projector_pos;
    state.camera.look_at(target);

    // The picture collapses into a real, movable box
    if let Some(reward) = state.object_mut(state.box_id) {
        reward.is_static = false;
        reward.grabbable = true;
    }
}

fn release(state: &mut GameState, object_id: u32) {
    if object_id != state.door_id {
        return;
    }
    let goal = state.door_goal;
    let fits = state
        .object(state.door_id)
        .is_some_and(|door| door_fits(door, &goal));
    if !fits {
        return;
    }
    if let Some(door) = state.object_mut(state.door_id) {
        // Snap into the cutout and swing open
        door.position = goal.position + Vec3::new(-1.2, 0.0, -1.0);
        door.scale = goal.scale;
        door.rotation = Vec3::new(0.0, 85.0, 0.0);
        door.velocity = Vec3::ZERO;
        door.is_static = true;
        door.grabbable = false;
    }
    state.level_clear = true;
}

fn update_buttons(state: &mut GameState) {
    for i in 0..state.buttons.len() {
        let btn = state.buttons[i];
        if let Some(target) = state.object(btn.target_id) {
            state.buttons[i].pressed =
                crate::sim::button::is_pressed(btn.position, target.position, target.scale);
        }
    }

    // Room 1 clears on both plates; the clear latches
    if state.buttons[0].pressed && state.buttons[1].pressed {
        state.level_clear = true;
    }

    // The Room 2 plate starts the ending
    if state.buttons[2].pressed && state.cutscene.phase == Phase::Normal {
        state.held = None;
        let cam = &state.camera;
        state
            .cutscene
            .start_transition(cam.position, cam.front, cam.up);
    }
}

fn update_objects(state: &mut GameState, dt: f32) {
    let held_id = state.held.map(|g| g.object_id);

    // Re-project the held object against the scenery
    if let Some(held) = state.held {
        let obstacles = state.obstacle_aabbs(Some(held.object_id));
        let (position, scale) = grab::resolve_held(&state.camera, &held, &obstacles);
        if let Some(obj) = state.object_mut(held.object_id) {
            obj.position = position;
            obj.scale = scale;
            obj.velocity = Vec3::ZERO;
            obj.rotation = Vec3::ZERO;
        }
    }

    // Physics for everything free, trails for the grabbables
    let wall_refs: Vec<_> = state.walls.iter().map(|w| &w.wall).collect();
    for obj in &mut state.objects {
        let is_held = Some(obj.id) == held_id;
        if !is_held {
            let floor_y = floor_height_at(obj.position, obj.scale, &wall_refs);
            obj.update_physics(dt, floor_y);
        }
        if obj.grabbable {
            obj.update_trail(is_held);
        }
    }
}
