//! Whole-game state and scene construction.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::assets::TextureKey;
use crate::sim::aabb::Aabb;
use crate::sim::button::Button;
use crate::sim::camera::Camera;
use crate::sim::cutscene::Cutscene;
use crate::sim::grab::Grab;
use crate::sim::object::{FaceTextures, GameObject, Room, Shape};
use crate::sim::puzzle::{AnamorphicPuzzle, DoorGoal};
use crate::sim::wall::WallWithHole;

/// A wall entity: decomposed geometry plus which room it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallEntity {
    pub room: Room,
    pub wall: WallWithHole,
}

/// Complete simulation state. Serializable for saves; visual-only pools
/// and trails are skipped and rebuilt during play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    pub tick_count: u64,
    pub camera: Camera,
    pub objects: Vec<GameObject>,
    pub walls: Vec<WallEntity>,
    /// Room 1 left/right plates, then the Room 2 plate
    pub buttons: [Button; 3],
    pub puzzle: AnamorphicPuzzle,
    pub door_goal: DoorGoal,
    pub cutscene: Cutscene,
    pub level_clear: bool,
    pub puzzle_clear: bool,
    pub held: Option<Grab>,
    pub cube_id: u32,
    pub sphere_id: u32,
    pub door_id: u32,
    pub box_id: u32,
    pub exit_door_id: u32,
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Colors of the fixed scenery
const FLOOR_COLOR: Vec3 = Vec3::new(0.45, 0.45, 0.48);
const WALL_COLOR: Vec3 = Vec3::new(0.72, 0.70, 0.65);
const CEILING_COLOR: Vec3 = Vec3::new(0.80, 0.80, 0.82);

impl GameState {
    pub fn new(seed: u64) -> Self {
        let mut builder = SceneBuilder::default();

        // Room 1 scenery
        builder.cuboid(Room::Room1, Vec3::new(0.0, -0.5, 0.0), Vec3::new(40.0, 1.0, 40.0), FLOOR_COLOR);
        builder.cuboid(Room::Room1, Vec3::new(0.0, 7.5, 20.0), Vec3::new(40.0, 15.0, 2.0), WALL_COLOR);
        builder.cuboid(Room::Room1, Vec3::new(0.0, 15.5, 0.0), Vec3::new(40.0, 1.0, 40.0), CEILING_COLOR);
        // Front wall around the doorway, plus the lintel above it
        builder.cuboid(Room::Room1, Vec3::new(-12.0, 7.5, -20.0), Vec3::new(16.0, 15.0, 2.0), WALL_COLOR);
        builder.cuboid(Room::Room1, Vec3::new(12.0, 7.5, -20.0), Vec3::new(16.0, 15.0, 2.0), WALL_COLOR);
        builder.cuboid(Room::Room1, Vec3::new(0.0, 12.5, -20.0), Vec3::new(8.0, 5.0, 2.0), WALL_COLOR);
        // The exit door blocks the doorway until the room is cleared
        let exit_door_id = builder.cuboid(
            Room::Room1,
            Vec3::new(0.0, 5.0, -20.0),
            Vec3::new(8.0, 10.0, 1.0),
            Vec3::new(0.35, 0.27, 0.18),
        );

        // Room 2 scenery
        builder.cuboid(Room::Room2, Vec3::new(0.0, -0.5, -40.0), Vec3::new(40.0, 1.0, 40.0), FLOOR_COLOR);
        builder.cuboid(Room::Room2, Vec3::new(0.0, 7.5, -60.0), Vec3::new(40.0, 15.0, 2.0), WALL_COLOR);
        builder.cuboid(Room::Room2, Vec3::new(-20.0, 7.5, -40.0), Vec3::new(2.0, 15.0, 40.0), WALL_COLOR);
        builder.cuboid(Room::Room2, Vec3::new(0.0, 15.5, -40.0), Vec3::new(40.0, 1.0, 40.0), CEILING_COLOR);

        // Grabbables
        let cube_id = builder.dynamic(
            Shape::Cube,
            Room::Room1,
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::splat(2.0),
            Vec3::new(0.85, 0.25, 0.20),
            5.0,
        );
        let sphere_id = builder.dynamic(
            Shape::Sphere,
            Room::Room1,
            Vec3::new(-5.0, 5.0, 5.0),
            Vec3::splat(2.0),
            Vec3::new(0.20, 0.45, 0.90),
            2.0,
        );
        let door_id = builder.dynamic(
            Shape::Cube,
            Room::Room1,
            Vec3::new(0.0, 2.0, 10.0),
            Vec3::new(2.6, 4.0, 0.2),
            Vec3::new(0.60, 0.42, 0.24),
            3.0,
        );
        // Wood grain on the door's front face only
        builder.objects[door_id as usize].face_textures = Some(FaceTextures {
            front: Some(TextureKey::Door),
            top: None,
            sides: None,
        });

        // The puzzle reward box: static and ungrabbable until solved
        let box_id = {
            let mut obj = GameObject::new(
                builder.next_id(),
                Shape::Cube,
                Vec3::new(1.8, 5.2, -42.0),
                Vec3::splat(4.6),
            );
            obj.room = Room::Room2;
            obj.rotation = Vec3::new(95.0, 67.0, 18.0);
            obj.color = Vec3::new(0.9, 0.85, 0.75);
            obj.mass = 4.0;
            obj.face_textures = Some(FaceTextures {
                front: Some(TextureKey::BoxFront),
                top: Some(TextureKey::BoxTop),
                sides: Some(TextureKey::BoxSide),
            });
            let id = obj.id;
            builder.objects.push(obj);
            id
        };

        let walls = vec![
            WallEntity {
                room: Room::Room1,
                wall: WallWithHole::new(
                    Vec3::new(-20.0, 7.5, 0.0),
                    Vec3::new(40.0, 15.0, 2.0),
                    Vec3::new(4.0, 4.0, 4.0),
                    90.0,
                    WALL_COLOR,
                ),
            },
            WallEntity {
                room: Room::Room1,
                wall: WallWithHole::new(
                    Vec3::new(20.0, 7.5, 0.0),
                    Vec3::new(40.0, 15.0, 2.0),
                    Vec3::new(4.0, 4.0, 4.0),
                    -90.0,
                    WALL_COLOR,
                ),
            },
            WallEntity {
                room: Room::Room2,
                wall: WallWithHole::new(
                    Vec3::new(20.0, 7.5, -40.0),
                    Vec3::new(40.0, 15.0, 2.0),
                    Vec3::new(4.0, 4.0, 4.0),
                    -90.0,
                    WALL_COLOR,
                ),
            },
        ];

        let buttons = [
            Button::new(Vec3::new(-20.0, 5.5, 0.0), sphere_id),
            Button::new(Vec3::new(20.0, 5.5, 0.0), cube_id),
            Button::new(Vec3::new(20.0, 5.5, -40.0), box_id),
        ];

        Self {
            seed,
            tick_count: 0,
            camera: Camera::new(Vec3::new(0.0, 4.0, 15.0)),
            objects: builder.objects,
            walls,
            buttons,
            puzzle: AnamorphicPuzzle::new(seed),
            door_goal: DoorGoal {
                position: Vec3::new(0.0, 2.0, -20.0),
                scale: Vec3::new(2.6, 4.0, 0.2),
            },
            cutscene: Cutscene::default(),
            level_clear: false,
            puzzle_clear: false,
            held: None,
            cube_id,
            sphere_id,
            door_id,
            box_id,
            exit_door_id,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn object(&self, id: u32) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: u32) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Whether the exit door still blocks the doorway.
    pub fn exit_door_present(&self) -> bool {
        !self.level_clear
    }

    pub fn wall_refs(&self) -> Vec<&WallWithHole> {
        self.walls.iter().map(|w| &w.wall).collect()
    }

    /// Every solid box the held-object raycast can land on: objects (minus
    /// the excluded one and the cleared exit door) plus all wall pieces.
    pub fn obstacle_aabbs(&self, exclude: Option<u32>) -> Vec<Aabb> {
        let mut boxes = Vec::with_capacity(self.objects.len() + self.walls.len() * 5);
        for obj in &self.objects {
            if Some(obj.id) == exclude {
                continue;
            }
            if obj.id == self.exit_door_id && !self.exit_door_present() {
                continue;
            }
            boxes.push(obj.aabb());
        }
        for entity in &self.walls {
            for seg in &entity.wall.segments {
                boxes.push(Aabb::from_center_scale(seg.position, seg.scale));
            }
        }
        boxes
    }
}

/// Incremental scene construction with sequential entity ids.
#[derive(Default)]
struct SceneBuilder {
    objects: Vec<GameObject>,
}

impl SceneBuilder {
    fn next_id(&self) -> u32 {
        self.objects.len() as u32
    }

    fn cuboid(&mut self, room: Room, position: Vec3, scale: Vec3, color: Vec3) -> u32 {
        let mut obj = GameObject::new(self.next_id(), Shape::Cube, position, scale);
        obj.room = room;
        obj.color = color;
        let id = obj.id;
        self.objects.push(obj);
        id
    }

    fn dynamic(
        &mut self,
        shape: Shape,
        room: Room,
        position: Vec3,
        scale: Vec3,
        color: Vec3,
        mass: f32,
    ) -> u32 {
        let id = self.cuboid(room, position, scale, color);
        let obj = &mut self.objects[id as usize];
        obj.shape = shape;
        obj.is_static = false;
        obj.grabbable = true;
        obj.mass = mass;
        id
    }
}
