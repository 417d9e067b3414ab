//! Interactive 3D viewer for the cube using kiss3d.

use std::time::Instant;

use kiss3d::prelude::*;
use rubiks::{viewport_point, BlockPose, Coord, CubeConfig, RayPicker, RubiksCube, ViewCamera};

/// World units per cube-local unit; the cube spans about three world units.
const VIEW_SCALE: f32 = 10.0;
/// Vertical field of view of kiss3d's default perspective camera.
const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;

/// Base color of a block, derived from where it sits in the solved cube.
///
/// Blocks keep their color as they move, so a scrambled cube shows up as
/// a scrambled color gradient.
fn block_color(initial: Coord, highlighted: bool) -> Color {
    let channel = |v: i32| 0.5 + 0.35 * v as f32;
    let (r, g, b) = (channel(initial.x), channel(initial.y), channel(initial.z));
    if highlighted {
        Color::new((r + 0.3).min(1.0), (g + 0.3).min(1.0), (b + 0.3).min(1.0), 1.0)
    } else {
        Color::new(r, g, b, 1.0)
    }
}

/// Cube-local point to scene coordinates.
fn to_scene(v: glam::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z) * VIEW_SCALE
}

/// Scene point to cube-local coordinates.
fn from_scene(v: Vec3) -> glam::Vec3 {
    glam::Vec3::new(v.x, v.y, v.z) / VIEW_SCALE
}

/// Scene translation and rotation of a block.
fn scene_transform(pose: &BlockPose) -> (Vec3, Quat) {
    let q = pose.rotation;
    (to_scene(pose.translation), Quat::from_xyzw(q.x, q.y, q.z, q.w))
}

/// Opens a window and lets the user turn layers with the mouse.
pub fn display(config: CubeConfig) -> Result<(), rubiks::ConfigError> {
    let block_size = config.block_size;
    let camera = ViewCamera {
        eye: glam::Vec3::new(0.0, 0.0, 1.0),
        target: glam::Vec3::ZERO,
        up: glam::Vec3::Y,
        fov_y: FOV_Y,
    };
    let cube = RubiksCube::new(config, RayPicker::new(camera, block_size))?;
    pollster::block_on(display_async(cube));
    Ok(())
}

async fn display_async(mut cube: RubiksCube) {
    let mut window =
        Window::new("Rubik's cube - drag a layer to turn it, [R] reset, [Esc] quit").await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(8.0);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(5.0, 5.0, 5.0));

    let rendered_size = cube.block_size() * VIEW_SCALE * 0.95;
    let mut nodes: Vec<SceneNode3d> = cube
        .poses()
        .iter()
        .map(|pose| {
            scene
                .add_cube(rendered_size, rendered_size, rendered_size)
                .set_color(block_color(pose.initial_coordinate, false))
                .set_position(to_scene(pose.translation))
        })
        .collect();

    let start = Instant::now();
    let mut cursor: Option<glam::Vec2> = None;
    let mut was_solved = cube.solved();

    loop {
        let (width, height) = (window.width(), window.height());
        cube.set_picker(RayPicker::new(
            ViewCamera {
                eye: from_scene(camera.eye()),
                target: glam::Vec3::ZERO,
                up: glam::Vec3::Y,
                fov_y: FOV_Y,
            },
            cube.block_size(),
        ));

        for mut event in window.events().iter() {
            use kiss3d::event::{Action, Key, MouseButton, WindowEvent};
            match event.value {
                WindowEvent::Key(Key::R, Action::Press, _) => {
                    cube.reset();
                }
                WindowEvent::MouseButton(MouseButton::Button1, Action::Press, _) => {
                    // a press that grabs a layer must not also orbit the camera
                    if let Some(point) = cursor {
                        if cube.pointer_down(point) {
                            event.inhibited = true;
                        }
                    }
                }
                WindowEvent::MouseButton(MouseButton::Button1, Action::Release, _) => {
                    if cube.session().is_some() {
                        event.inhibited = true;
                    }
                    cube.pointer_up();
                }
                WindowEvent::CursorPos(x, y, _) => {
                    let point = viewport_point(x, y, width, height);
                    cursor = Some(point);
                    if cube.session().is_some() {
                        event.inhibited = true;
                    }
                    cube.pointer_move(point);
                }
                _ => {}
            }
        }

        cube.on_frame(start.elapsed().as_secs_f64() * 1000.0);

        for (node, pose) in nodes.iter_mut().zip(cube.poses()) {
            let (position, rotation) = scene_transform(&pose);
            node.set_position(position);
            node.set_rotation(rotation);
            node.set_color(block_color(pose.initial_coordinate, pose.highlighted));
        }

        let solved = cube.solved();
        if solved != was_solved {
            window.set_title(if solved {
                "Rubik's cube - solved!"
            } else {
                "Rubik's cube - drag a layer to turn it, [R] reset, [Esc] quit"
            });
            was_solved = solved;
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }

    for mut node in nodes.drain(..) {
        node.remove();
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;
    use rubiks::{Hit, RotationPhase};

    #[test]
    fn test_grabbed_layer_is_drawn_turned() {
        let config = CubeConfig {
            animate_assembly: false,
            ..CubeConfig::default()
        };
        let picker = |_: glam::Vec2, _: &[BlockPose]| -> Option<Hit> {
            Some(Hit {
                block: 26,
                surface_point: glam::Vec3::Y,
            })
        };
        let mut cube = RubiksCube::new(config, picker).expect("default config is valid");
        let mut clock = 0.0;
        cube.on_frame(clock);
        cube.pointer_down(glam::Vec2::X);
        while cube.phase() == RotationPhase::Selecting {
            clock += 16.0;
            cube.on_frame(clock);
        }
        // 15 degrees of pointer travel turns the top layer by 45
        cube.pointer_move(glam::Vec2::from_angle(15f32.to_radians()));

        let poses = cube.poses();
        let (_, turned) = scene_transform(&poses[26]);
        let (_, resting) = scene_transform(&poses[0]);
        let (axis, angle) = turned.to_axis_angle();
        assert!((angle - FRAC_PI_4).abs() < 1e-4, "top layer drawn at {angle} rad");
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-4), "turned about {axis}");
        assert!(resting.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
