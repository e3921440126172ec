/// A cached translation/rotation/scale triple.
///
/// Rotation is carried opaquely as a plain `(f32, f32, f32)` tuple (euler-ish
/// angles in whatever convention a caller chooses) rather than a real
/// quaternion: composing rotations needs an actual math library, which sits
/// outside this crate. `compose`/`decompose_local` below therefore only
/// combine translation and scale; a child's cached world rotation is a
/// straight copy of its local rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    pub position: (f32, f32, f32),
    pub scale: (f32, f32, f32),
    pub rotation: (f32, f32, f32),
}

impl Trs {
    pub fn from_position(position: (f32, f32, f32)) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn new(
        position: (f32, f32, f32),
        scale: (f32, f32, f32),
        rotation: (f32, f32, f32),
    ) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            position: (0.0, 0.0, 0.0),
            scale: (1.0, 1.0, 1.0),
            rotation: (0.0, 0.0, 0.0),
        }
    }
}

/// Folds a child's local pose into its parent's cached world pose.
///
/// Translation adds, scale multiplies component-wise, rotation is carried
/// through unchanged from `local`.
pub fn compose(parent_world: &Trs, local: &Trs) -> Trs {
    Trs {
        position: add(parent_world.position, local.position),
        scale: mul(parent_world.scale, local.scale),
        rotation: local.rotation,
    }
}

/// Inverse of [`compose`]: recovers the local pose that, composed under
/// `parent_world`, reproduces `world`. Used by `append_child(.., keep_world_pose: true)`
/// and by world-space setters.
pub fn decompose_local(parent_world: &Trs, world: &Trs) -> Trs {
    Trs {
        position: sub(world.position, parent_world.position),
        scale: div(world.scale, parent_world.scale),
        rotation: world.rotation,
    }
}

fn add(a: (f32, f32, f32), b: (f32, f32, f32)) -> (f32, f32, f32) {
    (a.0 + b.0, a.1 + b.1, a.2 + b.2)
}

fn sub(a: (f32, f32, f32), b: (f32, f32, f32)) -> (f32, f32, f32) {
    (a.0 - b.0, a.1 - b.1, a.2 - b.2)
}

fn mul(a: (f32, f32, f32), b: (f32, f32, f32)) -> (f32, f32, f32) {
    (a.0 * b.0, a.1 * b.1, a.2 * b.2)
}

fn div(a: (f32, f32, f32), b: (f32, f32, f32)) -> (f32, f32, f32) {
    (
        divide_or_zero(a.0, b.0),
        divide_or_zero(a.1, b.1),
        divide_or_zero(a.2, b.2),
    )
}

fn divide_or_zero(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        0.0
    } else {
        a / b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_adds_position_and_multiplies_scale() {
        let parent = Trs::new((10.0, 10.0, 0.0), (2.0, 2.0, 1.0), (0.0, 0.0, 0.0));
        let local = Trs::new((-50.0, -10.0, 0.0), (3.0, 3.0, 1.0), (0.0, 0.0, 0.0));
        let world = compose(&parent, &local);
        assert_eq!(world.position, (-40.0, 0.0, 0.0));
        assert_eq!(world.scale, (6.0, 6.0, 1.0));
    }

    #[test]
    fn decompose_local_is_the_inverse_of_compose() {
        let parent = Trs::new((10.0, 10.0, 0.0), (1.0, 1.0, 1.0), (0.0, 0.0, 0.0));
        let world = Trs::from_position((40.0, 40.0, 0.0));
        let local = decompose_local(&parent, &world);
        assert_eq!(local.position, (30.0, 30.0, 0.0));
        assert_eq!(compose(&parent, &local).position, world.position);
    }
}
