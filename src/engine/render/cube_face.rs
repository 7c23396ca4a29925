//! # Cube Face Module
//!
//! This module defines the six faces of a cubic panorama and the geometry shared
//! by the renderer and the projection converter: each face's viewing basis, its
//! cell in the 4x3 cross layout, and the lookup from a direction to a face pixel.
//!
//! Coordinates are right-handed with Y up; the front face looks down -Z.

use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3};

/// The six faces of a cubic panorama.
///
/// The order is: [Front, Right, Back, Left, Top, Bottom]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum CubeFace {
    /// Looking straight ahead (-Z)
    Front = 0,
    /// Looking right (+X)
    Right = 1,
    /// Looking behind (+Z)
    Back = 2,
    /// Looking left (-X)
    Left = 3,
    /// Looking up (+Y)
    Top = 4,
    /// Looking down (-Y)
    Bottom = 5,
}

/// Orthonormal viewing basis of one face.
///
/// A face covers a 90 degree field of view: `forward` points at its center,
/// `right` and `up` span its image plane at unit distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBasis {
    /// Direction of the face center
    pub forward: Vector3<f32>,
    /// Direction of increasing image x
    pub right: Vector3<f32>,
    /// Direction of decreasing image y
    pub up: Vector3<f32>,
}

impl FaceBasis {
    /// Direction through the point `(u, v)` of the face, both in `[0, 1]` with
    /// `(0, 0)` the top-left corner.
    pub fn ray(&self, u: f32, v: f32) -> Vector3<f32> {
        (self.forward + self.right * (2.0 * u - 1.0) + self.up * (1.0 - 2.0 * v)).normalize()
    }

    /// The same basis turned by `rotation`.
    pub fn rotated(&self, rotation: Quaternion<f32>) -> Self {
        Self {
            forward: rotation * self.forward,
            right: rotation * self.right,
            up: rotation * self.up,
        }
    }
}

impl CubeFace {
    /// Returns all six faces in a consistent order.
    pub fn all() -> [CubeFace; 6] {
        [
            CubeFace::Front,
            CubeFace::Right,
            CubeFace::Back,
            CubeFace::Left,
            CubeFace::Top,
            CubeFace::Bottom,
        ]
    }

    /// Viewing basis of this face in the cube's own frame.
    ///
    /// The bases are chosen so neighboring faces share edges in the cross layout:
    /// the top face's bottom row continues the front face's top row, and so on.
    pub fn basis(self) -> FaceBasis {
        let (forward, right, up) = match self {
            CubeFace::Front => (-Vector3::unit_z(), Vector3::unit_x(), Vector3::unit_y()),
            CubeFace::Right => (Vector3::unit_x(), Vector3::unit_z(), Vector3::unit_y()),
            CubeFace::Back => (Vector3::unit_z(), -Vector3::unit_x(), Vector3::unit_y()),
            CubeFace::Left => (-Vector3::unit_x(), -Vector3::unit_z(), Vector3::unit_y()),
            CubeFace::Top => (Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
            CubeFace::Bottom => (-Vector3::unit_y(), Vector3::unit_x(), -Vector3::unit_z()),
        };
        FaceBasis { forward, right, up }
    }

    /// Cell `(column, row)` of this face in the 4x3 cross layout.
    ///
    /// ```text
    ///        [Top ]
    /// [Left ][Front][Right][Back]
    ///        [Bottom]
    /// ```
    pub fn layout_cell(self) -> (u32, u32) {
        match self {
            CubeFace::Left => (0, 1),
            CubeFace::Front => (1, 1),
            CubeFace::Right => (2, 1),
            CubeFace::Back => (3, 1),
            CubeFace::Top => (1, 0),
            CubeFace::Bottom => (1, 2),
        }
    }

    /// Finds the face a direction (in the cube's frame) passes through and the
    /// `(u, v)` coordinates of the hit on that face.
    pub fn locate(direction: Vector3<f32>) -> (CubeFace, f32, f32) {
        let mut best = CubeFace::Front;
        let mut best_dot = f32::MIN;
        for face in CubeFace::all() {
            let dot = direction.dot(face.basis().forward);
            if dot > best_dot {
                best = face;
                best_dot = dot;
            }
        }

        let basis = best.basis();
        let u = (direction.dot(basis.right) / best_dot + 1.0) * 0.5;
        let v = (1.0 - direction.dot(basis.up) / best_dot) * 0.5;
        (best, u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
    }
}

/// Where the cube's front face points in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeOrientation {
    /// Horizontal rotation, positive turns right
    pub yaw: Deg<f32>,
    /// Vertical rotation, positive looks up
    pub pitch: Deg<f32>,
}

impl CubeOrientation {
    /// Creates an orientation from yaw and pitch in degrees.
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw: Deg(yaw),
            pitch: Deg(pitch),
        }
    }

    /// Rotation from the cube's frame into world space.
    pub fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(-self.yaw) * Quaternion::from_angle_x(self.pitch)
    }
}

impl Default for CubeOrientation {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
