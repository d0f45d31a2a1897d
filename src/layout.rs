use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One circular arrangement of evenly spaced slots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingSpec {
    pub count: usize,
    pub radius: f32,
    #[serde(rename = "y")]
    pub y_offset: f32,
    #[serde(rename = "tilt")]
    pub tilt_degrees: f32,
    /// Starting angle in radians
    #[serde(default, rename = "offset")]
    pub angular_offset: f32,
}

impl RingSpec {
    pub const fn new(count: usize, radius: f32, y_offset: f32, tilt_degrees: f32) -> Self {
        Self {
            count,
            radius,
            y_offset,
            tilt_degrees,
            angular_offset: 0.0,
        }
    }

    pub const fn with_offset(mut self, angular_offset: f32) -> Self {
        self.angular_offset = angular_offset;
        self
    }
}

/// A fixed place in the bouquet where a single flower may stand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub index: usize,
    pub position: Vec3,
    /// Radians
    pub tilt_angle: f32,
}

impl Slot {
    pub fn is_center(&self) -> bool {
        self.position.x == 0.0 && self.position.z == 0.0
    }

    /// World transform of a flower standing in this slot: moved to the slot,
    /// turned to face away from the centre, then leaned outwards by the tilt.
    pub fn placement(&self) -> Mat4 {
        let yaw = if self.is_center() {
            0.0
        } else {
            self.position.x.atan2(self.position.z)
        };
        let rotation = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(self.tilt_angle);
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

/// Lays out bouquet slots: the optional centre slot first, then every ring
/// in order, each ring's slots counter-clockwise from its angular offset.
pub fn generate_slots(rings: &[RingSpec], include_center: bool) -> Vec<Slot> {
    let center = include_center.then_some((Vec3::ZERO, 0.0));

    let ring_slots = rings.iter().flat_map(|ring| {
        let tilt = ring.tilt_degrees.to_radians();
        (0..ring.count).map(move |i| {
            let theta = (i as f32 / ring.count as f32) * std::f32::consts::TAU + ring.angular_offset;
            let position = Vec3::new(
                ring.radius * theta.cos(),
                ring.y_offset,
                ring.radius * theta.sin(),
            );
            (position, tilt)
        })
    });

    center
        .into_iter()
        .chain(ring_slots)
        .enumerate()
        .map(|(index, (position, tilt_angle))| Slot {
            index,
            position,
            tilt_angle,
        })
        .collect()
}
