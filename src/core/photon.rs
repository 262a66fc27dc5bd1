// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector3f };

/// State of a photon packet during its walk through the slab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Vector3f,
    pub direction: Vector3f,
    pub weight: Float,
}

impl Default for Photon {
    /// Launched at the origin, normally incident on the entry face.
    fn default() -> Self {
        Self {
            position: Vector3f::zeros(),
            direction: Vector3f::new(0.0, 0.0, 1.0),
            weight: 1.0,
        }
    }
}

impl Photon {
    /// Distance along the current direction to the face the photon is
    /// heading for. Infinite when it travels parallel to the faces.
    pub fn distance_to_boundary(&self, thickness: Float) -> Float {
        let mu_z = self.direction.z;
        if mu_z > 0.0 {
            (thickness - self.position.z) / mu_z
        } else if mu_z < 0.0 {
            -self.position.z / mu_z
        } else {
            Float::INFINITY
        }
    }

    pub fn advance(&mut self, s: Float) {
        self.position += self.direction * s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photon_launch_state() {
        let photon = Photon::default();
        assert_eq!(photon.position, Vector3f::zeros());
        assert_eq!(photon.direction, Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(photon.weight, 1.0);
        assert_eq!(photon.distance_to_boundary(0.5), 0.5);
    }

    #[test]
    fn test_distance_to_boundary() {
        let mut photon = Photon::default();
        photon.position = Vector3f::new(0.3, -0.2, 0.25);

        photon.direction = Vector3f::new(0.6, 0.0, 0.8);
        assert!((photon.distance_to_boundary(1.0) - 0.9375).abs() < 1e-6);

        photon.direction = Vector3f::new(0.0, 0.6, -0.8);
        assert!((photon.distance_to_boundary(1.0) - 0.3125).abs() < 1e-6);

        photon.direction = Vector3f::new(1.0, 0.0, 0.0);
        assert!(photon.distance_to_boundary(1.0).is_infinite());
    }

    #[test]
    fn test_advance() {
        let mut photon = Photon::default();
        photon.advance(0.25);
        assert_eq!(photon.position, Vector3f::new(0.0, 0.0, 0.25));
    }
}
