/// A 2D affine transformation stored as a row-major 3x3 matrix.
///
/// This is the draw matrix the host scene graph hands us: it maps an element's
/// local coordinates into screen space. The outline only ever needs to push
/// points through it and pull the scale back out of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Matrix data in row-major order: [row0, row1, row2]
    pub data: [f32; 9],
}

impl Transform {
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, // row 0
            0.0, 1.0, 0.0, // row 1
            0.0, 0.0, 1.0, // row 2
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            data: [
                1.0, 0.0, x, // row 0
                0.0, 1.0, y, // row 1
                0.0, 0.0, 1.0, // row 2
            ],
        }
    }

    pub fn rotate_degrees(angle_degrees: f32) -> Self {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Self {
            data: [
                cos, -sin, 0.0, // row 0
                sin, cos, 0.0, // row 1
                0.0, 0.0, 1.0, // row 2
            ],
        }
    }

    pub fn scale(s: f32) -> Self {
        Self::scale_xy(s, s)
    }

    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self {
            data: [
                sx, 0.0, 0.0, // row 0
                0.0, sy, 0.0, // row 1
                0.0, 0.0, 1.0, // row 2
            ],
        }
    }

    /// Compose this transform with another: self * other.
    /// Applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Transform {
        let a = &self.data;
        let b = &other.data;
        let mut result = [0.0f32; 9];

        for row in 0..3 {
            for col in 0..3 {
                result[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
            }
        }

        Transform { data: result }
    }

    /// Inverse of the affine part. Degenerate matrices invert to identity.
    pub fn inverse(&self) -> Transform {
        let [a, b, tx, c, d, ty, ..] = self.data;
        let det = a * d - b * c;

        if det.abs() < 1e-10 {
            return Self::IDENTITY;
        }

        let inv = 1.0 / det;
        Transform {
            data: [
                d * inv,
                -b * inv,
                (b * ty - d * tx) * inv,
                -c * inv,
                a * inv,
                (c * tx - a * ty) * inv,
                0.0,
                0.0,
                1.0,
            ],
        }
    }

    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.data;
        (m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5])
    }

    /// Length of the transformed basis vectors.
    ///
    /// Only meaningful for uniform, non-skewed transforms; under skew the two
    /// components no longer describe independent axis scales.
    pub fn extract_scale(&self) -> (f32, f32) {
        let m = &self.data;
        (m[0].hypot(m[3]), m[1].hypot(m[4]))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
