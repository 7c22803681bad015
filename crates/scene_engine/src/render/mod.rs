//! Rendering backend boundary
//!
//! The engine does not own a GPU backend; it hands one matrix payload per
//! primitive per frame across this trait. An empty palette means the
//! primitive is not skinned and the backend should bind a single identity
//! matrix instead.

use crate::foundation::math::{mat4_to_columns, Mat4};

/// Destination for per-primitive draw submissions
pub trait RenderBackend {
    /// Submit one primitive: the owning object's world matrix plus the
    /// skinning palette in bone-index order (empty = non-skinned)
    fn submit_skinned(&mut self, world: Mat4, palette: &[Mat4]);
}

/// One captured draw submission
#[derive(Debug, Clone)]
pub struct SkinnedDraw {
    /// World matrix of the submitting object
    pub world: Mat4,
    /// Skinning palette at submission time
    pub palette: Vec<Mat4>,
}

/// Backend that records submissions instead of rendering
///
/// Used by tests and headless tools to observe exactly what a real
/// backend would receive.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Submissions in draw order
    pub draws: Vec<SkinnedDraw>,
}

impl RecordingBackend {
    /// Create an empty recording backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all recorded submissions
    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn submit_skinned(&mut self, world: Mat4, palette: &[Mat4]) {
        self.draws.push(SkinnedDraw {
            world,
            palette: palette.to_vec(),
        });
    }
}

/// Convert a palette to column-major arrays ready for buffer upload
pub fn palette_to_columns(palette: &[Mat4]) -> Vec<[[f32; 4]; 4]> {
    palette.iter().map(mat4_to_columns).collect()
}

/// View column-major palette data as raw bytes
pub fn palette_bytes(columns: &[[[f32; 4]; 4]]) -> &[u8] {
    bytemuck::cast_slice(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    #[test]
    fn test_recording_backend_captures_draws() {
        let mut backend = RecordingBackend::new();
        backend.submit_skinned(Mat4::identity(), &[Mat4::identity(); 2]);
        assert_eq!(backend.draws.len(), 1);
        assert_eq!(backend.draws[0].palette.len(), 2);
    }

    #[test]
    fn test_palette_bytes_layout() {
        let palette = vec![Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0))];
        let columns = palette_to_columns(&palette);
        let bytes = palette_bytes(&columns);
        assert_eq!(bytes.len(), 64);
        // Translation lives in the last column: floats 12, 13, 14.
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert!((floats[12] - 1.0).abs() < f32::EPSILON);
        assert!((floats[13] - 2.0).abs() < f32::EPSILON);
        assert!((floats[14] - 3.0).abs() < f32::EPSILON);
    }
}
