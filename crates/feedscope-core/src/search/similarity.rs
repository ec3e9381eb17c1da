//! Vector similarity
//!
//! Higher is always more similar. Distance-based backends convert through
//! [`similarity_from_distance`].

/// Cosine similarity in [-1, 1]; 0 for empty, mismatched or zero-norm input
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Convert a cosine distance into a similarity
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 - distance
}
