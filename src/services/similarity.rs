/// Vectors of different lengths were compared
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot compare vectors of length {left} and {right}")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// Cosine similarity that reports a length mismatch instead of panicking
///
/// Returns 0 when either vector has zero magnitude, so two all-zero vectors
/// are not similar.
pub fn try_cosine_similarity<T>(a: &[T], b: &[T]) -> Result<f64, DimensionMismatch>
where
    T: Copy + Into<f64>,
{
    if a.len() != b.len() {
        return Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, norm_a, norm_b), (&x, &y)| {
            let (x, y): (f64, f64) = (x.into(), y.into());
            (dot + x * y, norm_a + x * x, norm_b + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Cosine similarity of two vectors built from the same dictionary or tag universe
///
/// # Panics
/// Panics when the lengths differ. That only happens when vectors from
/// different dictionaries are mixed up.
pub fn cosine_similarity<T>(a: &[T], b: &[T]) -> f64
where
    T: Copy + Into<f64>,
{
    match try_cosine_similarity(a, b) {
        Ok(similarity) => similarity,
        Err(e) => panic!("{e}"),
    }
}
