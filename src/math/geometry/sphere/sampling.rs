// src/math/geometry/sphere/sampling.rs

use nalgebra::Vector3;

/// Deterministische Punktmuster auf der Einheitskugel.
pub struct SamplingPatterns;

impl SamplingPatterns {
    /// Fibonacci-Spirale: `count` gleichmäßig verteilte Punkte auf der
    /// Einheitskugel. Deterministisch, kein RNG nötig.
    pub fn fibonacci_sphere(count: usize) -> Vec<Vector3<f32>> {
        if count == 0 {
            return Vec::new();
        }
        if count == 1 {
            return vec![Vector3::y()];
        }

        let golden_ratio = (1.0 + 5.0_f32.sqrt()) * 0.5;
        let mut points = Vec::with_capacity(count);

        for i in 0..count {
            let theta = std::f32::consts::TAU * (i as f32 / golden_ratio);
            let y = 1.0 - 2.0 * (i as f32 / (count - 1) as f32);
            let ring_radius = (1.0 - y * y).max(0.0).sqrt();

            points.push(Vector3::new(
                ring_radius * theta.cos(),
                y,
                ring_radius * theta.sin(),
            ));
        }

        points
    }
}
