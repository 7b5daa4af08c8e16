use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tch::{Tensor, nn};

/// Seeded parameter initialiser.
///
/// Owns its own RNG so that building a network never touches torch's global
/// random state. Layers must be drawn in a fixed order for two initialisers
/// with the same seed to produce the same parameters.
pub struct ParamInit {
    rng: StdRng,
}

impl ParamInit {
    pub fn new(seed: u64) -> Self {
        ParamInit {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Tensor of the given shape with values drawn from `U(-bound, bound)`.
    pub fn uniform(&mut self, shape: &[i64], bound: f32) -> Tensor {
        let numel: i64 = shape.iter().product();
        let values: Vec<f32> = (0..numel)
            .map(|_| self.rng.random_range(-bound..bound))
            .collect();
        Tensor::from_slice(&values).reshape(shape)
    }

    /// Draws a `[out, in]` weight and `[out]` bias from
    /// `U(-1/sqrt(in), 1/sqrt(in))`, weight first.
    pub fn linear_params(&mut self, in_features: i64, out_features: i64) -> (Tensor, Tensor) {
        let bound = 1.0 / (in_features as f32).sqrt();
        let ws = self.uniform(&[out_features, in_features], bound);
        let bs = self.uniform(&[out_features], bound);
        (ws, bs)
    }

    /// Registers a freshly drawn linear layer under `path` (`weight`, `bias`).
    pub fn linear(&mut self, path: &nn::Path, in_features: i64, out_features: i64) -> nn::Linear {
        let (ws, bs) = self.linear_params(in_features, out_features);
        nn::Linear {
            ws: path.var_copy("weight", &ws),
            bs: Some(path.var_copy("bias", &bs)),
        }
    }
}
