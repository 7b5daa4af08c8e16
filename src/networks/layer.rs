use tch::{Tensor, nn, nn::Module};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
}

impl Activation {
    pub fn apply(self, xs: &Tensor) -> Tensor {
        match self {
            Activation::Relu => xs.relu(),
        }
    }
}

/// One step of a feed-forward stack.
#[derive(Debug)]
pub enum Layer {
    Linear { name: String, linear: nn::Linear },
    Activation(Activation),
}

impl Layer {
    pub fn is_linear(&self) -> bool {
        matches!(self, Layer::Linear { .. })
    }

    /// `(in_features, out_features)` of a linear layer.
    pub fn features(&self) -> Option<(i64, i64)> {
        match self {
            Layer::Linear { linear, .. } => {
                let size = linear.ws.size();
                Some((size[1], size[0]))
            }
            Layer::Activation(_) => None,
        }
    }
}

impl Module for Layer {
    fn forward(&self, xs: &Tensor) -> Tensor {
        match self {
            Layer::Linear { linear, .. } => linear.forward(xs),
            Layer::Activation(activation) => activation.apply(xs),
        }
    }
}
