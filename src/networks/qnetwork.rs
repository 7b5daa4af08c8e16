use tch::{Device, Kind, Tensor, nn, nn::Module};

use crate::config::QNetworkConfig;
use crate::error::ModelError;
use crate::init::ParamInit;
use crate::networks::layer::{Activation, Layer};
use crate::utils::ToTensor;

/// A weight or bias tensor of the network, sharing storage with the model.
#[derive(Debug)]
pub struct Parameter {
    pub name: String,
    pub shape: Vec<i64>,
    pub tensor: Tensor,
}

/// Action-value network: `state -> fc1 -> relu -> fc2 -> relu -> fc3 -> q-values`.
///
/// Parameters live in the network's own [`nn::VarStore`] and are only ever
/// changed by external code (an optimizer built over [`QNetwork::var_store`],
/// or in-place updates through [`QNetwork::parameters`]).
pub struct QNetwork {
    layers: Vec<Layer>,
    var_store: nn::VarStore,
    state_size: usize,
    action_size: usize,
    seed: u64,
    config: QNetworkConfig,
}

impl QNetwork {
    /// Builds a network with two hidden layers of 64 units.
    pub fn new(state_size: usize, action_size: usize, seed: u64) -> Result<Self, ModelError> {
        Self::with_config(state_size, action_size, seed, &QNetworkConfig::default())
    }

    pub fn with_config(
        state_size: usize,
        action_size: usize,
        seed: u64,
        config: &QNetworkConfig,
    ) -> Result<Self, ModelError> {
        let state_dim = dimension("state_size", state_size)?;
        let action_dim = dimension("action_size", action_size)?;
        config.validate()?;
        let widths = [
            state_dim,
            dimension("fc1_units", config.fc1_units)?,
            dimension("fc2_units", config.fc2_units)?,
            action_dim,
        ];

        let var_store = nn::VarStore::new(Device::Cpu);
        let mut init = ParamInit::new(seed);
        let mut layers = Vec::with_capacity(2 * widths.len() - 3);
        for (i, pair) in widths.windows(2).enumerate() {
            if i > 0 {
                layers.push(Layer::Activation(Activation::Relu));
            }
            let name = format!("fc{}", i + 1);
            let linear = init.linear(&(&var_store.root() / name.as_str()), pair[0], pair[1]);
            layers.push(Layer::Linear { name, linear });
        }

        tracing::debug!(
            state_size,
            action_size,
            seed,
            fc1_units = config.fc1_units,
            fc2_units = config.fc2_units,
            "built q-network"
        );

        Ok(QNetwork {
            layers,
            var_store,
            state_size,
            action_size,
            seed,
            config: config.clone(),
        })
    }

    /// Maps `[.., state_size]` to `[.., action_size]`, keeping leading dimensions.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor, ModelError> {
        let xs = self.check_input(xs)?;
        Ok(self
            .layers
            .iter()
            .fold(xs, |hidden, layer| layer.forward(&hidden)))
    }

    /// Output of every layer in the stack, in order. The last entry is the
    /// same tensor [`QNetwork::forward`] returns.
    pub fn forward_trace(&self, xs: &Tensor) -> Result<Vec<Tensor>, ModelError> {
        let mut hidden = self.check_input(xs)?;
        let mut trace = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            hidden = layer.forward(&hidden);
            trace.push(hidden.shallow_clone());
        }
        Ok(trace)
    }

    /// Q-values for a single state.
    pub fn action_values(&self, state: &[f32]) -> Result<Vec<f32>, ModelError> {
        let _guard = tch::no_grad_guard();
        let q_values = self.forward(&state.to_tensor())?;
        Ok(Vec::<f32>::try_from(&q_values)?)
    }

    /// Q-values for each state of a batch, in batch order.
    pub fn batch_action_values(&self, states: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ModelError> {
        if states.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(row) = states.iter().find(|s| s.len() != self.state_size) {
            return Err(self.mismatch(vec![states.len() as i64, row.len() as i64]));
        }

        let flat: Vec<f32> = states.iter().flatten().copied().collect();
        let batch = Tensor::from_slice(&flat).reshape([states.len() as i64, self.state_size as i64]);

        let _guard = tch::no_grad_guard();
        let q_values = self.forward(&batch)?.flatten(0, -1);
        let flat = Vec::<f32>::try_from(&q_values)?;
        Ok(flat.chunks(self.action_size).map(<[f32]>::to_vec).collect())
    }

    /// Weights and biases in layer order (`fc1.weight`, `fc1.bias`, ..., `fc3.bias`).
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut params = Vec::with_capacity(6);
        for layer in &self.layers {
            if let Layer::Linear { name, linear } = layer {
                params.push(Parameter {
                    name: format!("{name}.weight"),
                    shape: linear.ws.size(),
                    tensor: linear.ws.shallow_clone(),
                });
                if let Some(bs) = &linear.bs {
                    params.push(Parameter {
                        name: format!("{name}.bias"),
                        shape: bs.size(),
                        tensor: bs.shallow_clone(),
                    });
                }
            }
        }
        params
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    pub fn var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.var_store
    }

    pub fn device(&self) -> Device {
        self.var_store.device()
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &QNetworkConfig {
        &self.config
    }

    fn check_input(&self, xs: &Tensor) -> Result<Tensor, ModelError> {
        let shape = xs.size();
        if shape.last() != Some(&(self.state_size as i64)) {
            return Err(self.mismatch(shape));
        }
        if xs.kind() == Kind::Float {
            Ok(xs.shallow_clone())
        } else {
            Ok(xs.to_kind(Kind::Float))
        }
    }

    fn mismatch(&self, shape: Vec<i64>) -> ModelError {
        tracing::debug!(expected = self.state_size, ?shape, "rejected q-network input");
        ModelError::ShapeMismatch {
            expected: self.state_size as i64,
            shape,
        }
    }
}

impl std::fmt::Debug for QNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QNetwork")
            .field("state_size", &self.state_size)
            .field("action_size", &self.action_size)
            .field("seed", &self.seed)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn dimension(field: &'static str, value: usize) -> Result<i64, ModelError> {
    match i64::try_from(value) {
        Ok(dim) if dim >= 1 => Ok(dim),
        _ => Err(ModelError::Construction { field, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_sizes() {
        for (state_size, action_size, field) in [(0, 4, "state_size"), (8, 0, "action_size")] {
            match QNetwork::new(state_size, action_size, 0) {
                Err(ModelError::Construction { field: f, value }) => {
                    assert_eq!(f, field);
                    assert_eq!(value, 0);
                }
                other => panic!("expected construction error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_zero_hidden_width() {
        let config = QNetworkConfig {
            fc1_units: 0,
            fc2_units: 64,
        };
        assert!(matches!(
            QNetwork::with_config(8, 4, 0, &config),
            Err(ModelError::Construction {
                field: "fc1_units",
                ..
            })
        ));
    }

    #[test]
    fn test_layer_stack_alternates_linear_and_relu() {
        let net = QNetwork::new(8, 4, 0).unwrap();
        let layers = net.layers();
        assert_eq!(layers.len(), 5);
        assert_eq!(layers[0].features(), Some((8, 64)));
        assert!(matches!(layers[1], Layer::Activation(Activation::Relu)));
        assert_eq!(layers[2].features(), Some((64, 64)));
        assert!(matches!(layers[3], Layer::Activation(Activation::Relu)));
        assert_eq!(layers[4].features(), Some((64, 4)));
    }

    #[test]
    fn test_parameters_are_ordered_and_shaped() {
        let net = QNetwork::new(8, 4, 0).unwrap();
        let params = net.parameters();
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "fc1.weight",
                "fc1.bias",
                "fc2.weight",
                "fc2.bias",
                "fc3.weight",
                "fc3.bias"
            ]
        );
        let shapes: Vec<Vec<i64>> = params.iter().map(|p| p.shape.clone()).collect();
        assert_eq!(
            shapes,
            vec![
                vec![64, 8],
                vec![64],
                vec![64, 64],
                vec![64],
                vec![4, 64],
                vec![4]
            ]
        );
    }

    #[test]
    fn test_var_store_holds_every_parameter() {
        let net = QNetwork::new(3, 2, 11).unwrap();
        let vars = net.var_store().variables();
        assert_eq!(vars.len(), 6);
        for param in net.parameters() {
            assert!(vars[&param.name].equal(&param.tensor));
        }
        assert_eq!(net.var_store().trainable_variables().len(), 6);
    }

    #[test]
    fn test_accessors() {
        let net = QNetwork::new(8, 4, 123).unwrap();
        assert_eq!(net.state_size(), 8);
        assert_eq!(net.action_size(), 4);
        assert_eq!(net.seed(), 123);
        assert_eq!(net.config(), &QNetworkConfig::default());
        assert_eq!(net.device(), Device::Cpu);
    }

    #[test]
    fn test_integer_input_is_promoted() {
        let net = QNetwork::new(2, 3, 0).unwrap();
        let xs = Tensor::from_slice(&[1i64, 2]);
        let q_values = net.forward(&xs).unwrap();
        assert_eq!(q_values.size(), vec![3]);
        assert_eq!(q_values.kind(), Kind::Float);
    }
}
