use crate::error::ModelError;

pub const DEFAULT_HIDDEN_UNITS: usize = 64;

/// Hidden layer widths of the action-value network.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QNetworkConfig {
    /// Width of the first hidden layer.
    pub fc1_units: usize,
    /// Width of the second hidden layer.
    pub fc2_units: usize,
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        QNetworkConfig {
            fc1_units: DEFAULT_HIDDEN_UNITS,
            fc2_units: DEFAULT_HIDDEN_UNITS,
        }
    }
}

impl QNetworkConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.fc1_units == 0 {
            return Err(ModelError::Construction {
                field: "fc1_units",
                value: self.fc1_units,
            });
        }
        if self.fc2_units == 0 {
            return Err(ModelError::Construction {
                field: "fc2_units",
                value: self.fc2_units,
            });
        }
        Ok(())
    }
}
