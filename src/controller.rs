//! Decision sources: who drives the car
//!
//! A `DecisionSource` maps the car's speed and the current sensor readings to
//! the four controls. Two variants ship with the crate:
//! - `HumanInput`: replays whatever keys the platform layer last reported
//! - `MlpPolicy`: a small feed-forward network loaded from JSON
//!
//! Any `FnMut(f64, &SensorReading) -> Controls` closure is also a source.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{SENSOR_COUNT, SENSOR_LENGTH};
use crate::error::{Error, Result};
use crate::sim::{Controls, SensorReading};

/// Network input width: speed followed by one distance per ray
pub const POLICY_INPUTS: usize = 1 + SENSOR_COUNT;
/// Network output width: left, right, down, up
pub const POLICY_OUTPUTS: usize = 4;

/// Produces controls once per tick
pub trait DecisionSource {
    fn decide(&mut self, speed: f64, reading: &SensorReading) -> Controls;
}

impl<F> DecisionSource for F
where
    F: FnMut(f64, &SensorReading) -> Controls,
{
    fn decide(&mut self, speed: f64, reading: &SensorReading) -> Controls {
        self(speed, reading)
    }
}

/// Driver keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Left,
    Right,
    Down,
}

/// Latched keyboard state, updated by the platform layer between ticks
#[derive(Debug, Clone, Default)]
pub struct HumanInput {
    held: Controls,
}

impl HumanInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with some keys already held (headless runs)
    pub fn holding(held: Controls) -> Self {
        Self { held }
    }

    pub fn set(&mut self, key: Key, down: bool) {
        match key {
            Key::Up => self.held.up = down,
            Key::Left => self.held.left = down,
            Key::Right => self.held.right = down,
            Key::Down => self.held.down = down,
        }
    }

    pub fn press(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: Key) {
        self.set(key, false);
    }

    pub fn held(&self) -> Controls {
        self.held
    }
}

impl DecisionSource for HumanInput {
    fn decide(&mut self, _speed: f64, _reading: &SensorReading) -> Controls {
        self.held
    }
}

/// Layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
}

impl Activation {
    #[inline]
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// Fully connected layer. `weights[o][i]` connects input `i` to output `o`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn inputs(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    fn outputs(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                let sum: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                self.activation.apply(sum + bias)
            })
            .collect()
    }
}

fn default_threshold() -> f64 {
    0.5
}

/// Learned driving policy
///
/// Input is `[speed, d0 / L, .., d12 / L]` with `L` the sensor length the
/// network was trained with. Outputs are independent probabilities for
/// `(left, right, down, up)`; a control is pressed when its probability is
/// strictly above the threshold.
///
/// A weights file that omits `sensor_length` normalizes by `SENSOR_LENGTH`
/// unless the caller supplies one with `or_sensor_length`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpPolicy {
    layers: Vec<DenseLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sensor_length: Option<f64>,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

impl MlpPolicy {
    /// Build a policy, checking that the layer shapes chain from 14 inputs to 4 outputs
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self> {
        let policy = Self {
            layers,
            sensor_length: None,
            threshold: default_threshold(),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Normalize sensor distances by `sensor_length`, replacing any stored value
    pub fn with_sensor_length(mut self, sensor_length: f64) -> Result<Self> {
        self.sensor_length = Some(sensor_length);
        self.validate()?;
        Ok(self)
    }

    /// Use `sensor_length` only if the weights did not name one
    pub fn or_sensor_length(self, sensor_length: f64) -> Result<Self> {
        match self.sensor_length {
            Some(_) => Ok(self),
            None => self.with_sensor_length(sensor_length),
        }
    }

    /// Length sensor distances are divided by before entering the network
    pub fn sensor_length(&self) -> f64 {
        self.sensor_length.unwrap_or(SENSOR_LENGTH)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load weights from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let policy = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!(
            "Loaded policy from {} ({} layers)",
            path.display(),
            policy.layers.len()
        );
        Ok(policy)
    }

    fn validate(&self) -> Result<()> {
        let Some(first) = self.layers.first() else {
            return Err(Error::InvalidPolicy("no layers".to_string()));
        };
        if first.inputs() != POLICY_INPUTS {
            return Err(Error::InvalidPolicy(format!(
                "first layer takes {} inputs, expected {}",
                first.inputs(),
                POLICY_INPUTS
            )));
        }

        let mut width = POLICY_INPUTS;
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.weights.iter().any(|row| row.len() != width) {
                return Err(Error::InvalidPolicy(format!(
                    "layer {index} rows must all have {width} weights"
                )));
            }
            if layer.bias.len() != layer.outputs() {
                return Err(Error::InvalidPolicy(format!(
                    "layer {index} has {} biases for {} outputs",
                    layer.bias.len(),
                    layer.outputs()
                )));
            }
            width = layer.outputs();
        }

        if width != POLICY_OUTPUTS {
            return Err(Error::InvalidPolicy(format!(
                "last layer produces {width} outputs, expected {POLICY_OUTPUTS}"
            )));
        }
        if let Some(length) = self.sensor_length {
            if !(length.is_finite() && length > 0.0) {
                return Err(Error::InvalidPolicy(format!(
                    "sensor_length must be positive, got {length}"
                )));
            }
        }
        Ok(())
    }

    /// Network input for the given state
    pub fn features(&self, speed: f64, reading: &SensorReading) -> [f64; POLICY_INPUTS] {
        let mut features = [0.0; POLICY_INPUTS];
        features[0] = speed;
        features[1..].copy_from_slice(&reading.normalized(self.sensor_length()));
        features
    }

    /// Raw `(left, right, down, up)` probabilities
    pub fn probabilities(&self, speed: f64, reading: &SensorReading) -> [f64; POLICY_OUTPUTS] {
        let mut activations = self.features(speed, reading).to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        let mut out = [0.0; POLICY_OUTPUTS];
        out.copy_from_slice(&activations);
        out
    }
}

impl DecisionSource for MlpPolicy {
    fn decide(&mut self, speed: f64, reading: &SensorReading) -> Controls {
        let [left, right, down, up] = self.probabilities(speed, reading);
        Controls {
            up: up > self.threshold,
            left: left > self.threshold,
            right: right > self.threshold,
            down: down > self.threshold,
        }
    }
}
