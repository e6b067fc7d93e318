//! Inference Engine Module
//!
//! Fixed-topology feed-forward network scoring a transaction feature vector.
//!
//! Architecture: Input(10) -> Hidden(64, 32, 16) -> Output(1)
//! - Every layer: relu(bias + W . input), output layer included
//! - Score: sigmoid of the single output activation
//! - Confidence: max(0.5, 1 - population variance of the 16-wide layer)
//!
//! Weights are held as an immutable snapshot behind `RwLock<Arc<_>>`.
//! A forward pass clones the Arc once and never observes a partial update;
//! `update()` builds a complete new snapshot before swapping it in.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tracing::{debug, info};

use crate::core::features::FeatureExtractor;
use crate::models::config::FillerPolicy;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FeatureVector, ModelInfo, PredictionResult, TransactionFeatures};
use crate::utils::constants::{
    BIAS_INIT_MAX, FILLER_SLOTS, HIDDEN_WIDTHS, INPUT_WIDTH, MIN_CONFIDENCE, MODEL_VERSION,
    OUTPUT_WIDTH, WEIGHT_INIT_MAX, WEIGHT_INIT_MIN,
};

// ============================================
// WEIGHTS
// ============================================

/// One dense layer: `weights[out][in]`, `biases[out]`
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl Layer {
    /// Weights uniform in [-0.1, 0.1), biases uniform in [0, 0.1)
    fn random<R: Rng>(rng: &mut R, inputs: usize, outputs: usize) -> Self {
        let weights = (0..outputs)
            .map(|_| {
                (0..inputs)
                    .map(|_| rng.gen_range(WEIGHT_INIT_MIN..WEIGHT_INIT_MAX))
                    .collect::<Vec<f64>>()
            })
            .collect();
        let biases = (0..outputs).map(|_| rng.gen_range(0.0..BIAS_INIT_MAX)).collect();
        Self { weights, biases }
    }

    pub fn input_width(&self) -> usize {
        self.weights.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn output_width(&self) -> usize {
        self.biases.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum = bias + row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>();
                relu(sum)
            })
            .collect()
    }
}

/// Complete parameter set for the fixed topology
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkWeights {
    layers: Vec<Layer>,
}

impl NetworkWeights {
    /// Layer widths in evaluation order, input first
    pub fn topology() -> Vec<usize> {
        let mut widths = Vec::with_capacity(HIDDEN_WIDTHS.len() + 2);
        widths.push(INPUT_WIDTH);
        widths.extend_from_slice(&HIDDEN_WIDTHS);
        widths.push(OUTPUT_WIDTH);
        widths
    }

    /// Fresh random parameters
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let layers = Self::topology()
            .windows(2)
            .map(|w| Layer::random(&mut *rng, w[0], w[1]))
            .collect();
        Self { layers }
    }

    /// Wrap externally supplied layers, checking them against the topology
    pub fn from_layers(layers: Vec<Layer>) -> AppResult<Self> {
        let topology = Self::topology();
        if layers.len() != topology.len() - 1 {
            return Err(AppError::shape_mismatch(format!(
                "Expected {} layers, got {}",
                topology.len() - 1,
                layers.len()
            )));
        }

        for (idx, (layer, dims)) in layers.iter().zip(topology.windows(2)).enumerate() {
            let (inputs, outputs) = (dims[0], dims[1]);
            if layer.biases.len() != outputs || layer.weights.len() != outputs {
                return Err(AppError::shape_mismatch(format!(
                    "Layer {}: expected {} neurons, got {} weight rows / {} biases",
                    idx,
                    outputs,
                    layer.weights.len(),
                    layer.biases.len()
                )));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != inputs) {
                return Err(AppError::shape_mismatch(format!(
                    "Layer {}: expected {} inputs per neuron, got {}",
                    idx,
                    inputs,
                    row.len()
                )));
            }
        }

        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Run the network; returns (raw output, last hidden activations)
    fn forward(&self, input: &FeatureVector) -> (f64, Vec<f64>) {
        let mut activation = input.to_vec();
        let mut last_hidden = Vec::new();
        let last = self.layers.len() - 1;

        for (idx, layer) in self.layers.iter().enumerate() {
            if idx == last {
                last_hidden = activation.clone();
            }
            activation = layer.forward(&activation);
        }

        (activation.first().copied().unwrap_or(0.0), last_hidden)
    }
}

// ============================================
// ENGINE
// ============================================

/// Thread-safe inference engine
pub struct InferenceEngine {
    weights: RwLock<Option<Arc<NetworkWeights>>>,
    filler_policy: FillerPolicy,
    /// Base seed for reproducible redraws
    seed: Option<u64>,
    generation: AtomicU64,
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine {
    /// Engine with random weights and zero filler
    pub fn new() -> Self {
        Self::with_options(FillerPolicy::default(), None)
    }

    /// Engine whose weights are reproducible from `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::with_options(FillerPolicy::default(), Some(seed))
    }

    pub fn with_options(filler_policy: FillerPolicy, seed: Option<u64>) -> Self {
        let engine = Self::uninitialized(filler_policy, seed);
        engine.initialize();
        info!(
            "🤖 Model v{} initialized (filler: {:?}, seeded: {})",
            MODEL_VERSION,
            filler_policy,
            seed.is_some()
        );
        engine
    }

    /// Engine without weights; `predict` fails until `initialize` or `update`
    pub fn uninitialized(filler_policy: FillerPolicy, seed: Option<u64>) -> Self {
        Self {
            weights: RwLock::new(None),
            filler_policy,
            seed,
            generation: AtomicU64::new(0),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.weights.read().map(|w| w.is_some()).unwrap_or(false)
    }

    /// Draw initial weights if none exist yet
    pub fn initialize(&self) {
        let mut guard = self.write_weights();
        if guard.is_none() {
            let generation = self.generation.load(Ordering::Acquire);
            *guard = Some(Arc::new(Self::draw_weights(self.seed, generation)));
        }
    }

    /// Redraw every weight and bias; a full re-randomization, not training
    ///
    /// The generation bump and the swap happen under one write lock, so the
    /// reported generation always names the installed weights.
    pub fn update(&self) {
        let mut guard = self.write_weights();
        let generation = self.generation.load(Ordering::Acquire) + 1;
        *guard = Some(Arc::new(Self::draw_weights(self.seed, generation)));
        self.generation.store(generation, Ordering::Release);
        drop(guard);

        info!("🔄 Model v{} weights redrawn (generation {})", MODEL_VERSION, generation);
    }

    /// Swap in externally supplied weights
    pub fn replace_weights(&self, weights: NetworkWeights) {
        let snapshot = Arc::new(weights);
        let mut guard = self.write_weights();
        *guard = Some(snapshot);
        self.generation.fetch_add(1, Ordering::Release);
        drop(guard);

        info!("📥 Model weights replaced");
    }

    /// Current weight snapshot
    pub fn snapshot(&self) -> AppResult<Arc<NetworkWeights>> {
        let guard = self.weights.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().cloned().ok_or_else(AppError::not_initialized)
    }

    pub fn filler_policy(&self) -> FillerPolicy {
        self.filler_policy
    }

    /// Score features using the configured filler policy
    pub fn predict(&self, features: &TransactionFeatures) -> AppResult<PredictionResult> {
        let filler = match self.filler_policy {
            FillerPolicy::Zero => [0.0; FILLER_SLOTS],
            FillerPolicy::Random => {
                let mut rng = rand::thread_rng();
                let mut slots = [0.0; FILLER_SLOTS];
                slots.iter_mut().for_each(|s| *s = rng.gen::<f64>());
                slots
            }
        };
        self.predict_with_filler(features, filler)
    }

    /// Score features with caller-supplied filler slots
    pub fn predict_with_filler(
        &self,
        features: &TransactionFeatures,
        filler: [f64; FILLER_SLOTS],
    ) -> AppResult<PredictionResult> {
        let weights = self.snapshot()?;
        let vector = FeatureExtractor::to_vector(features, filler);
        let (raw, last_hidden) = weights.forward(&vector);

        let score = sigmoid(raw).clamp(0.0, 1.0);
        let confidence = (1.0 - population_variance(&last_hidden))
            .max(MIN_CONFIDENCE)
            .min(1.0);

        debug!("🤖 Inference score: {:.4}, confidence: {:.4}", score, confidence);

        Ok(PredictionResult {
            score,
            confidence,
            features: vector,
        })
    }

    pub fn model_info(&self) -> ModelInfo {
        let hidden = HIDDEN_WIDTHS
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(",");
        ModelInfo {
            version: MODEL_VERSION.to_string(),
            architecture: format!(
                "Input({}) -> Hidden({}) -> Output({})",
                INPUT_WIDTH, hidden, OUTPUT_WIDTH
            ),
            generation: self.generation.load(Ordering::Acquire),
        }
    }

    fn draw_weights(seed: Option<u64>, generation: u64) -> NetworkWeights {
        match seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(generation));
                NetworkWeights::random(&mut rng)
            }
            None => NetworkWeights::random(&mut rand::thread_rng()),
        }
    }

    fn write_weights(&self) -> RwLockWriteGuard<'_, Option<Arc<NetworkWeights>>> {
        self.weights.write().unwrap_or_else(|e| e.into_inner())
    }
}

// ============================================
// MATH HELPERS
// ============================================

#[inline]
pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Population variance; 0 for an empty slice
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_features() -> TransactionFeatures {
        TransactionFeatures {
            amount: 1_000_000.0,
            recipient_age_days: 30,
            program_interactions: 2,
            gas_price: 5000.0,
            complexity: 50.0,
            known_address: false,
            has_recipient: true,
        }
    }

    /// Network with all weights zero and the given per-layer bias fill
    fn constant_network(biases: impl Fn(usize, usize) -> f64) -> NetworkWeights {
        let layers = NetworkWeights::topology()
            .windows(2)
            .enumerate()
            .map(|(idx, w)| Layer {
                weights: vec![vec![0.0; w[0]]; w[1]],
                biases: (0..w[1]).map(|i| biases(idx, i)).collect(),
            })
            .collect();
        NetworkWeights::from_layers(layers).unwrap()
    }

    #[test]
    fn test_math_helpers() {
        assert_eq!(relu(-1.0), 0.0);
        assert_eq!(relu(2.5), 2.5);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(population_variance(&[]), 0.0);
        assert!((population_variance(&[0.0, 2.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_random_weights_respect_topology_and_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = NetworkWeights::random(&mut rng);
        let widths: Vec<(usize, usize)> = weights
            .layers()
            .iter()
            .map(|l| (l.input_width(), l.output_width()))
            .collect();
        assert_eq!(widths, vec![(10, 64), (64, 32), (32, 16), (16, 1)]);

        for layer in weights.layers() {
            for w in layer.weights.iter().flatten() {
                assert!((-0.1..0.1).contains(w));
            }
            for b in &layer.biases {
                assert!((0.0..0.1).contains(b));
            }
        }
    }

    #[test]
    fn test_prediction_bounds() {
        let engine = InferenceEngine::new();
        let result = engine.predict(&sample_features()).unwrap();
        assert!((0.0..=1.0).contains(&result.score));
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(result.confidence >= 0.5);
        assert_eq!(result.features.len(), 10);
    }

    #[test]
    fn test_zero_filler_is_reproducible() {
        let engine = InferenceEngine::new();
        let a = engine.predict(&sample_features()).unwrap();
        let b = engine.predict(&sample_features()).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a.features[6..], &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let a = InferenceEngine::with_seed(42).predict(&sample_features()).unwrap();
        let b = InferenceEngine::with_seed(42).predict(&sample_features()).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn test_random_filler_stays_bounded() {
        let engine = InferenceEngine::with_options(FillerPolicy::Random, Some(1));
        for _ in 0..20 {
            let result = engine.predict(&sample_features()).unwrap();
            assert!((0.0..=1.0).contains(&result.score));
            assert!(result.features[6..].iter().all(|f| (0.0..1.0).contains(f)));
        }
    }

    #[test]
    fn test_uninitialized_engine_fails() {
        let engine = InferenceEngine::uninitialized(FillerPolicy::Zero, None);
        let err = engine.predict(&sample_features()).unwrap_err();
        assert_eq!(err.code_str(), "MODEL_NOT_INITIALIZED");

        engine.initialize();
        assert!(engine.predict(&sample_features()).is_ok());
    }

    #[test]
    fn test_update_replaces_snapshot() {
        let engine = InferenceEngine::with_seed(3);
        let before = engine.snapshot().unwrap();
        engine.update();
        let after = engine.snapshot().unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_ne!(*before, *after);
        assert_eq!(engine.model_info().generation, 1);
    }

    #[test]
    fn test_known_forward_pass() {
        // Zero weights: every layer outputs relu(bias); output bias 1.0
        let weights = constant_network(|layer, _| if layer == 3 { 1.0 } else { 0.0 });
        let engine = InferenceEngine::uninitialized(FillerPolicy::Zero, None);
        engine.replace_weights(weights);

        let result = engine.predict(&sample_features()).unwrap();
        assert!((result.score - sigmoid(1.0)).abs() < 1e-12);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_confidence_floor() {
        // Last hidden layer alternates 0 and 2: variance 1, confidence floored at 0.5
        let weights = constant_network(|layer, i| {
            if layer == 2 && i % 2 == 1 {
                2.0
            } else {
                0.0
            }
        });
        let engine = InferenceEngine::uninitialized(FillerPolicy::Zero, None);
        engine.replace_weights(weights);

        let result = engine.predict(&sample_features()).unwrap();
        assert_eq!(result.confidence, 0.5);
        assert!((result.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layers = NetworkWeights::random(&mut rng).layers().to_vec();
        layers[1].biases.pop();
        let err = NetworkWeights::from_layers(layers).unwrap_err();
        assert_eq!(err.code_str(), "MODEL_SHAPE_MISMATCH");

        let err = NetworkWeights::from_layers(vec![]).unwrap_err();
        assert_eq!(err.code_str(), "MODEL_SHAPE_MISMATCH");
    }

    #[test]
    fn test_model_info() {
        let info = InferenceEngine::with_seed(0).model_info();
        assert_eq!(info.version, "2.1.0");
        assert_eq!(info.architecture, "Input(10) -> Hidden(64,32,16) -> Output(1)");
    }

    #[test]
    fn test_concurrent_predict_and_update() {
        let engine = InferenceEngine::with_seed(9);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..50 {
                        let r = engine.predict(&sample_features()).unwrap();
                        assert!((0.0..=1.0).contains(&r.score));
                    }
                });
            }
            s.spawn(|| {
                for _ in 0..10 {
                    engine.update();
                }
            });
        });
        assert_eq!(engine.model_info().generation, 10);
    }

    #[test]
    fn test_racing_updates_keep_generation_and_weights_in_step() {
        let seed = 77;
        let engine = InferenceEngine::with_seed(seed);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..20 {
                        engine.update();
                    }
                });
            }
        });

        let generation = engine.model_info().generation;
        assert_eq!(generation, 80);
        let expected = NetworkWeights::random(&mut StdRng::seed_from_u64(seed + generation));
        assert_eq!(*engine.snapshot().unwrap(), expected);
    }
}
