// ============================================================
// Layer 5 — Sequence CNN (Burn)
// ============================================================
// tokens [N, L]
//   → embedding                      [N, L, E] → swap → [N, E, L]
//   → conv(k=8) → norm → relu → pool [N, 16, (L-7)/2]
//   → conv(k=8) → norm → relu → pool [N,  8, ...]
//   → conv(k=8) → norm → relu → pool [N,  4, ...]
//   → flatten                        [N, F]
//   → linear F → 512 → linear 512 → 1
//   → sigmoid                        [N, 1]
//
// F is not computed by hand: at construction an all-zero
// sequence of length input_len is pushed through the feature
// extractor once and the width of the result is used.
//
// Normalisation mode is an explicit argument of every forward
// call. Train uses batch statistics and updates the running
// statistics; Eval uses the running statistics and leaves them
// untouched.

use burn::{
    nn::{
        conv::{Conv1d, Conv1dConfig},
        loss::BinaryCrossEntropyLossConfig,
        pool::{MaxPool1d, MaxPool1dConfig},
        BatchNorm, BatchNormConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{relu, sigmoid},
};

use crate::error::{ModelError, Result as ModelResult};

pub const KERNEL_SIZE:  usize = 8;
pub const POOL_SIZE:    usize = 2;
pub const CHANNELS:     [usize; 3] = [16, 8, 4];
pub const HIDDEN_WIDTH: usize = 512;
pub const OUTPUT_WIDTH: usize = 1;

/// How the normalisation layers compute their statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Batch statistics; running statistics are updated.
    Train,
    /// Running statistics; nothing is updated.
    Eval,
}

#[derive(Config, Debug)]
pub struct SequenceCnnConfig {
    /// Only 2 is supported (one sigmoid output neuron)
    pub number_of_classes: usize,
    pub vocab_size:        usize,
    pub embedding_dim:     usize,
    pub input_len:         usize,
}

impl SequenceCnnConfig {
    /// Build the model. Nothing is allocated when the configuration
    /// is rejected.
    pub fn init<B: Backend>(&self, device: &B::Device) -> ModelResult<SequenceCnn<B>> {
        self.validate()?;

        let features = FeatureExtractor::new(self.vocab_size, self.embedding_dim, device);
        let flattened_width = features.flattened_width(self.input_len, device);
        tracing::debug!(
            "Measured flattened width {} for input_len {}",
            flattened_width, self.input_len
        );

        let hidden = LinearConfig::new(flattened_width, HIDDEN_WIDTH).init(device);
        let output = LinearConfig::new(HIDDEN_WIDTH, OUTPUT_WIDTH).init(device);

        Ok(SequenceCnn {
            features,
            hidden,
            output,
            flattened_width,
            input_len: self.input_len,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        if self.number_of_classes != 2 {
            return Err(ModelError::UnsupportedConfiguration {
                number_of_classes: self.number_of_classes,
            });
        }
        if self.vocab_size == 0 {
            return Err(ModelError::InvalidConfig("vocab_size must be > 0".to_string()));
        }
        if self.embedding_dim == 0 {
            return Err(ModelError::InvalidConfig("embedding_dim must be > 0".to_string()));
        }
        if conv_stack_len(self.input_len).is_none() {
            return Err(ModelError::InvalidConfig(format!(
                "input_len {} is too short for three convolutions of width {} with pooling",
                self.input_len, KERNEL_SIZE
            )));
        }
        Ok(())
    }
}

/// Sequence length after the three conv/pool blocks, or None when a
/// convolution or pooling step would produce an empty sequence.
///
/// Only used to reject impossible configurations before the dummy
/// pass; the layer width itself always comes from the measurement.
pub fn conv_stack_len(input_len: usize) -> Option<usize> {
    CHANNELS.iter().try_fold(input_len, |len, _| {
        let conv = len.checked_sub(KERNEL_SIZE - 1)?;
        let pooled = conv / POOL_SIZE;
        (pooled > 0).then_some(pooled)
    })
}

// ─── ConvBlock ────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv1d<B>,
    pub norm: BatchNorm<B>,
    pub pool: MaxPool1d,
}

impl<B: Backend> ConvBlock<B> {
    pub fn new(channels_in: usize, channels_out: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv1dConfig::new(channels_in, channels_out, KERNEL_SIZE)
                .with_bias(true)
                .init(device),
            norm: BatchNormConfig::new(channels_out).init(device),
            pool: MaxPool1dConfig::new(POOL_SIZE).init(),
        }
    }

    /// [N, C_in, L] → [N, C_out, (L - 7) / 2]
    pub fn forward(&self, x: Tensor<B, 3>, mode: Mode) -> Tensor<B, 3> {
        let x = self.conv.forward(x);
        let x = self.normalize(x, mode);
        self.pool.forward(relu(x))
    }

    fn normalize(&self, x: Tensor<B, 3>, mode: Mode) -> Tensor<B, 3> {
        let device = x.device();
        let [batch, channels, length] = x.dims();
        let norm = &self.norm;

        let (mean, var) = match mode {
            Mode::Train => {
                let flat = x.clone().swap_dims(0, 1).reshape([channels, batch * length]);
                let mean = flat.clone().mean_dim(1);
                let var  = flat.sub(mean.clone()).square().mean_dim(1);

                let running_mean = norm.running_mean.value_sync().to_device(&device)
                    .mul_scalar(1.0 - norm.momentum)
                    .add(mean.clone().detach().mul_scalar(norm.momentum).reshape([channels]));
                let running_var = norm.running_var.value_sync().to_device(&device)
                    .mul_scalar(1.0 - norm.momentum)
                    .add(var.clone().detach().mul_scalar(norm.momentum).reshape([channels]));
                norm.running_mean.update(running_mean.detach());
                norm.running_var.update(running_var.detach());

                (mean.reshape([1, channels, 1]), var.reshape([1, channels, 1]))
            }
            Mode::Eval => (
                norm.running_mean.value_sync().to_device(&device).reshape([1, channels, 1]),
                norm.running_var.value_sync().to_device(&device).reshape([1, channels, 1]),
            ),
        };

        let std = var.add_scalar(norm.epsilon).sqrt();
        x.sub(mean)
            .div(std)
            .mul(norm.gamma.val().reshape([1, channels, 1]))
            .add(norm.beta.val().reshape([1, channels, 1]))
    }
}

// ─── FeatureExtractor ─────────────────────────────────────────────────────────
/// Embedding followed by the three convolutional blocks.
#[derive(Module, Debug)]
pub struct FeatureExtractor<B: Backend> {
    pub embedding: Embedding<B>,
    pub blocks:    Vec<ConvBlock<B>>,
}

impl<B: Backend> FeatureExtractor<B> {
    pub fn new(vocab_size: usize, embedding_dim: usize, device: &B::Device) -> Self {
        let embedding = EmbeddingConfig::new(vocab_size, embedding_dim).init(device);

        let mut channels_in = embedding_dim;
        let mut blocks = Vec::with_capacity(CHANNELS.len());
        for &channels_out in CHANNELS.iter() {
            blocks.push(ConvBlock::new(channels_in, channels_out, device));
            channels_in = channels_out;
        }

        Self { embedding, blocks }
    }

    /// tokens [N, L] → flattened features [N, F]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>, mode: Mode) -> Tensor<B, 2> {
        // Conv1d expects [batch, channels, length]
        let mut x = self.embedding.forward(tokens).swap_dims(1, 2);
        for block in &self.blocks {
            x = block.forward(x, mode);
        }
        x.flatten(1, 2)
    }

    /// Width F of the flattened output for sequences of `input_len`.
    pub fn flattened_width(&self, input_len: usize, device: &B::Device) -> usize {
        let zeros = Tensor::<B, 2, Int>::zeros([1, input_len], device);
        self.forward(zeros, Mode::Eval).dims()[1]
    }
}

// ─── SequenceCnn ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct SequenceCnn<B: Backend> {
    pub features:        FeatureExtractor<B>,
    pub hidden:          Linear<B>,
    pub output:          Linear<B>,
    pub flattened_width: usize,
    pub input_len:       usize,
}

impl<B: Backend> SequenceCnn<B> {
    /// tokens [N, L] → logits [N, 1]
    pub fn forward_logits(&self, tokens: Tensor<B, 2, Int>, mode: Mode) -> Tensor<B, 2> {
        let x = self.features.forward(tokens, mode);
        let x = self.hidden.forward(x);
        self.output.forward(x)
    }

    /// tokens [N, L] → probabilities [N, 1], each in (0, 1)
    pub fn forward(&self, tokens: Tensor<B, 2, Int>, mode: Mode) -> Tensor<B, 2> {
        sigmoid(self.forward_logits(tokens, mode))
    }

    /// Binary cross-entropy of one batch, together with the
    /// probabilities it was computed from.
    ///
    /// The loss is configured with `logits = true` and receives the
    /// sigmoid output, so the probability is squashed a second time
    /// inside the loss.
    pub fn forward_loss(
        &self,
        tokens: Tensor<B, 2, Int>,
        labels: Tensor<B, 1, Int>,
        mode:   Mode,
    ) -> ModelResult<(Tensor<B, 1>, Tensor<B, 2>)> {
        let probabilities = self.forward(tokens, mode);
        let targets = align_labels(labels, &probabilities)?;

        let bce = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&probabilities.device());
        let loss = bce.forward(probabilities.clone(), targets);

        Ok((loss, probabilities))
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn flattened_width(&self) -> usize {
        self.flattened_width
    }

    /// Every learnable tensor, in layer order, copied to host memory.
    pub fn parameter_snapshot(&self) -> ModelResult<Vec<(String, Vec<f32>)>> {
        let mut params = vec![(
            "embedding.weight".to_string(),
            host(self.features.embedding.weight.val())?,
        )];

        for (i, block) in self.features.blocks.iter().enumerate() {
            let n = i + 1;
            params.push((format!("conv{n}.weight"), host(block.conv.weight.val())?));
            if let Some(bias) = &block.conv.bias {
                params.push((format!("conv{n}.bias"), host(bias.val())?));
            }
            params.push((format!("norm{n}.gamma"), host(block.norm.gamma.val())?));
            params.push((format!("norm{n}.beta"),  host(block.norm.beta.val())?));
        }

        for (name, layer) in [("hidden", &self.hidden), ("output", &self.output)] {
            params.push((format!("{name}.weight"), host(layer.weight.val())?));
            if let Some(bias) = &layer.bias {
                params.push((format!("{name}.bias"), host(bias.val())?));
            }
        }

        Ok(params)
    }
}

/// Reshape `[N]` labels to the `[N, 1]` layout of the predictions.
///
/// Labels are silently re-laid-out; only a differing element count
/// is rejected.
pub fn align_labels<B: Backend>(
    labels:      Tensor<B, 1, Int>,
    predictions: &Tensor<B, 2>,
) -> ModelResult<Tensor<B, 2, Int>> {
    let [rows, cols] = predictions.dims();
    let count = labels.dims()[0];
    if count != rows * cols {
        return Err(ModelError::LabelShape { labels: count, predictions: rows * cols });
    }
    Ok(labels.reshape([rows, cols]))
}

/// Copy a float tensor to a host vector.
pub(crate) fn host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> ModelResult<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| ModelError::TensorData(format!("{e:?}")))
}
