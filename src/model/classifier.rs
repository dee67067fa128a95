//! CNN + GRU + attention classifier.
//!
//! Fixed architecture over `(batch, 9, 1)` feature sequences:
//! Conv1d (32 filters, kernel 3, ReLU, same padding) → max pooling (pool 2)
//! → GRU (32 units, full sequence) → temporal attention → linear head sized
//! to the number of classes. Softmax is applied outside the logits head.

use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::gru::{Gru, GruConfig};
use burn::nn::pool::{MaxPool1d, MaxPool1dConfig};
use burn::nn::{Linear, LinearConfig, PaddingConfig1d, Relu};
use burn::prelude::*;
use burn::tensor::activation::softmax;

use crate::data::dataset::NUM_FEATURES;
use super::attention::{TemporalAttention, TemporalAttentionConfig};

/// Classifier configuration
#[derive(Config, Debug)]
pub struct EmotionClassifierConfig {
    /// Number of output classes
    pub num_classes: usize,
    /// Input sequence length (one step per eye-tracking feature)
    #[config(default = "NUM_FEATURES")]
    pub num_features: usize,
    /// Convolution filter count
    #[config(default = "32")]
    pub conv_filters: usize,
    /// Convolution kernel size
    #[config(default = "3")]
    pub kernel_size: usize,
    /// Max pooling window (and stride)
    #[config(default = "2")]
    pub pool_size: usize,
    /// GRU hidden units
    #[config(default = "32")]
    pub gru_units: usize,
}

/// Emotion-state classifier network
#[derive(Module, Debug)]
pub struct EmotionClassifier<B: Backend> {
    conv: Conv1d<B>,
    pool: MaxPool1d,
    gru: Gru<B>,
    attention: TemporalAttention<B>,
    output: Linear<B>,
    activation: Relu,
}

impl EmotionClassifierConfig {
    /// Sequence length after the pooling stage
    pub fn pooled_len(&self) -> usize {
        (self.num_features - self.pool_size) / self.pool_size + 1
    }

    /// Initialize the classifier network
    pub fn init<B: Backend>(&self, device: &B::Device) -> EmotionClassifier<B> {
        let conv = Conv1dConfig::new(1, self.conv_filters, self.kernel_size)
            .with_padding(PaddingConfig1d::Same)
            .init(device);
        let pool = MaxPool1dConfig::new(self.pool_size)
            .with_stride(self.pool_size)
            .init();
        let gru = GruConfig::new(self.conv_filters, self.gru_units, true).init(device);
        let attention = TemporalAttentionConfig::new(self.gru_units, self.pooled_len()).init(device);
        let output = LinearConfig::new(self.gru_units, self.num_classes).init(device);

        EmotionClassifier {
            conv,
            pool,
            gru,
            attention,
            output,
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> EmotionClassifier<B> {
    /// Forward pass from `(batch, 9, 1)` input to class logits
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        // Conv1d wants [batch, channels, length]
        let x = input.swap_dims(1, 2);
        let x = self.conv.forward(x);
        let x = self.activation.forward(x);
        let x = self.pool.forward(x);

        // Back to [batch, length, channels] for the recurrent stage
        let x = x.swap_dims(1, 2);
        let x = self.gru.forward(x, None);

        let context = self.attention.forward(x);
        self.output.forward(context)
    }

    /// Class probabilities (softmax over logits)
    pub fn forward_probs(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        softmax(self.forward(input), 1)
    }
}
