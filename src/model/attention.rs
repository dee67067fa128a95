//! Temporal attention layer.
//!
//! Learns a per-timestep weighting over a recurrent output sequence and
//! collapses it to a single context vector. Given input of shape
//! `(batch, T, C)` the layer holds a weight matrix `W: (C, 1)` and bias
//! `b: (T, 1)`, computes the unnormalized score `e = tanh(x·W + b)`,
//! softmax-normalizes across the time axis, multiplies the weights back into
//! the sequence and sums over time to produce a `(batch, C)` output.
//!
//! No masking is applied; the layer operates on the full fixed-length
//! sequence and needs only the two shape hyperparameters to be rebuilt at
//! load time.

use burn::module::Param;
use burn::nn::Initializer;
use burn::prelude::*;
use burn::tensor::activation::softmax;

/// Temporal attention configuration
#[derive(Config, Debug)]
pub struct TemporalAttentionConfig {
    /// Channel dimension of the input sequence (C)
    pub d_input: usize,
    /// Fixed sequence length (T)
    pub seq_len: usize,
}

/// Learned softmax pooling over the time axis
#[derive(Module, Debug)]
pub struct TemporalAttention<B: Backend> {
    /// Score weight, shape [C, 1]
    weight: Param<Tensor<B, 2>>,
    /// Score bias, shape [T, 1]
    bias: Param<Tensor<B, 2>>,
}

impl TemporalAttentionConfig {
    /// Initialize the attention layer
    pub fn init<B: Backend>(&self, device: &B::Device) -> TemporalAttention<B> {
        let weight = Initializer::XavierUniform { gain: 1.0 }.init_with(
            [self.d_input, 1],
            Some(self.d_input),
            Some(1),
            device,
        );
        let bias = Initializer::Zeros.init([self.seq_len, 1], device);

        TemporalAttention { weight, bias }
    }
}

impl<B: Backend> TemporalAttention<B> {
    /// Collapse a `(batch, T, C)` sequence into a `(batch, C)` context vector
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [_, _, channels] = x.dims();

        // x·W as a broadcast multiply-and-reduce over the channel axis
        let w = self.weight.val().reshape([1, 1, channels]);
        let scores = (x.clone() * w).sum_dim(2);

        // e = tanh(x·W + b), shape [batch, T, 1]
        let b = self.bias.val().unsqueeze::<3>();
        let e = (scores + b).tanh();

        // Normalize across the time axis and pool
        let a = softmax(e, 1);
        (x * a).sum_dim(1).squeeze::<2>(1)
    }

    /// Attention weights for a batch, shape [batch, T]
    pub fn attention_weights(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [_, _, channels] = x.dims();
        let w = self.weight.val().reshape([1, 1, channels]);
        let scores = (x * w).sum_dim(2);
        let e = (scores + self.bias.val().unsqueeze::<3>()).tanh();
        softmax(e, 1).squeeze::<2>(2)
    }
}
