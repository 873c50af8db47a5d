//! Creation helpers for leaf tensors.

use rand::thread_rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::RevGradError;
use crate::tensor::Tensor;

/// Creates a tensor of the given shape filled with zeros.
pub fn zeros(shape: Vec<usize>) -> Result<Tensor, RevGradError> {
    full(shape, 0.0)
}

/// Creates a tensor of the given shape filled with ones.
pub fn ones(shape: Vec<usize>) -> Result<Tensor, RevGradError> {
    full(shape, 1.0)
}

/// Creates a tensor of the given shape filled with `value`.
pub fn full(shape: Vec<usize>, value: f32) -> Result<Tensor, RevGradError> {
    let numel: usize = shape.iter().product();
    Tensor::new(vec![value; numel], shape)
}

/// Creates a zero tensor with the same shape as `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, RevGradError> {
    zeros(tensor.shape())
}

/// Creates a ones tensor with the same shape as `tensor`.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, RevGradError> {
    ones(tensor.shape())
}

/// Creates a tensor of the given shape with standard-normal samples.
pub fn randn(shape: Vec<usize>) -> Result<Tensor, RevGradError> {
    let numel: usize = shape.iter().product();
    let mut rng = thread_rng();
    let data: Vec<f32> = (0..numel)
        .map(|_| StandardNormal.sample(&mut rng))
        .collect();
    Tensor::new(data, shape)
}
