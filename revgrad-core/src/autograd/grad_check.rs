//! Finite-difference gradient checking.
//!
//! The testing oracle: for a function built from the
//! engine's primitives, the analytic gradients from `backward()` must
//! agree with a central-difference numerical estimate. The scalar loss
//! is `sum(func(inputs) * output_grad)`, so arbitrary seed gradients are
//! honored. Internal arithmetic runs in `f64` to keep the comparison
//! itself from drowning in rounding noise; the tensors stay `f32`, so
//! callers should pick `epsilon` accordingly (around `1e-3` for
//! unit-scale data).

use thiserror::Error;

use crate::error::RevGradError;
use crate::ops::arithmetic::mul_op;
use crate::ops::reduction::sum_op;
use crate::tensor::Tensor;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad} != numerical {numerical_grad} (difference {difference})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },

    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(RevGradError),

    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(RevGradError),

    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(#[from] RevGradError),

    #[error("Input tensor {input_index} requires grad but has no gradient after backward pass.")]
    MissingAnalyticalGrad { input_index: usize },

    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index} (loss+: {loss_plus}, loss-: {loss_minus})")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}: {value}")]
    AnalyticalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },

    #[error("Gradient check input tensors must be leaf nodes (no grad_fn). Input index: {input_index}")]
    InputNotLeaf { input_index: usize },

    #[error("Function did not propagate requires_grad correctly.")]
    RequiresGradPropagationError,
}

/// Checks analytical gradients against central finite differences.
///
/// Runs `func` forward and backward once to collect analytic gradients,
/// then perturbs every element of every grad-requiring input by
/// `±epsilon` and compares `(loss(x+ε) − loss(x−ε)) / 2ε` against the
/// analytic value. A mismatch must exceed `tolerance` both absolutely
/// and relative to the analytic magnitude to count as a failure.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, RevGradError>,
{
    for (i, input) in inputs.iter().enumerate() {
        if input.requires_grad() && input.grad_fn().is_some() {
            return Err(GradCheckError::InputNotLeaf { input_index: i });
        }
    }

    // Clear stale gradients so the analytic pass starts fresh.
    for input in inputs {
        if input.requires_grad() {
            input.zero_grad();
        }
    }

    let output = func(inputs).map_err(GradCheckError::ForwardPassError)?;

    let any_input_requires_grad = inputs.iter().any(|t| t.requires_grad());
    if any_input_requires_grad && !output.requires_grad() {
        return Err(GradCheckError::RequiresGradPropagationError);
    }

    if output.requires_grad() {
        output
            .backward(Some(output_grad.clone()))
            .map_err(GradCheckError::BackwardPassError)?;
    }

    let analytical_grads: Vec<Option<Tensor>> = inputs.iter().map(|t| t.grad()).collect();

    for (i, original_input) in inputs.iter().enumerate() {
        if !original_input.requires_grad() {
            continue;
        }

        let analytical_tensor = analytical_grads[i]
            .as_ref()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index: i })?;
        let analytical_data: Vec<f64> = analytical_tensor
            .get_f32_data()
            .iter()
            .map(|&x| x as f64)
            .collect();
        let original_data: Vec<f64> = original_input
            .get_f32_data()
            .iter()
            .map(|&x| x as f64)
            .collect();
        let shape = original_input.shape();

        for elem_idx in 0..original_input.numel() {
            let loss_plus =
                perturbed_loss(&func, inputs, i, elem_idx, epsilon, &original_data, &shape, output_grad)?;
            let loss_minus = perturbed_loss(
                &func,
                inputs,
                i,
                elem_idx,
                -epsilon,
                &original_data,
                &shape,
                output_grad,
            )?;

            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            let analytical_grad = analytical_data[elem_idx];

            if numerical_grad.is_nan() || numerical_grad.is_infinite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index: i,
                    element_index: elem_idx,
                    loss_plus,
                    loss_minus,
                });
            }
            if analytical_grad.is_nan() || analytical_grad.is_infinite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    input_index: i,
                    element_index: elem_idx,
                    value: analytical_grad,
                });
            }

            let difference = (analytical_grad - numerical_grad).abs();
            if difference > tolerance
                && (difference / (analytical_grad.abs() + epsilon)) > tolerance
            {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: elem_idx,
                    analytical_grad,
                    numerical_grad,
                    difference,
                });
            }
        }
    }

    Ok(())
}

/// Evaluates the scalar loss with input `input_index`'s element
/// `elem_idx` shifted by `delta`.
#[allow(clippy::too_many_arguments)]
fn perturbed_loss<F>(
    func: &F,
    inputs: &[Tensor],
    input_index: usize,
    elem_idx: usize,
    delta: f64,
    original_data: &[f64],
    shape: &[usize],
    output_grad: &Tensor,
) -> Result<f64, GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, RevGradError>,
{
    let mut data = original_data.to_vec();
    data[elem_idx] += delta;
    let data_f32: Vec<f32> = data.iter().map(|&x| x as f32).collect();
    let perturbed = Tensor::new(data_f32, shape.to_vec())?;
    if inputs[input_index].requires_grad() {
        perturbed.requires_grad_(true)?;
    }

    let mut probe: Vec<Tensor> = inputs.to_vec();
    probe[input_index] = perturbed;

    let output = func(&probe).map_err(GradCheckError::ForwardPassError)?;
    calculate_loss(&output, output_grad)
}

/// Scalar loss for gradient checking: the output weighted by the seed
/// gradient and summed, so the numerical estimate matches what
/// `backward(Some(output_grad))` differentiates.
fn calculate_loss(tensor: &Tensor, output_grad: &Tensor) -> Result<f64, GradCheckError> {
    if tensor.shape() != output_grad.shape() {
        return Err(GradCheckError::TensorError(RevGradError::ShapeMismatch {
            expected: tensor.shape(),
            actual: output_grad.shape(),
            operation: "calculate_loss (grad_check)".to_string(),
        }));
    }

    let weighted = mul_op(&tensor.detach(), &output_grad.detach())?;
    let loss = sum_op(&weighted, None, false)?;
    Ok(loss.item()? as f64)
}
