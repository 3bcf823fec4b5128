use burn::{
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{activation::relu, backend::AutodiffBackend, ElementConversion},
};
use nn::{
    loss::{MseLoss, Reduction},
    Linear, LinearConfig,
};

use crate::error::Error;

use super::{check_input, Regressor};

/// A burn module with a single ReLU hidden layer and a scalar output
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> Mlp<B> {
    /// Forward pass through the model, `[batch, input] -> [batch, 1]`
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(input));
        self.output.forward(x)
    }
}

/// Configuration for the [`MlpRegressor`]
#[derive(Config, Debug)]
pub struct MlpRegressorConfig {
    /// The number of features of a state
    pub input_size: usize,
    /// Width of the hidden layer
    #[config(default = 100)]
    pub hidden_size: usize,
    /// Learning rate of the optimizer
    #[config(default = 3e-3)]
    pub learning_rate: f64,
}

impl MlpRegressorConfig {
    /// Build an unfitted regressor trained with AdamW
    pub fn init<B: AutodiffBackend>(
        &self,
        device: &B::Device,
    ) -> MlpRegressor<B, impl Optimizer<Mlp<B>, B>> {
        MlpRegressor {
            model: Mlp {
                hidden: LinearConfig::new(self.input_size, self.hidden_size).init(device),
                output: LinearConfig::new(self.hidden_size, 1).init(device),
            },
            optimizer: AdamWConfig::new().init::<B, Mlp<B>>(),
            loss: MseLoss::new(),
            device: device.clone(),
            input_size: self.input_size,
            lr: self.learning_rate,
            fitted: false,
        }
    }
}

/// A [`Regressor`] backed by an [`Mlp`], trained with one AdamW step per sample
///
/// ### Generics
/// - `B`: A burn autodiff backend
/// - `O`: The [`Optimizer`] taking the training steps
pub struct MlpRegressor<B: AutodiffBackend, O> {
    model: Mlp<B>,
    optimizer: O,
    loss: MseLoss<B>,
    device: B::Device,
    input_size: usize,
    lr: f64,
    fitted: bool,
}

impl<B: AutodiffBackend, O> MlpRegressor<B, O> {
    fn to_input(&self, input: &[f32]) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(input, &self.device).unsqueeze::<2>()
    }
}

impl<B, O> Regressor for MlpRegressor<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Mlp<B>, B>,
{
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn predict(&self, input: &[f32]) -> crate::Result<f32> {
        check_input(input, self.input_size)?;
        if !self.fitted {
            return Err(Error::NotFitted);
        }

        let output = self.model.forward(self.to_input(input)).into_scalar();
        Ok(output.elem::<f32>())
    }

    fn partial_fit(&mut self, input: &[f32], target: f32) -> crate::Result<()> {
        check_input(input, self.input_size)?;

        let prediction = self.model.forward(self.to_input(input));
        let target = Tensor::<B, 2>::from_floats([[target]], &self.device);
        let loss = self.loss.forward(prediction, target, Reduction::Mean);

        // Backpropagate and take a single optimizer step
        let grads = GradientsParams::from_grads(loss.backward(), &self.model);
        self.model = self.optimizer.step(self.lr, self.model.clone(), grads);
        self.fitted = true;

        Ok(())
    }
}
