use crate::networks::{LinearGradients, Network};

use ndarray::{Array, Dimension, Zip};

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const EPSILON: f32 = 1e-8;

/// First and second moment estimates of one parameter array.
#[derive(Clone, Debug)]
struct Moments<D: Dimension> {
    m: Array<f32, D>,
    v: Array<f32, D>,
}

impl<D: Dimension> Moments<D> {
    fn zeros(shape: D) -> Moments<D> {
        Moments {
            m: Array::zeros(shape.clone()),
            v: Array::zeros(shape),
        }
    }

    fn update(
        &mut self,
        parameters: &mut Array<f32, D>,
        gradients: &Array<f32, D>,
        step_size: f32,
        correction2: f32,
    ) {
        Zip::from(parameters)
            .and(gradients)
            .and(&mut self.m)
            .and(&mut self.v)
            .for_each(|p, &g, m, v| {
                *m = BETA1 * *m + (1.0 - BETA1) * g;
                *v = BETA2 * *v + (1.0 - BETA2) * g * g;
                *p -= step_size * *m / ((*v / correction2).sqrt() + EPSILON);
            });
    }
}

/// The Adam optimizer, holding moment estimates
/// for every linear layer of one network.
#[derive(Clone, Debug)]
pub(crate) struct Adam {
    learning_rate: f32,
    steps: i32,
    weights: Vec<Moments<ndarray::Ix2>>,
    biases: Vec<Moments<ndarray::Ix1>>,
}

impl Adam {
    pub(crate) fn new(network: &Network, learning_rate: f32) -> Adam {
        let (weights, biases) = network
            .linear_layers()
            .map(|linear| {
                (
                    Moments::zeros(linear.weights.raw_dim()),
                    Moments::zeros(linear.bias.raw_dim()),
                )
            })
            .unzip();
        Adam {
            learning_rate,
            steps: 0,
            weights,
            biases,
        }
    }

    /// Applies one update. `gradients` must hold one
    /// entry per linear layer, from input to output.
    pub(crate) fn step(&mut self, network: &mut Network, gradients: &[LinearGradients]) {
        self.steps += 1;
        let correction1 = 1.0 - BETA1.powi(self.steps);
        let correction2 = 1.0 - BETA2.powi(self.steps);
        let step_size = self.learning_rate / correction1;

        for (((linear, grads), weights), biases) in network
            .linear_layers_mut()
            .zip(gradients)
            .zip(&mut self.weights)
            .zip(&mut self.biases)
        {
            weights.update(&mut linear.weights, &grads.weights, step_size, correction2);
            biases.update(&mut linear.bias, &grads.bias, step_size, correction2);
        }
    }
}
