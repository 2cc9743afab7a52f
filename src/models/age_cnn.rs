use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{Error, Result},
    layers::{conv::Conv2d, dense::Dense, pool::MaxPool2d},
    math::tensor::Tensor3,
    models::Model,
    optim::Parameter,
};

/// Small convolutional classifier for age groups:
///
/// ```text
/// conv 3x3 (c -> 16, pad 1) ReLU -> maxpool 2
/// conv 3x3 (16 -> 32, pad 1) ReLU -> maxpool 2
/// flatten -> dense 64 ReLU -> dense n_classes Softmax
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeCnn {
    pub input_shape: (usize, usize, usize),
    pub conv1: Conv2d,
    pub pool1: MaxPool2d,
    pub conv2: Conv2d,
    pub pool2: MaxPool2d,
    pub hidden: Dense,
    pub output: Dense,
    /// Shape of the tensor entering `flatten`, needed to un-flatten gradients.
    feature_shape: (usize, usize, usize),
}

const CONV1_CHANNELS: usize = 16;
const CONV2_CHANNELS: usize = 32;
const HIDDEN_UNITS: usize = 64;

impl AgeCnn {
    pub fn new<R: Rng + ?Sized>(
        channels: usize,
        height: usize,
        width: usize,
        n_classes: usize,
        rng: &mut R,
    ) -> Result<AgeCnn> {
        if channels == 0 || n_classes == 0 {
            return Err(Error::config("AgeCnn needs at least one channel and one class"));
        }
        let conv1 = Conv2d::new(channels, CONV1_CHANNELS, 3, 1, ActivationFunction::ReLU, rng);
        let pool1 = MaxPool2d::new(2);
        let conv2 = Conv2d::new(CONV1_CHANNELS, CONV2_CHANNELS, 3, 1, ActivationFunction::ReLU, rng);
        let pool2 = MaxPool2d::new(2);

        let (h1, w1) = pool1.output_shape(height, width);
        let (h2, w2) = pool2.output_shape(h1, w1);
        if h2 == 0 || w2 == 0 {
            return Err(Error::config(format!(
                "images of {height}x{width} are too small for two 2x2 pooling stages"
            )));
        }
        let flat = CONV2_CHANNELS * h2 * w2;

        Ok(AgeCnn {
            input_shape: (channels, height, width),
            conv1,
            pool1,
            conv2,
            pool2,
            hidden: Dense::new(HIDDEN_UNITS, flat, ActivationFunction::ReLU, rng),
            output: Dense::new(n_classes, HIDDEN_UNITS, ActivationFunction::Softmax, rng),
            feature_shape: (CONV2_CHANNELS, h2, w2),
        })
    }

    pub fn n_classes(&self) -> usize {
        self.output.size
    }

    /// Checks an image against the shape the network was built for.
    pub fn check_input(&self, image: &Tensor3) -> Result<()> {
        if image.shape() != self.input_shape {
            let (c, h, w) = self.input_shape;
            let (fc, fh, fw) = image.shape();
            return Err(Error::shape(format!("{c}x{h}x{w}"), format!("{fc}x{fh}x{fw}")));
        }
        Ok(())
    }
}

impl Model for AgeCnn {
    type Input = Tensor3;

    fn forward(&mut self, image: &Tensor3) -> Vec<f64> {
        let x = self.conv1.forward(image);
        let x = self.pool1.forward(&x);
        let x = self.conv2.forward(&x);
        let x = self.pool2.forward(&x);
        self.hidden.clear_cache();
        self.output.clear_cache();
        let x = self.hidden.forward(&x.data);
        self.output.forward(&x)
    }

    fn backward(&mut self, grad_output: &[f64]) {
        let g = self.output.backward(grad_output);
        let g = self.hidden.backward(&g);
        let (c, h, w) = self.feature_shape;
        let g = Tensor3 { channels: c, height: h, width: w, data: g };
        let g = self.pool2.backward(&g);
        let g = self.conv2.backward(&g);
        let g = self.pool1.backward(&g);
        self.conv1.backward(&g);
    }

    fn validate(&self) -> Result<()> {
        self.conv1.validate()?;
        self.conv2.validate()?;
        self.pool1.validate()?;
        self.pool2.validate()?;
        let (c, h, w) = self.input_shape;
        if self.conv1.in_channels != c || self.conv2.in_channels != self.conv1.out_channels {
            return Err(Error::config(format!(
                "convolutions chain {} -> {} and {} -> {} for {c}-channel input",
                self.conv1.in_channels, self.conv1.out_channels,
                self.conv2.in_channels, self.conv2.out_channels
            )));
        }

        let (h, w) = self.conv1.output_shape(h, w);
        let (h, w) = self.pool1.output_shape(h, w);
        let (h, w) = self.conv2.output_shape(h, w);
        let (h, w) = self.pool2.output_shape(h, w);
        let features = (self.conv2.out_channels, h, w);
        if h == 0 || w == 0 || features != self.feature_shape {
            return Err(Error::shape(format!("{:?} feature map", features), format!("{:?}", self.feature_shape)));
        }
        let flat = features.0 * h * w;
        if self.hidden.input_size != flat || self.output.input_size != self.hidden.size {
            return Err(Error::config(format!(
                "dense layers read {} and {} inputs, expected {flat} and {}",
                self.hidden.input_size, self.output.input_size, self.hidden.size
            )));
        }
        self.hidden.validate()?;
        self.output.validate()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        let mut params = self.conv1.parameters_mut();
        params.extend(self.conv2.parameters_mut());
        params.extend(self.hidden.parameters_mut());
        params.extend(self.output.parameters_mut());
        params
    }
}
