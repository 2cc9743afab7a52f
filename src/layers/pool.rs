use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::tensor::Tensor3;

/// Max pooling with a square window and stride equal to the window.
/// Trailing rows/columns that do not fill a window are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxPool2d {
    pub size: usize,
    #[serde(skip)]
    cache: Option<((usize, usize, usize), Vec<usize>)>,
}

impl MaxPool2d {
    pub fn new(size: usize) -> MaxPool2d {
        assert!(size > 0, "pool size must be at least 1");
        MaxPool2d { size, cache: None }
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::config("pool size must be at least 1"));
        }
        Ok(())
    }

    pub fn output_shape(&self, height: usize, width: usize) -> (usize, usize) {
        (height / self.size, width / self.size)
    }

    pub fn forward(&mut self, input: &Tensor3) -> Tensor3 {
        let (out_h, out_w) = self.output_shape(input.height, input.width);
        let mut out = Tensor3::zeros(input.channels, out_h, out_w);
        let mut argmax = Vec::with_capacity(out.len());

        for c in 0..input.channels {
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut best = input.index(c, oy * self.size, ox * self.size);
                    for dy in 0..self.size {
                        for dx in 0..self.size {
                            let i = input.index(c, oy * self.size + dy, ox * self.size + dx);
                            if input.data[i] > input.data[best] {
                                best = i;
                            }
                        }
                    }
                    out.set(c, oy, ox, input.data[best]);
                    argmax.push(best);
                }
            }
        }

        self.cache = Some((input.shape(), argmax));
        out
    }

    /// Routes each output gradient to the input element that won the max.
    pub fn backward(&mut self, grad_output: &Tensor3) -> Tensor3 {
        let ((c, h, w), argmax) = self.cache.take()
            .expect("MaxPool2d::backward called without a matching forward");
        let mut grad_in = Tensor3::zeros(c, h, w);
        for (g, &i) in grad_output.data.iter().zip(argmax.iter()) {
            grad_in.data[i] += g;
        }
        grad_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_window_maximum_and_routes_gradient() {
        let input = Tensor3::from_flat(1, 3, 4, vec![
            1.0, 5.0, 2.0, 0.0,
            3.0, 4.0, 8.0, 1.0,
            9.0, 9.0, 9.0, 9.0,
        ]).unwrap();
        let mut pool = MaxPool2d::new(2);
        let out = pool.forward(&input);
        assert_eq!(out.shape(), (1, 1, 2));
        assert_eq!(out.data, vec![5.0, 8.0]);

        let grad = pool.backward(&Tensor3::from_flat(1, 1, 2, vec![1.0, 2.0]).unwrap());
        assert_eq!(grad.get(0, 0, 1), 1.0);
        assert_eq!(grad.get(0, 1, 2), 2.0);
        assert_eq!(grad.data.iter().sum::<f64>(), 3.0);
    }
}
