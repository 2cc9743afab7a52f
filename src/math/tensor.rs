use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/// Channel-first 3-D tensor (`channels x height x width`) stored flat.
///
/// Index of `(c, y, x)` is `(c * height + y) * width + x`, which keeps each
/// channel's plane contiguous for the convolution loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor3 {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<f64>,
}

impl Tensor3 {
    pub fn zeros(channels: usize, height: usize, width: usize) -> Tensor3 {
        Tensor3 { channels, height, width, data: vec![0.0; channels * height * width] }
    }

    pub fn from_flat(channels: usize, height: usize, width: usize, data: Vec<f64>) -> Result<Tensor3> {
        let expected = channels * height * width;
        if data.len() != expected {
            return Err(Error::shape(
                format!("{channels}x{height}x{width} ({expected} values)"),
                format!("{} values", data.len()),
            ));
        }
        Ok(Tensor3 { channels, height, width, data })
    }

    /// Checks that `data` holds exactly `channels * height * width` values,
    /// for tensors that arrived through deserialization.
    pub fn validate(&self) -> Result<()> {
        let expected = self.channels * self.height * self.width;
        if self.data.len() != expected {
            return Err(Error::shape(
                format!("{}x{}x{} ({expected} values)", self.channels, self.height, self.width),
                format!("{} values", self.data.len()),
            ));
        }
        Ok(())
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.height, self.width)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, c: usize, y: usize, x: usize) -> usize {
        (c * self.height + y) * self.width + x
    }

    #[inline]
    pub fn get(&self, c: usize, y: usize, x: usize) -> f64 {
        self.data[self.index(c, y, x)]
    }

    #[inline]
    pub fn set(&mut self, c: usize, y: usize, x: usize, value: f64) {
        let i = self.index(c, y, x);
        self.data[i] = value;
    }

    pub fn map<F>(&self, functor: F) -> Tensor3
    where
        F: Fn(f64) -> f64,
    {
        Tensor3 {
            channels: self.channels,
            height: self.height,
            width: self.width,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn into_flat(self) -> Vec<f64> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_channel_first() {
        let t = Tensor3::from_flat(2, 2, 3, (0..12).map(|v| v as f64).collect()).unwrap();
        assert_eq!(t.get(0, 0, 2), 2.0);
        assert_eq!(t.get(0, 1, 0), 3.0);
        assert_eq!(t.get(1, 0, 0), 6.0);
        assert_eq!(t.get(1, 1, 2), 11.0);
    }

    #[test]
    fn from_flat_rejects_wrong_length() {
        let err = Tensor3::from_flat(3, 4, 4, vec![0.0; 47]).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }
}
