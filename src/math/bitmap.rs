// Copyright 2020 @TwoCookingMice

use super::constants::Float;

use std::ops;
use std::vec::Vec;

/// Single channel image laid out row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    data: Vec<Float>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Float;

    fn index(&self, index: (usize, usize)) -> &Float {
        assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Float {
        assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self { data: vec![0.0; width * height],
               width: width,
               height: height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[Float] {
        &self.data
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().map(|v| *v as f64).sum()
    }

    pub fn max(&self) -> Float {
        self.data.iter().cloned().fold(0.0, Float::max)
    }

    pub fn fill(&mut self, value: Float) {
        for v in self.data.iter_mut() {
            *v = value;
        }
    }

    /// Element-wise accumulate `other` into `self`. Both must share dimensions.
    pub fn add_assign(&mut self, other: &Bitmap) {
        assert_eq!((self.width, self.height), (other.width, other.height));
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += *b;
        }
    }

    pub fn scale(&mut self, factor: Float) {
        for v in self.data.iter_mut() {
            *v *= factor;
        }
    }
}

/* Test for Bitmap */
