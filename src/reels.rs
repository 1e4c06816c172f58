//! Fixed-width row of digit reels.
//!
//! Digits are stored most-significant first. Positions used by the public
//! accessors count from the other end: position 0 is the least-significant
//! reel, the one that moves on every step.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;

use crate::error::{OdometerError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelSequence {
    digits: Vec<u8>,
    decimal_digits: u32,
}

impl ReelSequence {
    /// All reels at zero.
    pub fn new(reel_count: usize, decimal_digits: u32) -> Self {
        Self {
            digits: vec![0; reel_count],
            decimal_digits,
        }
    }

    pub fn random<R: Rng + ?Sized>(reel_count: usize, decimal_digits: u32, rng: &mut R) -> Self {
        let mut reels = Self::new(reel_count, decimal_digits);
        reels.randomize(rng);
        reels
    }

    pub fn from_digits(digits: &[u8], decimal_digits: u32) -> Result<Self> {
        if let Some(&bad) = digits.iter().find(|&&d| d > 9) {
            return Err(OdometerError::InvalidLayout(format!(
                "digit {bad} is not in 0..=9"
            )));
        }
        Ok(Self {
            digits: digits.to_vec(),
            decimal_digits,
        })
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for digit in self.digits.iter_mut() {
            *digit = rng.random_range(0..10);
        }
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn decimal_digits(&self) -> u32 {
        self.decimal_digits
    }

    /// Digits, most-significant first.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Digit at `position`, where 0 is the least-significant reel.
    pub fn digit(&self, position: usize) -> Option<u8> {
        let index = self.index_of(position)?;
        Some(self.digits[index])
    }

    pub(crate) fn set_digit(&mut self, position: usize, digit: u8) {
        if let Some(index) = self.index_of(position) {
            self.digits[index] = digit % 10;
        }
    }

    fn index_of(&self, position: usize) -> Option<usize> {
        (position < self.digits.len()).then(|| self.digits.len() - 1 - position)
    }

    pub fn unit_scale(&self) -> f64 {
        10f64.powi(self.decimal_digits as i32)
    }

    /// 10^N, the first unit count that no longer fits.
    pub fn capacity_units(&self) -> u64 {
        10u64.pow(self.digits.len() as u32)
    }

    /// Displayed number counted in least-significant steps.
    pub fn units(&self) -> u64 {
        self.digits
            .iter()
            .fold(0u64, |acc, &digit| acc * 10 + digit as u64)
    }

    pub fn current_value(&self) -> f64 {
        self.units() as f64 / self.unit_scale()
    }

    /// Converts a displayed value to units, if the reels can show it.
    pub fn units_for(&self, value: f64) -> Option<u64> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let units = (value * self.unit_scale()).round();
        (units < self.capacity_units() as f64).then_some(units as u64)
    }

    pub fn set_units(&mut self, units: u64) -> Result<()> {
        if units >= self.capacity_units() {
            return Err(OdometerError::Range {
                value: units as f64 / self.unit_scale(),
                reel_count: self.digits.len(),
            });
        }
        let mut remaining = units;
        for digit in self.digits.iter_mut().rev() {
            *digit = (remaining % 10) as u8;
            remaining /= 10;
        }
        Ok(())
    }

    /// Sets every reel from `value`, zero-padded. Leaves the reels untouched on error.
    pub fn set_value(&mut self, value: f64) -> Result<()> {
        let units = self.units_for(value).ok_or(OdometerError::Range {
            value,
            reel_count: self.digits.len(),
        })?;
        self.set_units(units)
    }

    /// Reels that move together on the next +1 step, least-significant first.
    ///
    /// Every reel showing 9 rolls over and drags its left neighbour along; the
    /// run stops at the first reel that is not 9. A row of nines selects all
    /// reels and the carry out of the top reel is dropped.
    pub fn carry_group(&self) -> Vec<usize> {
        let mut group = Vec::new();
        for position in 0..self.digits.len() {
            group.push(position);
            if self.digit(position) != Some(9) {
                break;
            }
        }
        group
    }

    /// Post-step digit of each reel in the carry group.
    pub fn pending_step(&self) -> BTreeMap<usize, u8> {
        self.carry_group()
            .into_iter()
            .filter_map(|position| {
                self.digit(position)
                    .map(|digit| (position, (digit + 1) % 10))
            })
            .collect()
    }

    /// Applies one step immediately, without animation.
    pub fn increment(&mut self) {
        for (position, digit) in self.pending_step() {
            self.set_digit(position, digit);
        }
    }
}

impl fmt::Display for ReelSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let split = self.digits.len().saturating_sub(self.decimal_digits as usize);
        for (index, digit) in self.digits.iter().enumerate() {
            if index == split && self.decimal_digits > 0 {
                if index == 0 {
                    write!(f, "0")?;
                }
                write!(f, ".")?;
            }
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}
