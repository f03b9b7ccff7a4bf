//! Numeric operator families over patterns
//!
//! Every binary operation comes in three flavours differing only in whose
//! structure survives: `*_both` intersects both sides, `*_left` keeps the
//! left pattern's event spans and samples the right at each onset, and
//! `*_right` does the opposite.

use crate::Pattern;
use std::ops::{Add, Div, Mul, Rem, Sub};

impl<T> Pattern<T>
where
    T: Clone + Send + Sync + 'static + Add<Output = T>,
{
    /// Pairwise addition, structure from both sides
    pub fn add_both(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_both(other, |a, b| a.clone() + b.clone())
    }

    /// Pairwise addition, structure from the left
    pub fn add_left(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_left(other, |a, b| a.clone() + b.clone())
    }

    /// Pairwise addition, structure from the right
    pub fn add_right(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_right(other, |a, b| a.clone() + b.clone())
    }
}

impl<T> Pattern<T>
where
    T: Clone + Send + Sync + 'static + Sub<Output = T>,
{
    /// Pairwise subtraction, structure from both sides
    pub fn sub_both(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_both(other, |a, b| a.clone() - b.clone())
    }

    /// Pairwise subtraction, structure from the left
    pub fn sub_left(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_left(other, |a, b| a.clone() - b.clone())
    }

    /// Pairwise subtraction, structure from the right
    pub fn sub_right(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_right(other, |a, b| a.clone() - b.clone())
    }
}

impl<T> Pattern<T>
where
    T: Clone + Send + Sync + 'static + Mul<Output = T>,
{
    /// Pairwise multiplication, structure from both sides
    pub fn mul_both(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_both(other, |a, b| a.clone() * b.clone())
    }

    /// Pairwise multiplication, structure from the left
    pub fn mul_left(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_left(other, |a, b| a.clone() * b.clone())
    }

    /// Pairwise multiplication, structure from the right
    pub fn mul_right(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_right(other, |a, b| a.clone() * b.clone())
    }
}

impl<T> Pattern<T>
where
    T: Clone + Send + Sync + 'static + Div<Output = T>,
{
    /// Pairwise division, structure from both sides
    pub fn div_both(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_both(other, |a, b| a.clone() / b.clone())
    }

    /// Pairwise division, structure from the left
    pub fn div_left(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_left(other, |a, b| a.clone() / b.clone())
    }

    /// Pairwise division, structure from the right
    pub fn div_right(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_right(other, |a, b| a.clone() / b.clone())
    }
}

impl<T> Pattern<T>
where
    T: Clone + Send + Sync + 'static + Rem<Output = T>,
{
    /// Pairwise remainder, structure from both sides
    pub fn rem_both(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_both(other, |a, b| a.clone() % b.clone())
    }

    /// Pairwise remainder, structure from the left
    pub fn rem_left(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_left(other, |a, b| a.clone() % b.clone())
    }

    /// Pairwise remainder, structure from the right
    pub fn rem_right(self, other: Pattern<T>) -> Pattern<T> {
        self.zip_right(other, |a, b| a.clone() % b.clone())
    }
}

impl<T: Clone + Send + Sync + 'static> Pattern<T> {
    /// Keep this pattern's values, structure from both sides
    ///
    /// The other pattern contributes timing only; its values are discarded.
    pub fn first_both<B>(self, other: Pattern<B>) -> Pattern<T>
    where
        B: Clone + Send + Sync + 'static,
    {
        self.zip_both(other, |a, _| a.clone())
    }

    /// Keep this pattern's values and structure, gated by the other
    pub fn first_left<B>(self, other: Pattern<B>) -> Pattern<T>
    where
        B: Clone + Send + Sync + 'static,
    {
        self.zip_left(other, |a, _| a.clone())
    }

    /// Keep this pattern's values on the other pattern's structure
    pub fn first_right<B>(self, other: Pattern<B>) -> Pattern<T>
    where
        B: Clone + Send + Sync + 'static,
    {
        self.zip_right(other, |a, _| a.clone())
    }

    /// Keep the other pattern's values, structure from both sides
    pub fn second_both<B>(self, other: Pattern<B>) -> Pattern<B>
    where
        B: Clone + Send + Sync + 'static,
    {
        self.zip_both(other, |_, b| b.clone())
    }

    /// Keep the other pattern's values on this pattern's structure
    pub fn second_left<B>(self, other: Pattern<B>) -> Pattern<B>
    where
        B: Clone + Send + Sync + 'static,
    {
        self.zip_left(other, |_, b| b.clone())
    }

    /// Keep the other pattern's values and structure, gated by this one
    pub fn second_right<B>(self, other: Pattern<B>) -> Pattern<B>
    where
        B: Clone + Send + Sync + 'static,
    {
        self.zip_right(other, |_, b| b.clone())
    }
}
