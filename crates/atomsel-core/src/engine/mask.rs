/// A boolean selection over the atoms of one system, index-aligned with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Mask {
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(len: usize, value: bool) -> Self {
        Self {
            bits: vec![value; len],
        }
    }

    pub fn none(len: usize) -> Self {
        Self::new(len, false)
    }

    pub fn all(len: usize) -> Self {
        Self::new(len, true)
    }

    /// Builds a mask of length `len` with the given indices set. Out-of-range
    /// indices are ignored.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::none(len);
        for i in indices {
            if let Some(bit) = mask.bits.get_mut(i) {
                *bit = true;
            }
        }
        mask
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    pub fn set(&mut self, index: usize, value: bool) {
        self.bits[index] = value;
    }

    /// Number of selected atoms.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn any(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    /// Selected atom indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.iter_indices().collect()
    }

    pub fn iter_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn and(&self, other: &Mask) -> Mask {
        self.zip_with(other, |a, b| a && b)
    }

    pub fn or(&self, other: &Mask) -> Mask {
        self.zip_with(other, |a, b| a || b)
    }

    pub fn and_not(&self, other: &Mask) -> Mask {
        self.zip_with(other, |a, b| a && !b)
    }

    pub fn not(&self) -> Mask {
        Mask {
            bits: self.bits.iter().map(|&b| !b).collect(),
        }
    }

    fn zip_with(&self, other: &Mask, op: impl Fn(bool, bool) -> bool) -> Mask {
        debug_assert_eq!(self.len(), other.len(), "masks of different systems");
        Mask {
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        }
    }
}

impl From<Vec<bool>> for Mask {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl FromIterator<bool> for Mask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}
