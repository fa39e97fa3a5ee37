//! A fixed-size vector of selection bits.

/// A fixed-size array of bits with `[u64]` storage.
///
/// The bits are stored in little-endian order within an array of `u64` words:
/// bit 0 is the least significant bit of the first word, bit 64 the least
/// significant bit of the second word, and so on. The number of words is
/// `len.div_ceil(64)`; bits beyond `len` in the final word are always 0.
///
/// Individual bit access is O(1); counting is O(n/64) using popcount.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitfield {
    len: usize,
    bits: Box<[u64]>,
}

impl Bitfield {
    /// Creates a bitfield of `len` elements with all bits cleared.
    pub fn empty(len: usize) -> Bitfield {
        Bitfield {
            len,
            bits: vec![0u64; len.div_ceil(64)].into_boxed_slice(),
        }
    }

    /// Creates a bitfield of `len` elements with all bits set.
    pub fn full(len: usize) -> Bitfield {
        let mut bits = vec![u64::MAX; len.div_ceil(64)].into_boxed_slice();
        Self::mask_tail(&mut bits, len);
        Bitfield { len, bits }
    }

    /// Creates a bitfield with bits set at the given element indices.
    ///
    /// # Panics
    ///
    /// Panics if any index is `>= len`.
    pub fn from_positions(positions: impl IntoIterator<Item = usize>, len: usize) -> Bitfield {
        let mut field = Bitfield::empty(len);
        for position in positions {
            assert!(position < len, "Index {position} out of bounds (len: {len})");
            field.set(position);
        }
        field
    }

    /// Number of elements the bitfield describes.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bit of element `index`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        (self.bits[word_index] & (1u64 << bit_position)) != 0
    }

    /// Sets the bit of element `index`.
    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        self.bits[word_index] |= 1u64 << bit_position;
    }

    /// Clears the bit of element `index`.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        self.bits[word_index] &= !(1u64 << bit_position);
    }

    /// Sets the bit of element `index` to `value`.
    #[inline]
    pub fn set_value(&mut self, index: usize, value: bool) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        let mask = 1u64 << bit_position;
        let word = &mut self.bits[word_index];
        *word = (*word & !mask) | (mask & (-(value as i64) as u64));
    }

    /// Flips the bit of element `index` and returns its new value.
    #[inline]
    pub fn toggle(&mut self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        let mask = 1u64 << bit_position;
        self.bits[word_index] ^= mask;
        (self.bits[word_index] & mask) != 0
    }

    /// Clears all bits.
    pub fn clear_all(&mut self) {
        self.bits.fill(0);
    }

    /// Sets all bits.
    pub fn set_all(&mut self) {
        self.bits.fill(u64::MAX);
        Self::mask_tail(&mut self.bits, self.len);
    }

    /// Flips all bits in place.
    pub fn negate(&mut self) {
        for word in self.bits.iter_mut() {
            *word = !*word;
        }
        Self::mask_tail(&mut self.bits, self.len);
    }

    /// Counts the set bits.
    pub fn count_set(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Counts the cleared bits.
    pub fn count_unset(&self) -> usize {
        self.len - self.count_set()
    }

    /// Returns an iterator over the indices of set bits, in ascending order.
    pub fn iter(&self) -> BitfieldIter<'_> {
        BitfieldIter {
            words: self.bits.iter(),
            current_word: 0,
            next_word_index: 0,
            base_index: 0,
            len: self.len,
        }
    }

    #[inline]
    fn bit_position(index: usize) -> (usize, usize) {
        (index / 64, index % 64)
    }

    /// Masks out any bits beyond `len` in the last storage word.
    #[inline]
    fn mask_tail(bits: &mut [u64], len: usize) {
        let partial = len % 64;
        if partial == 0 {
            return;
        }
        if let Some(last) = bits.last_mut() {
            *last &= (1u64 << partial) - 1;
        }
    }
}

impl std::fmt::Debug for Bitfield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitfield")
            .field("len", &self.len)
            .field("set", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// An iterator over the indices of set bits in a [`Bitfield`].
#[derive(Clone)]
pub struct BitfieldIter<'a> {
    words: std::slice::Iter<'a, u64>,
    current_word: u64,
    next_word_index: usize,
    base_index: usize,
    len: usize,
}

impl Iterator for BitfieldIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let index = self.base_index + self.current_word.trailing_zeros() as usize;
                if index >= self.len {
                    return None;
                }
                // Clear the least significant set bit
                self.current_word &= self.current_word - 1;
                return Some(index);
            }

            match self.words.next() {
                Some(&word) => {
                    self.current_word = word;
                    self.base_index = self.next_word_index * 64;
                    self.next_word_index += 1;
                }
                None => return None,
            }
        }
    }
}
