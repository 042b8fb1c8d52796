use bitvec::prelude::*;

/// Push the low `width` bits of a field onto a bitvec, MSB first.
pub trait PackBitvecFieldType {
    fn pack_into_bitvec(&self, bits: &mut BitVec<u8, Msb0>, width: usize);
}

impl PackBitvecFieldType for u64 {
    fn pack_into_bitvec(&self, bits: &mut BitVec<u8, Msb0>, width: usize) {
        for i in (0..width).rev() {
            bits.push((self >> i) & 1 == 1);
        }
    }
}

pub trait BitvecToString {
    fn to_bit_string(&self) -> String;
}

impl BitvecToString for BitVec<u8, Msb0> {
    fn to_bit_string(&self) -> String {
        self.iter().map(|b| if *b { '1' } else { '0' }).collect()
    }
}
