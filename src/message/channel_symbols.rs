//! Channel symbol generation: payload assembly, convolutional FEC,
//! bit-reversal interleaving and the sync vector merge.

use bitvec::prelude::*;

use crate::constants::{FEC_POLY_A, FEC_POLY_B, SYMBOL_COUNT, SYNC_VECTOR};
use crate::util::bitvec_utils::PackBitvecFieldType;

use super::SymbolSequence;

/// Number of payload bits fed through the convolutional encoder. The
/// 50-bit message plus enough trailing zeros to flush the K=32 registers.
const FEC_INPUT_BITS: usize = 81;

/// Produce the 162-symbol channel sequence for a packed callsign, grid
/// and power level.
pub(crate) fn channel_symbols(call_int: u32, grid_int: u32, power: u8) -> SymbolSequence {
    // Power rides in the low 7 bits under the grid: the +64 offset keeps
    // the field positive for the full -64..63 dBm range of the format.
    let pwr_int = grid_int * 128 + power as u32 + 64;

    // 28 bits callsign, 22 bits grid+power, left-shifted 6 so the 50-bit
    // payload fills seven whole bytes.
    let comb_int: u64 = (((call_int as u64) << 22) | (pwr_int as u64 & 0x3F_FFFF)) << 6;

    let mut payload: BitVec<u8, Msb0> = BitVec::with_capacity(FEC_INPUT_BITS);
    comb_int.pack_into_bitvec(&mut payload, 56);
    payload.resize(FEC_INPUT_BITS, false);

    // Rate 1/2 convolutional encode: two shift registers, one parity bit
    // from each per input bit, emitted in (A, B) order.
    let mut reg_a: u32 = 0;
    let mut reg_b: u32 = 0;
    let mut fec = [0u8; SYMBOL_COUNT];
    for (i, bit) in payload.iter().by_vals().enumerate() {
        reg_a = (reg_a << 1) | bit as u32;
        reg_b = (reg_b << 1) | bit as u32;
        fec[2 * i] = ((reg_a & FEC_POLY_A).count_ones() & 1) as u8;
        fec[2 * i + 1] = ((reg_b & FEC_POLY_B).count_ones() & 1) as u8;
    }

    // Interleave: FEC bits land at the 8-bit reversal of their running
    // slot counter, skipping reversals past the end of the sequence.
    let mut data = [0u8; SYMBOL_COUNT];
    let mut next_bit = 0;
    for slot in 0u8..=255 {
        let r = slot.reverse_bits() as usize;
        if r < SYMBOL_COUNT {
            data[r] = fec[next_bit];
            next_bit += 1;
            if next_bit == SYMBOL_COUNT {
                break;
            }
        }
    }

    let mut symbols = [0u8; SYMBOL_COUNT];
    for i in 0..SYMBOL_COUNT {
        symbols[i] = SYNC_VECTOR[i] + 2 * data[i];
    }
    symbols
}
