//! Little-endian helpers shared by the instruction and event codecs.

use arrayref::array_ref;
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

pub fn pack_u32_vec(data: &mut Vec<u8>, values: &[u32]) {
    data.extend_from_slice(&(values.len() as u32).to_le_bytes());
    values
        .iter()
        .for_each(|value| data.extend_from_slice(&value.to_le_bytes()));
}

pub fn pack_u64_vec(data: &mut Vec<u8>, values: &[u64]) {
    data.extend_from_slice(&(values.len() as u32).to_le_bytes());
    values
        .iter()
        .for_each(|value| data.extend_from_slice(&value.to_le_bytes()));
}

/// Sequential little-endian reader over a byte buffer.
pub struct Reader<'a>(pub &'a [u8]);

impl<'a> Reader<'a> {
    fn take(&mut self, length: usize) -> Result<&'a [u8], ProgramError> {
        if self.0.len() < length {
            return Err(ProgramError::InvalidInstructionData);
        }

        let (value, rest) = self.0.split_at(length);
        self.0 = rest;

        Ok(value)
    }

    pub fn u8(&mut self) -> Result<u8, ProgramError> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32, ProgramError> {
        Ok(u32::from_le_bytes(*array_ref![self.take(4)?, 0, 4]))
    }

    pub fn u64(&mut self) -> Result<u64, ProgramError> {
        Ok(u64::from_le_bytes(*array_ref![self.take(8)?, 0, 8]))
    }

    pub fn i128(&mut self) -> Result<i128, ProgramError> {
        Ok(i128::from_le_bytes(*array_ref![self.take(16)?, 0, 16]))
    }

    pub fn pubkey(&mut self) -> Result<Pubkey, ProgramError> {
        Ok(Pubkey::new_from_array(*array_ref![self.take(32)?, 0, 32]))
    }

    pub fn u32_vec(&mut self) -> Result<Vec<u32>, ProgramError> {
        let length = self.u32()? as usize;
        // each entry takes 4 bytes
        if self.0.len() < length.saturating_mul(4) {
            return Err(ProgramError::InvalidInstructionData);
        }
        (0..length).map(|_| self.u32()).collect()
    }

    pub fn u64_vec(&mut self) -> Result<Vec<u64>, ProgramError> {
        let length = self.u32()? as usize;
        // each entry takes 8 bytes
        if self.0.len() < length.saturating_mul(8) {
            return Err(ProgramError::InvalidInstructionData);
        }
        (0..length).map(|_| self.u64()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
