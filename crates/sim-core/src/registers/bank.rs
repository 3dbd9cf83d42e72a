use crate::{ConfigError, Register, Word};

/// Stable, index-addressed register bank owned by a processor core.
///
/// One register is designated as the program counter at construction and
/// stays designated for the bank's lifetime.
///
/// Deserialization goes through [`RegisterBank::new`], so a serialized bank
/// with an invalid designation is rejected with the [`ConfigError`] message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegisterBank<W: Word> {
    registers: Vec<Register<W>>,
    pc_index: usize,
}

impl<W: Word> RegisterBank<W> {
    /// Builds a bank from initial register contents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PcIndexOutOfRange`] when `pc_index` is not a
    /// valid index and [`ConfigError::ZeroRegisterAsPc`] when it designates a
    /// zero register.
    pub fn new(
        registers: impl Into<Vec<Register<W>>>,
        pc_index: usize,
    ) -> Result<Self, ConfigError> {
        let registers = registers.into();
        match registers.get(pc_index) {
            None => Err(ConfigError::PcIndexOutOfRange {
                index: pc_index,
                len: registers.len(),
            }),
            Some(Register::Zero) => Err(ConfigError::ZeroRegisterAsPc { index: pc_index }),
            Some(Register::Storage(_)) => Ok(Self {
                registers,
                pc_index,
            }),
        }
    }

    /// Builds a bank of `count` zeroed writable registers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PcIndexOutOfRange`] when `pc_index >= count`.
    pub fn zeroed(count: usize, pc_index: usize) -> Result<Self, ConfigError> {
        Self::new(vec![Register::default(); count], pc_index)
    }

    /// Number of registers, including the program counter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Returns `true` when the bank holds no registers.
    ///
    /// A validated bank always holds at least the program counter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Returns the register at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Register<W>> {
        self.registers.get(index)
    }

    /// Returns the register at `index` for mutation.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Register<W>> {
        self.registers.get_mut(index)
    }

    /// Iterates over registers in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Register<W>> {
        self.registers.iter()
    }

    /// Index of the designated program counter.
    #[must_use]
    pub const fn pc_index(&self) -> usize {
        self.pc_index
    }

    /// The designated program-counter register.
    #[must_use]
    pub fn pc(&self) -> &Register<W> {
        &self.registers[self.pc_index]
    }

    /// The designated program-counter register, for mutation.
    pub fn pc_mut(&mut self) -> &mut Register<W> {
        &mut self.registers[self.pc_index]
    }
}

#[cfg(feature = "serde")]
impl<'de, W: Word + serde::Deserialize<'de>> serde::Deserialize<'de> for RegisterBank<W> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Parts<W: Word> {
            registers: Vec<Register<W>>,
            pc_index: usize,
        }

        let parts = <Parts<W> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        Self::new(parts.registers, parts.pc_index).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::RegisterBank;
    use crate::{ConfigError, Register};

    #[test]
    fn pc_designation_must_be_in_range() {
        assert_eq!(
            RegisterBank::<u32>::zeroed(4, 4),
            Err(ConfigError::PcIndexOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(
            RegisterBank::<u32>::new(Vec::new(), 0),
            Err(ConfigError::PcIndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn zero_register_cannot_be_designated_pc() {
        let registers = [Register::<u16>::zero(), Register::new(0)];
        assert_eq!(
            RegisterBank::new(registers, 0),
            Err(ConfigError::ZeroRegisterAsPc { index: 0 })
        );
    }

    #[test]
    fn registers_are_tracked_independently_by_index() {
        let mut bank = RegisterBank::<u32>::zeroed(8, 7).expect("valid bank");

        for (offset, index) in (0_u32..).zip(0..bank.len()) {
            bank.get_mut(index)
                .expect("index in range")
                .set_value(0x1000 + offset);
        }

        for (offset, register) in (0_u32..).zip(bank.iter()) {
            assert_eq!(register.value(), 0x1000 + offset);
        }
        assert_eq!(bank.pc().value(), 0x1007);
    }

    #[test]
    fn pc_accessors_alias_the_designated_slot() {
        let registers = [Register::zero(), Register::new(0_u64), Register::new(0x40)];
        let mut bank = RegisterBank::new(registers, 2).expect("valid bank");

        bank.pc_mut().increment_as_pc(8);

        assert_eq!(bank.pc_index(), 2);
        assert_eq!(bank.get(2).map(Register::value), Some(0x48));
        assert_eq!(bank.get(0).map(Register::can_write), Some(false));
        assert!(bank.get(3).is_none());
        assert!(!bank.is_empty());
    }

    #[cfg(feature = "serde")]
    mod serde_roundtrip {
        use super::RegisterBank;
        use crate::{ConfigError, Register};

        #[test]
        fn serialized_bank_deserializes_unchanged() {
            let bank = RegisterBank::new([Register::zero(), Register::new(0x40_u16)], 1)
                .expect("valid bank");
            let json = serde_json::to_string(&bank).expect("serializes");
            let restored: RegisterBank<u16> = serde_json::from_str(&json).expect("deserializes");
            assert_eq!(restored, bank);
        }

        #[test]
        fn out_of_range_pc_designation_is_rejected() {
            let err = serde_json::from_str::<RegisterBank<u32>>(
                r#"{"registers":[{"Storage":0}],"pc_index":5}"#,
            )
            .expect_err("pc index outside the bank");
            assert!(err
                .to_string()
                .contains(&ConfigError::PcIndexOutOfRange { index: 5, len: 1 }.to_string()));
        }

        #[test]
        fn zero_register_designation_is_rejected() {
            let err = serde_json::from_str::<RegisterBank<u32>>(
                r#"{"registers":["Zero"],"pc_index":0}"#,
            )
            .expect_err("zero register cannot be the pc");
            assert!(err
                .to_string()
                .contains(&ConfigError::ZeroRegisterAsPc { index: 0 }.to_string()));
        }
    }
}
