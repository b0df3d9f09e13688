//! Decodes Unix-style numeric modes into per-principal permission flags.

/// Read, write and execute flags for a single principal class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionBits {
    /// Read permission.
    pub read: bool,
    /// Write permission.
    pub write: bool,
    /// Execute permission.
    pub execute: bool,
}

impl PermissionBits {
    /// Decodes a single mode digit.
    ///
    /// Digits outside `0..=7` grant nothing.
    #[must_use]
    pub const fn from_digit(digit: u32) -> Self {
        if digit > 7 {
            return Self::none();
        }
        Self {
            read: digit & 4 != 0,
            write: digit & 2 != 0,
            execute: digit & 1 != 0,
        }
    }

    /// No permission at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            read: false,
            write: false,
            execute: false,
        }
    }

    /// Re-encodes the flags as a mode digit.
    #[must_use]
    pub fn digit(self) -> u32 {
        (u32::from(self.read) << 2) | (u32::from(self.write) << 1) | u32::from(self.execute)
    }
}

/// Owner, group and other permissions for an extracted file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionTriplet {
    /// Permissions of the owning user.
    pub owner: PermissionBits,
    /// Permissions of the owning group.
    pub group: PermissionBits,
    /// Permissions of everybody else.
    pub other: PermissionBits,
}

impl PermissionTriplet {
    /// Decodes a mode written as decimal digits, so `755` means `rwxr-xr-x`.
    ///
    /// Digits are read least significant first as other, group and owner.
    /// Anything above the third digit is ignored.
    #[must_use]
    pub fn decode(mode: u32) -> Self {
        let mut digits = DecimalDigits(mode);
        let other = PermissionBits::from_digit(digits.next_digit());
        let group = PermissionBits::from_digit(digits.next_digit());
        let owner = PermissionBits::from_digit(digits.next_digit());
        Self {
            owner,
            group,
            other,
        }
    }

    /// Decodes raw mode bits such as `0o755`, as stored in tar headers.
    ///
    /// Set-id and sticky bits are dropped.
    #[must_use]
    pub const fn from_mode_bits(bits: u32) -> Self {
        Self {
            owner: PermissionBits::from_digit((bits >> 6) & 0o7),
            group: PermissionBits::from_digit((bits >> 3) & 0o7),
            other: PermissionBits::from_digit(bits & 0o7),
        }
    }

    /// Encodes the triplet as mode bits suitable for `chmod`.
    #[must_use]
    pub fn mode_bits(self) -> u32 {
        (self.owner.digit() << 6) | (self.group.digit() << 3) | self.other.digit()
    }
}

/// Yields the decimal digits of a number, least significant first.
struct DecimalDigits(u32);

impl DecimalDigits {
    fn next_digit(&mut self) -> u32 {
        let digit = self.0.rem_euclid(10);
        self.0 = self.0.div_euclid(10);
        digit
    }
}
