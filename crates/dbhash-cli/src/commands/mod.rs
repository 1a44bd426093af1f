pub mod capture;
pub mod compare;

/// No divergence.
pub const EXIT_PASS: u8 = 0;
/// At least one mismatch or absence.
pub const EXIT_FAIL: u8 = 1;
/// The run could not complete.
pub const EXIT_OPERATIONAL: u8 = 2;
/// Both inventories were empty.
pub const EXIT_NOTHING_TO_COMPARE: u8 = 3;
