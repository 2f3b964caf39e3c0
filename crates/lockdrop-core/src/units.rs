//! Exact conversions between a chain's smallest unit and its display unit.
//!
//! Every conversion goes through `BigDecimal`; no floating point touches an
//! amount. Display values are `smallest * 10^-decimals` held at scale
//! `decimals`, so `to_display_unit` is exact and `to_smallest_unit` only
//! truncates digits below the smallest unit.

use std::str::FromStr;

use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;

use crate::constants::{FEMTO_DECIMALS, SATOSHI_DECIMALS};
use crate::error::LockdropError;

/// A chain's power-of-ten denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denomination {
    pub decimals: u32,
    pub base_unit: &'static str,
    pub display_unit: &'static str,
}

/// Source chain: 1 BTC = 10^8 satoshi.
pub const BITCOIN: Denomination = Denomination {
    decimals: SATOSHI_DECIMALS,
    base_unit: "satoshi",
    display_unit: "BTC",
};

/// Destination ledger: 1 PLM = 10^15 femto.
pub const PLM: Denomination = Denomination {
    decimals: FEMTO_DECIMALS,
    base_unit: "femto",
    display_unit: "PLM",
};

impl Denomination {
    /// `amount / 10^decimals`, exact.
    pub fn to_display_unit(&self, amount: u128) -> BigDecimal {
        BigDecimal::new(BigInt::from(amount), self.decimals as i64)
    }

    /// `display * 10^decimals`, truncated toward zero.
    pub fn to_smallest_unit(&self, display: &BigDecimal) -> Result<u128, LockdropError> {
        if display.sign() == Sign::Minus {
            return Err(LockdropError::InvalidAmount(format!(
                "{} amount cannot be negative: {display}",
                self.display_unit
            )));
        }
        let factor = BigDecimal::new(BigInt::from(1), -(self.decimals as i64));
        let (digits, _) = (display * &factor).with_scale(0).into_bigint_and_exponent();
        u128::try_from(digits).map_err(|_| {
            LockdropError::InvalidAmount(format!(
                "{display} {} does not fit in {}",
                self.display_unit, self.base_unit
            ))
        })
    }

    /// Parse a decimal string in display units into the smallest unit.
    pub fn parse_display(&self, s: &str) -> Result<u128, LockdropError> {
        let value = BigDecimal::from_str(s.trim())
            .map_err(|e| LockdropError::InvalidAmount(format!("{s}: {e}")))?;
        self.to_smallest_unit(&value)
    }

    /// Plain decimal rendering of `amount` in display units with trailing
    /// zeros trimmed, e.g. `150000000` satoshi → `"1.5"`.
    pub fn format(&self, amount: u128) -> String {
        let unit = 10u128.pow(self.decimals);
        let whole = amount / unit;
        let frac = amount % unit;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0width$}", frac, width = self.decimals as usize);
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

/// Satoshi → BTC.
pub fn satoshi_to_bitcoin(satoshi: u64) -> BigDecimal {
    BITCOIN.to_display_unit(satoshi as u128)
}

/// BTC → satoshi.
pub fn bitcoin_to_satoshi(bitcoin: &BigDecimal) -> Result<u64, LockdropError> {
    let sat = BITCOIN.to_smallest_unit(bitcoin)?;
    u64::try_from(sat)
        .map_err(|_| LockdropError::InvalidAmount(format!("{bitcoin} BTC exceeds u64 satoshi")))
}

/// Femto → PLM.
pub fn femto_to_plm(femto: u128) -> BigDecimal {
    PLM.to_display_unit(femto)
}

/// PLM → femto.
pub fn plm_to_femto(plm: &BigDecimal) -> Result<u128, LockdropError> {
    PLM.to_smallest_unit(plm)
}
