use super::*;

/// Fee rate in satoshis per virtual byte, held to millisatoshi
/// precision so fractional rates survive parsing.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FeeRate(u64);

impl FromStr for FeeRate {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let rate = f64::from_str(s).map_err(|_| Error::InvalidFeeRate {
      value: s.to_string(),
    })?;

    Self::try_from(rate)
  }
}

impl TryFrom<f64> for FeeRate {
  type Error = Error;

  fn try_from(rate: f64) -> Result<Self> {
    if rate.is_sign_negative() || rate.is_nan() || rate.is_infinite() {
      return Err(Error::InvalidFeeRate {
        value: rate.to_string(),
      });
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    Ok(Self((rate * 1000.0).round() as u64))
  }
}

impl FeeRate {
  pub(crate) fn fee(self, vbytes: usize) -> Amount {
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_precision_loss)]
    #[allow(clippy::cast_sign_loss)]
    Amount::from_sat((self.0 as f64 * vbytes as f64 / 1000.0).ceil() as u64)
  }

  /// Fee for a transaction of `vbytes`, floored at one satoshi per
  /// virtual byte so no transaction is priced below relay minimum.
  pub(crate) fn floored_fee(self, vbytes: usize) -> Amount {
    cmp::max(
      self.fee(vbytes),
      Amount::from_sat(vbytes.try_into().unwrap()),
    )
  }
}
