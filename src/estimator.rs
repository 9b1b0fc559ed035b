use super::*;

/// Outcome of sizing a reveal candidate against the balance it inherits.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RevealEstimate {
  Keep { fee: Amount, change: Amount },
  Drop { fee: Amount },
  Short { fee: Amount },
}

/// Fee and output value for a commit candidate. The funding input is
/// dry-run signed so the estimate sees a realistic script_sig or
/// witness; the signature itself is discarded with the clone.
pub(crate) fn estimate_commit(
  secp: &Secp256k1<All>,
  tx: &Transaction,
  funding: &Funding,
  fee_rate: FeeRate,
) -> Result<(Amount, Amount)> {
  let mut sized = tx.clone();
  sign_funding_input(secp, &mut sized, funding, &[0; 32])?;

  let fee = fee_rate.floored_fee(sized.vsize());

  let value = funding
    .amount
    .checked_sub(fee)
    .ok_or(Error::CommitShortfall {
      value: funding.amount,
      fee,
    })?;

  Ok((fee, value))
}

/// Decide whether a reveal keeps its change output, drops it, or cannot
/// be afforded at all. Sizing runs twice when change is unaffordable:
/// removing the change output shrinks the transaction, which can make
/// an otherwise short reveal fit.
pub(crate) fn estimate_reveal(
  tx: &Transaction,
  envelope: &Envelope,
  fee_rate: FeeRate,
  available: Amount,
  postage: Amount,
  min_change: Amount,
) -> RevealEstimate {
  assert_eq!(
    tx.output.len(),
    2,
    "invariant: reveal candidate carries a change slot"
  );

  let mut sized = tx.clone();
  sized.input[0].witness = envelope.placeholder_witness();

  let fee = fee_rate.floored_fee(sized.vsize());

  if let Some(change) = available
    .checked_sub(postage)
    .and_then(|rest| rest.checked_sub(fee))
  {
    if change >= min_change {
      return RevealEstimate::Keep { fee, change };
    }
  }

  sized.output.truncate(1);
  let trimmed_fee = fee_rate.floored_fee(sized.vsize());

  match postage.checked_add(trimmed_fee) {
    Some(required) if available >= required => RevealEstimate::Drop { fee: trimmed_fee },
    _ => RevealEstimate::Short { fee },
  }
}
