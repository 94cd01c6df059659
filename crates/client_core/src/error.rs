use thiserror::Error;

const NO_GAS_NOTICE: &str = "Transaction failed. Do you have IOTA gas?";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("please connect your wallet first")]
    NotAuthenticated,
    #[error("transaction failed: {detail}")]
    ExecutionFailed { detail: String },
}

/// User-facing text for a failed submission. Funds and authorization
/// failures get the gas hint; everything else shows the raw detail.
pub fn failure_notice(detail: &str) -> String {
    let lower = detail.to_ascii_lowercase();
    if lower.contains("gas")
        || lower.contains("insufficient")
        || lower.contains("balance")
        || lower.contains("unauthorized")
        || lower.contains("rejected")
        || lower.contains("denied")
        || lower.contains("403 forbidden")
    {
        NO_GAS_NOTICE.to_string()
    } else {
        format!("Transaction failed: {detail}")
    }
}
