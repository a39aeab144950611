use anchor_lang::prelude::Pubkey;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("price feed {feed} could not be read")]
    Unavailable { feed: Pubkey },
    #[error("price feed {feed} reported a non-positive answer: {answer}")]
    InvalidPrice { feed: Pubkey, answer: i64 },
    #[error("math overflow in oracle calculation")]
    MathOverflow,
    #[error("division by zero in oracle calculation")]
    DivisionByZero,
}
