//! Host key-value flags
//!
//! The store is owned by the host application; the tracker only reads and
//! writes the two launch flags through this trait.

use crate::ContractError;

/// Boolean flags persisted by the host (`first_launch`, `user_signed_up`)
pub trait FlagStore: Send {
    /// True until `mark_app_launched` has been called once
    fn is_first_launch(&self) -> Result<bool, ContractError>;

    fn mark_app_launched(&mut self) -> Result<(), ContractError>;

    fn is_user_signed_up(&self) -> Result<bool, ContractError>;

    fn mark_user_signed_up(&mut self) -> Result<(), ContractError>;

    /// Remove both flags
    fn clear_all(&mut self) -> Result<(), ContractError>;
}
