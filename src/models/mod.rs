pub mod ad_account;

pub use ad_account::AdAccount;
