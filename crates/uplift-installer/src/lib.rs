mod layout;
mod pins;
mod receipts;
mod stage;
mod types;

pub use layout::{default_user_prefix, PrefixLayout};
pub use pins::{read_all_pins, read_pin, remove_pin, write_pin};
pub use receipts::{
    read_install_receipt, read_install_receipts, read_installed_versions, write_install_receipt,
};
pub use stage::ReceiptInstallStage;
pub use types::InstallReceipt;
