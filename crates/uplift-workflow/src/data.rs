//! Typed slots of an [`ExecutionContext`](crate::ExecutionContext) data bag.
//!
//! Every slot is write-once per context: adding a value to a populated slot is an error.

use std::fmt;
use std::sync::Arc;

use crate::context::ExecutionContext;

pub trait DataSlot: 'static {
    type Value: Send + Sync + 'static;
    const NAME: &'static str;

    #[doc(hidden)]
    fn slot(bag: &DataBag) -> &Option<Self::Value>;
    #[doc(hidden)]
    fn slot_mut(bag: &mut DataBag) -> &mut Option<Self::Value>;
}

macro_rules! data_slots {
    ($($(#[$meta:meta])* $slot:ident => $field:ident: $value:ty;)*) => {
        #[derive(Default)]
        pub struct DataBag {
            $($field: Option<$value>,)*
        }

        impl DataBag {
            fn populated(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$field.is_some() {
                        names.push(<$slot as DataSlot>::NAME);
                    }
                )*
                names
            }
        }

        $(
            $(#[$meta])*
            pub struct $slot;

            impl DataSlot for $slot {
                type Value = $value;
                const NAME: &'static str = stringify!($slot);

                fn slot(bag: &DataBag) -> &Option<$value> {
                    &bag.$field
                }

                fn slot_mut(bag: &mut DataBag) -> &mut Option<$value> {
                    &mut bag.$field
                }
            }
        )*
    };
}

data_slots! {
    Package => package: Arc<dyn uplift_core::Package>;
    InstalledPackageVersion => installed_package_version: uplift_core::InstalledPackageVersion;
    Manifest => manifest: uplift_core::PackageManifest;
    PackageVersion => package_version: uplift_core::PackageVersion;
    Installer => installer: uplift_core::Installer;
    SearchResult => search_result: crate::search::SearchResult;
    PackageSubContexts => package_sub_contexts: Vec<ExecutionContext>;
    UpdateAllSummary => update_all_summary: crate::update_all::UpdateAllSummary;
    BatchInstallReport => batch_install_report: crate::stages::BatchInstallReport;
}

impl fmt::Debug for DataBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.populated()).finish()
    }
}
