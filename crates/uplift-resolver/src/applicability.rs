use uplift_core::Version;

pub fn is_update_version_applicable(installed: &Version, candidate: &Version) -> bool {
    installed < candidate
}
