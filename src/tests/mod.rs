pub(crate) mod renewal_failure;
pub(crate) mod renewal_success;
