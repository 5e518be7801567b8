pub mod debounce;
pub mod fs;
pub mod i18n;
