pub mod resolv_conf;

pub use resolv_conf::{load_system_config, ResolvConf, RESOLV_CONF_PATH};
