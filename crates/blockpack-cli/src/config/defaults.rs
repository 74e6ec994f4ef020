use std::path::PathBuf;

use crate::config::types::{ModePaths, ProxyConfig};

pub const CONFIG_FILE: &str = "blockpack.config.json";

pub fn default_entry() -> ModePaths {
    ModePaths {
        production: PathBuf::from("./dist/build/Block.fs.js"),
        development: PathBuf::from("./dist/build/Dev.fs.js"),
    }
}

pub fn default_output_dir() -> PathBuf {
    PathBuf::from("./dist/out")
}

pub fn default_assets_dir() -> PathBuf {
    PathBuf::from("./public")
}

pub fn default_block_info() -> PathBuf {
    PathBuf::from("./block-info")
}

pub fn default_html_template() -> PathBuf {
    PathBuf::from("./src/index.html")
}

pub fn default_metadata_output() -> ModePaths {
    ModePaths {
        production: PathBuf::from("./dist/out/block-metadata.json"),
        development: PathBuf::from("./dist/build/block-metadata.json"),
    }
}

pub fn default_env_file() -> PathBuf {
    PathBuf::from("./.env")
}

pub fn default_dev_server_port() -> u16 {
    blockpack_config::dev_server::DEFAULT_PORT
}

pub fn default_dev_server_proxy() -> Vec<ProxyConfig> {
    vec![ProxyConfig {
        path: "/api/*".to_string(),
        target: "http://localhost:5000".to_string(),
        change_origin: true,
    }]
}

pub fn default_change_origin() -> bool {
    true
}
