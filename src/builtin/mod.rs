//! Config types bundled with the crate.
//!
//! Their schemas are registered by [`Registry::discover`](crate::Registry::discover)
//! alongside everything submitted with [`submit_schema!`](crate::submit_schema).

use crate::config::RegisteredSchema;

pub const WSGI_SERVER: &str = "WsgiServer";
pub const WSGI_APPS: &str = "WsgiApps";
pub const FILE_TREE: &str = "FileTree";

pub(crate) static SCHEMAS: [RegisteredSchema; 3] = [
    RegisteredSchema::new(
        WSGI_SERVER,
        "1.0.0",
        include_str!("schemas/wsgi_server_1_0_0.json"),
    ),
    RegisteredSchema::new(
        WSGI_APPS,
        "1.0.0",
        include_str!("schemas/wsgi_apps_1_0_0.json"),
    ),
    RegisteredSchema::new(
        FILE_TREE,
        "1.0.0",
        include_str!("schemas/file_tree_1_0_0.json"),
    ),
];
