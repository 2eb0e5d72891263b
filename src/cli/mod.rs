mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_delete, handle_list, handle_open, handle_rename, handle_save, handle_search,
    handle_serve, handle_sync, handle_upload, load_config,
};
